//! Data types exchanged with the chat platform.

mod channel;
mod community;
mod member;
mod message;
mod presence;
mod user;

pub use channel::{Channel, ChannelKind, DirectMessageChannel};
pub use community::Community;
pub use member::Member;
pub use message::{Message, snowflake_cmp};
pub use presence::{CustomStatus, Presence, Status};
pub use user::User;
