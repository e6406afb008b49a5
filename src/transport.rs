//! The capabilities the chat core needs from the platform.
//!
//! Everything the session does over the network goes through [`Transport`]:
//! the REST client implements it for real use and
//! [`MemoryTransport`](crate::MemoryTransport) implements it in-process.

use crate::error::Result;
use crate::types::{Channel, Community, DirectMessageChannel, Member, Message, Presence, User};

/// The most members a single listing may return.
pub const MEMBER_LOOKUP_LIMIT: u16 = 1000;

/// The most messages a single history fetch may return.
pub const MESSAGE_FETCH_LIMIT: u8 = 100;

/// Network capabilities consumed by the chat session.
///
/// Every call is awaited in place by the read loop, so a slow transport
/// stalls the loop until it returns.
#[async_trait::async_trait]
pub trait Transport: Send + Sync {
    /// Returns the account the session is logged in as.
    async fn current_user(&self) -> Result<User>;

    /// Lists the communities the user belongs to.
    async fn list_communities(&self) -> Result<Vec<Community>>;

    /// Lists the text channels of a community.
    async fn list_channels(&self, community_id: &str) -> Result<Vec<Channel>>;

    /// Lists up to `limit` members of a community, in platform order.
    ///
    /// Implementations clamp `limit` to [`MEMBER_LOOKUP_LIMIT`].
    async fn list_members(&self, community_id: &str, limit: u16) -> Result<Vec<Member>>;

    /// Lists the direct-message channels visible to the user.
    async fn list_direct_message_channels(&self) -> Result<Vec<DirectMessageChannel>>;

    /// Posts `text` to a channel.
    async fn send_message(&self, channel_id: &str, text: &str) -> Result<()>;

    /// Advertises the user's presence.
    async fn set_presence(&self, presence: &Presence) -> Result<()>;

    /// Fetches up to `limit` messages of a channel, newer than `after` when given.
    ///
    /// Order of the returned messages is unspecified.
    async fn fetch_messages(
        &self,
        channel_id: &str,
        after: Option<&str>,
        limit: u8,
    ) -> Result<Vec<Message>>;
}
