// Public modules
pub mod chat;
pub mod client;
pub mod error;
pub mod memory;
pub mod transport;
pub mod types;
pub mod utils;

mod observability;

// Re-exports
pub use client::RestClient;
pub use error::{Error, Result};
pub use memory::MemoryTransport;
pub use observability::register_biometrics;
pub use transport::{MEMBER_LOOKUP_LIMIT, MESSAGE_FETCH_LIMIT, Transport};
pub use types::*;
