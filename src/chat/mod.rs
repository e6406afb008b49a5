//! The terminal chat client.
//!
//! This module turns lines typed at a terminal into messages sent through a
//! [`Transport`](crate::Transport), and prints what arrives in the selected
//! channel.  It supports:
//!
//! - Menu selection of a community and channel, or a direct-message conversation
//! - Verbatim fenced blocks delimited by triple backticks
//! - Colon commands for navigation, status and action messages
//! - `@name` mentions rewritten to addressable references
//!
//! # Architecture
//!
//! - [`config`]: CLI argument parsing and configuration
//! - [`session`]: the read, classify, resolve and dispatch loop
//! - [`commands`]: colon command parsing
//! - [`inbound`]: polling for new messages and printing them concurrently

mod commands;
mod config;
mod console;
mod context;
mod dispatch;
mod inbound;
mod input;
mod mention;
mod menu;
mod notify;
mod session;

pub use commands::{ChatCommand, help_text, parse_command};
pub use config::{ChatArgs, ChatConfig};
pub use console::{Console, SharedBuffer};
pub use context::ContextState;
pub use dispatch::{DispatchOutcome, Dispatcher};
pub use inbound::{EVENT_QUEUE_DEPTH, InboundEvent, inbound_events, spawn_poller, spawn_printer};
pub use input::{
    EditorSource, FENCE, InputLine, LineSource, QUIT, ReaderSource, classify, read_logical_line,
    strip_newline,
};
pub use mention::{MentionResolver, Token, match_member, match_recipient, tokenize};
pub use menu::{MenuSelector, MenuState, parse_selection};
pub use notify::{DEFAULT_NOTIFY_COMMAND, DEFAULT_NOTIFY_GEOMETRY, Notifier};
pub use session::{ChatSession, SessionStats};
