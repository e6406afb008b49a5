//! Configuration types for the chat client.
//!
//! This module provides CLI argument parsing via `arrrg` and the resolved
//! configuration a session runs with.

use std::time::Duration;

use arrrg_derive::CommandLine;

use crate::chat::notify::{DEFAULT_NOTIFY_COMMAND, DEFAULT_NOTIFY_GEOMETRY, Notifier};

/// Default number of history messages shown when a channel is selected.
const DEFAULT_BACKLOG: u8 = 10;

/// Default delay between polls for new messages.
const DEFAULT_POLL_INTERVAL_MS: u64 = 2000;

/// Default custom status text set at startup.
const DEFAULT_STATUS: &str = "chatline";

/// Command-line arguments for the chatline tool.
#[derive(CommandLine, Debug, Default, PartialEq, Eq)]
pub struct ChatArgs {
    /// Hide timestamps on printed messages.
    #[arrrg(flag, "Do not print message timestamps")]
    pub no_timestamps: bool,

    /// Run the notifier for incoming messages.
    #[arrrg(flag, "Run a desktop notifier for incoming messages")]
    pub notify: bool,

    /// Geometry handed to the notifier.
    #[arrrg(optional, "Notifier geometry (default: 10,10,260,90)", "GEOM")]
    pub notify_geometry: Option<String>,

    /// Program run as the notifier.
    #[arrrg(optional, "Notifier program (default: statusmsg)", "PROGRAM")]
    pub notify_command: Option<String>,

    /// Disable ANSI colors and styles.
    #[arrrg(flag, "Disable ANSI colors/styles")]
    pub no_color: bool,

    /// Messages of history to show after selecting a channel.
    #[arrrg(optional, "History shown on channel selection (default: 10)", "N")]
    pub backlog: Option<u8>,

    /// Milliseconds between polls for new messages.
    #[arrrg(optional, "Poll interval in milliseconds (default: 2000)", "MS")]
    pub poll_interval_ms: Option<u64>,

    /// Per-request timeout in seconds.
    #[arrrg(optional, "Per-request timeout in seconds (default: none)", "SECS")]
    pub timeout_secs: Option<u64>,

    /// Base URL of the platform's REST API.
    #[arrrg(optional, "REST API base URL", "URL")]
    pub base_url: Option<String>,

    /// Custom status text set at startup.
    #[arrrg(optional, "Custom status text (default: chatline)", "TEXT")]
    pub status: Option<String>,
}

/// Configuration for a chat session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatConfig {
    /// Whether printed messages carry a timestamp.
    pub show_timestamps: bool,

    /// Whether to use ANSI colors and styles in output.
    pub use_color: bool,

    /// Notifier program, or `None` when notifications are off.
    pub notify_command: Option<String>,

    /// Geometry handed to the notifier.
    pub notify_geometry: String,

    /// History shown when a channel is selected.
    pub backlog: u8,

    /// Delay between polls for new messages.
    pub poll_interval: Duration,

    /// Per-request timeout; `None` waits indefinitely.
    pub timeout: Option<Duration>,

    /// REST API base URL; `None` uses the client's default.
    pub base_url: Option<String>,

    /// Custom status text set at startup.
    pub status_text: String,
}

impl ChatConfig {
    /// Creates a new ChatConfig with default values.
    ///
    /// Defaults:
    /// - Timestamps and color: enabled
    /// - Notifications: disabled
    /// - Backlog: 10 messages, polled every 2 seconds
    /// - No request timeout
    pub fn new() -> Self {
        Self {
            show_timestamps: true,
            use_color: true,
            notify_command: None,
            notify_geometry: DEFAULT_NOTIFY_GEOMETRY.to_string(),
            backlog: DEFAULT_BACKLOG,
            poll_interval: Duration::from_millis(DEFAULT_POLL_INTERVAL_MS),
            timeout: None,
            base_url: None,
            status_text: DEFAULT_STATUS.to_string(),
        }
    }

    /// Disables ANSI color output.
    pub fn without_color(mut self) -> Self {
        self.use_color = false;
        self
    }

    /// Disables message timestamps.
    pub fn without_timestamps(mut self) -> Self {
        self.show_timestamps = false;
        self
    }

    /// Enables notifications through `program`.
    pub fn with_notifier(mut self, program: impl Into<String>) -> Self {
        self.notify_command = Some(program.into());
        self
    }

    /// Sets the history shown on channel selection.
    pub fn with_backlog(mut self, backlog: u8) -> Self {
        self.backlog = backlog;
        self
    }

    /// Sets the poll interval.
    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    /// Sets the per-request timeout.
    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    /// Returns the notifier to run, if notifications are enabled.
    pub fn notifier(&self) -> Option<Notifier> {
        self.notify_command
            .as_ref()
            .map(|program| Notifier::new(program.clone(), self.notify_geometry.clone()))
    }
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl From<ChatArgs> for ChatConfig {
    fn from(args: ChatArgs) -> Self {
        let notify_command = args.notify.then(|| {
            args.notify_command
                .unwrap_or_else(|| DEFAULT_NOTIFY_COMMAND.to_string())
        });
        ChatConfig {
            show_timestamps: !args.no_timestamps,
            use_color: !args.no_color,
            notify_command,
            notify_geometry: args
                .notify_geometry
                .unwrap_or_else(|| DEFAULT_NOTIFY_GEOMETRY.to_string()),
            backlog: args.backlog.unwrap_or(DEFAULT_BACKLOG),
            poll_interval: Duration::from_millis(
                args.poll_interval_ms.unwrap_or(DEFAULT_POLL_INTERVAL_MS).max(1),
            ),
            timeout: args.timeout_secs.map(Duration::from_secs),
            base_url: args.base_url,
            status_text: args.status.unwrap_or_else(|| DEFAULT_STATUS.to_string()),
        }
    }
}
