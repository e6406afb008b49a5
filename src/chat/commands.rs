//! Colon command parsing for the chat loop.
//!
//! A line is a command when it starts with `:` followed by a known command
//! name.  Anything else, including unknown names such as `:D`, is ordinary
//! text.  `::text` escapes a leading colon.

/// A parsed chat command.
#[derive(Debug, Clone, PartialEq)]
pub enum ChatCommand {
    /// Display help information.
    Help,

    /// Show the current community and channel.
    Status,

    /// Choose a community, then one of its channels.
    SwitchCommunity,

    /// Choose another channel of the current community.
    SwitchChannel,

    /// Choose a direct-message conversation.
    DirectMessages,

    /// Send an action message.
    Me(String),

    /// Send text that begins with a colon.
    Literal(String),

    /// Report a parsing error back to the caller.
    Invalid(String),
}

impl ChatCommand {
    /// Returns the text this command contributes to the outgoing line.
    ///
    /// Commands with only a local effect contribute nothing.
    pub fn rewritten(&self) -> String {
        match self {
            ChatCommand::Me(text) => format!("_{text}_"),
            ChatCommand::Literal(text) => text.clone(),
            _ => String::new(),
        }
    }
}

/// Parses a line for a colon command.
///
/// Returns `Some(ChatCommand)` if the line is a command, or `None` if it
/// should be treated as a regular message.
///
/// # Examples
///
/// ```
/// # use chatline::chat::{ChatCommand, parse_command};
/// assert_eq!(parse_command(":c"), Some(ChatCommand::SwitchChannel));
/// assert_eq!(parse_command("::)"), Some(ChatCommand::Literal(":)".to_string())));
/// assert!(parse_command("hello :)").is_none());
/// ```
pub fn parse_command(line: &str) -> Option<ChatCommand> {
    let rest = line.strip_prefix(':')?;

    if rest.starts_with(':') {
        return Some(ChatCommand::Literal(rest.to_string()));
    }

    let mut parts = rest.splitn(2, ' ');
    let name = parts.next()?.to_lowercase();
    let argument = parts.next().map(|s| s.trim()).filter(|s| !s.is_empty());

    let command = match name.as_str() {
        "h" | "help" => ChatCommand::Help,
        "s" | "status" => ChatCommand::Status,
        "g" | "guild" | "community" => ChatCommand::SwitchCommunity,
        "c" | "channel" => ChatCommand::SwitchChannel,
        "p" | "private" => ChatCommand::DirectMessages,
        "me" => match argument {
            Some(text) => ChatCommand::Me(text.to_string()),
            None => ChatCommand::Invalid(":me requires some text".to_string()),
        },
        _ => return None,
    };

    Some(command)
}

/// Returns help text describing available commands.
pub fn help_text() -> &'static str {
    r#"Available commands:
  :h, :help              Show this help message
  :s, :status            Show the current community and channel
  :g, :guild             Choose a community and channel
  :c, :channel           Choose another channel in this community
  :p, :private           Choose a direct-message conversation
  :me <text>             Send an action message
  ::<text>               Send text starting with ':'
  ```                    Start a verbatim block; end it with another ```
  :q or an empty line    Exit"#
}
