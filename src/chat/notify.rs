//! Desktop notifications through an external notifier program.

use tokio::process::Command;

use crate::error::{Error, Result};
use crate::types::Message;

/// Default program invoked for notifications.
pub const DEFAULT_NOTIFY_COMMAND: &str = "statusmsg";

/// Default geometry handed to the notifier.
pub const DEFAULT_NOTIFY_GEOMETRY: &str = "10,10,260,90";

/// Longest message excerpt shown in a notification, in characters.
const EXCERPT_CHARS: usize = 120;

/// Runs an external program to announce incoming messages.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notifier {
    program: String,
    geometry: String,
}

impl Notifier {
    /// Creates a notifier that runs `program -w geometry text`.
    ///
    /// The geometry is passed through untouched.
    pub fn new(program: impl Into<String>, geometry: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            geometry: geometry.into(),
        }
    }

    /// Returns the arguments the notifier is run with for `message`.
    pub fn args(&self, message: &Message) -> Vec<String> {
        let mut excerpt: String = message.content.chars().take(EXCERPT_CHARS).collect();
        if message.content.chars().count() > EXCERPT_CHARS {
            excerpt.push_str("...");
        }
        vec![
            "-w".to_string(),
            self.geometry.clone(),
            format!("{}: {}", message.author.display_name(), excerpt),
        ]
    }

    /// Starts the notifier for `message` without waiting for it to exit.
    pub fn notify(&self, message: &Message) -> Result<()> {
        Command::new(&self.program)
            .args(self.args(message))
            .stdin(std::process::Stdio::null())
            .stdout(std::process::Stdio::null())
            .spawn()
            .map(|_| ())
            .map_err(|err| Error::io(format!("could not run {}", self.program), err))
    }
}

impl Default for Notifier {
    fn default() -> Self {
        Self::new(DEFAULT_NOTIFY_COMMAND, DEFAULT_NOTIFY_GEOMETRY)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::User;

    #[test]
    fn geometry_is_forwarded() {
        let notifier = Notifier::default();
        let message = Message::new("1", "100", User::new("2", "bob"), "ping");
        assert_eq!(
            notifier.args(&message),
            vec!["-w", "10,10,260,90", "bob: ping"]
        );
    }

    #[test]
    fn long_messages_are_shortened() {
        let notifier = Notifier::new("notify-send", "0,0,1,1");
        let message = Message::new("1", "100", User::new("2", "bob"), "é".repeat(200));
        let args = notifier.args(&message);
        assert_eq!(args[1], "0,0,1,1");
        assert_eq!(args[2].chars().count(), "bob: ".len() + EXCERPT_CHARS + 3);
    }

    #[tokio::test]
    async fn missing_program_is_an_error() {
        let notifier = Notifier::new("/nonexistent/chatline-notifier", "0,0,1,1");
        let message = Message::new("1", "100", User::new("2", "bob"), "ping");
        assert!(matches!(notifier.notify(&message), Err(Error::Io { .. })));
    }
}
