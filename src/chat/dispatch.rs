//! Hands finished lines to the transport.

use crate::chat::console::Console;
use crate::chat::context::ContextState;
use crate::observability::{DISPATCH_BYTES, DISPATCH_ERRORS, DISPATCH_SENT};
use crate::transport::Transport;

/// What happened to a line given to the dispatcher.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchOutcome {
    /// The line was sent.
    Sent,
    /// The line was empty; nothing was sent.
    Skipped,
    /// No channel is selected; nothing was sent.
    NoChannel,
    /// The transport rejected the send; the error was reported.
    Failed,
}

/// Sends lines to the current channel and reports failures.
pub struct Dispatcher<'a, T: Transport + ?Sized> {
    transport: &'a T,
    console: &'a Console,
}

impl<'a, T: Transport + ?Sized> Dispatcher<'a, T> {
    /// Creates a dispatcher over `transport`.
    pub fn new(transport: &'a T, console: &'a Console) -> Self {
        Self { transport, console }
    }

    /// Sends `text` to the context's channel.
    ///
    /// Failures are printed and never returned: the read loop always continues.
    pub async fn dispatch(&self, context: &ContextState, text: &str) -> DispatchOutcome {
        if text.is_empty() {
            return DispatchOutcome::Skipped;
        }
        let Some(channel_id) = context.channel_id().filter(|_| context.is_ready()) else {
            self.console
                .print_error("No channel selected; use :g, :c or :p to choose one.");
            return DispatchOutcome::NoChannel;
        };
        match self.transport.send_message(channel_id, text).await {
            Ok(()) => {
                DISPATCH_SENT.click();
                DISPATCH_BYTES.count(text.len() as u64);
                DispatchOutcome::Sent
            }
            Err(err) => {
                DISPATCH_ERRORS.click();
                self.console.print_error(&err.to_string());
                DispatchOutcome::Failed
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::MemoryTransport;
    use crate::types::User;

    fn ready_context() -> ContextState {
        let mut context = ContextState::new();
        context.set_community("10");
        context.set_channel("100");
        context
    }

    #[tokio::test]
    async fn sends_to_current_channel() {
        let transport = MemoryTransport::new(User::new("1", "me"));
        let (console, _) = Console::capture(false);
        let dispatcher = Dispatcher::new(&transport, &console);
        assert_eq!(
            dispatcher.dispatch(&ready_context(), "hello").await,
            DispatchOutcome::Sent
        );
        assert_eq!(
            transport.sent(),
            vec![("100".to_string(), "hello".to_string())]
        );
    }

    #[tokio::test]
    async fn empty_line_is_never_sent() {
        let transport = MemoryTransport::new(User::new("1", "me"));
        let (console, buffer) = Console::capture(false);
        let dispatcher = Dispatcher::new(&transport, &console);
        assert_eq!(
            dispatcher.dispatch(&ready_context(), "").await,
            DispatchOutcome::Skipped
        );
        assert!(transport.sent().is_empty());
        assert!(buffer.contents().is_empty());
    }

    #[tokio::test]
    async fn send_failure_is_reported() {
        let transport = MemoryTransport::new(User::new("1", "me"));
        transport.fail_sends(true);
        let (console, buffer) = Console::capture(false);
        let dispatcher = Dispatcher::new(&transport, &console);
        assert_eq!(
            dispatcher.dispatch(&ready_context(), "hello").await,
            DispatchOutcome::Failed
        );
        assert!(buffer.contents().starts_with("Error: Permission error"));
    }

    #[tokio::test]
    async fn nothing_sent_without_channel() {
        let transport = MemoryTransport::new(User::new("1", "me"));
        let (console, buffer) = Console::capture(false);
        let dispatcher = Dispatcher::new(&transport, &console);
        let mut context = ContextState::new();
        context.set_community("10");
        assert_eq!(
            dispatcher.dispatch(&context, "hello").await,
            DispatchOutcome::NoChannel
        );
        assert!(transport.sent().is_empty());
        assert!(buffer.contents().contains("No channel selected"));
    }
}
