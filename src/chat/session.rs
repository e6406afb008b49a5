//! Core chat session management.
//!
//! This module provides the `ChatSession` struct which owns the context state
//! and runs the read, classify, resolve and dispatch loop.

use std::sync::Arc;

use tokio::sync::watch;

use crate::chat::commands::{ChatCommand, help_text};
use crate::chat::console::Console;
use crate::chat::context::ContextState;
use crate::chat::dispatch::{DispatchOutcome, Dispatcher};
use crate::chat::input::{InputLine, LineSource, read_logical_line};
use crate::chat::mention::MentionResolver;
use crate::chat::menu::MenuSelector;
use crate::error::{Error, Result};
use crate::transport::Transport;
use crate::types::{Channel, Community};

/// Counters for one session.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SessionStats {
    /// Logical lines read, including commands.
    pub lines_read: u64,
    /// Lines handed to the transport successfully.
    pub messages_sent: u64,
    /// Lines the transport rejected.
    pub send_failures: u64,
}

/// A chat session bound to one transport.
///
/// The session is the only writer of its [`ContextState`].  The selected
/// channel is published through a watch channel so the inbound path can
/// follow it without sharing the context.
pub struct ChatSession<T: Transport + ?Sized> {
    transport: Arc<T>,
    console: Console,
    context: ContextState,
    community: Option<Community>,
    channel: Option<Channel>,
    channel_tx: watch::Sender<Option<String>>,
    stats: SessionStats,
}

impl<T: Transport + ?Sized> ChatSession<T> {
    /// Creates a session with no destination selected.
    pub fn new(transport: Arc<T>, console: Console) -> Self {
        let (channel_tx, _) = watch::channel(None);
        Self {
            transport,
            console,
            context: ContextState::new(),
            community: None,
            channel: None,
            channel_tx,
            stats: SessionStats::default(),
        }
    }

    /// Returns the current context.
    pub fn context(&self) -> &ContextState {
        &self.context
    }

    /// Returns the selected channel, if any.
    pub fn channel(&self) -> Option<&Channel> {
        self.channel.as_ref()
    }

    /// Returns the selected community, if any.
    pub fn community(&self) -> Option<&Community> {
        self.community.as_ref()
    }

    /// Returns the session counters.
    pub fn stats(&self) -> SessionStats {
        self.stats
    }

    /// Returns a receiver that follows the selected channel id.
    pub fn subscribe(&self) -> watch::Receiver<Option<String>> {
        self.channel_tx.subscribe()
    }

    /// Runs the initial community and channel selection.
    ///
    /// Any failure is returned as [`Error::Initialization`] and the caller
    /// should not enter [`ChatSession::run`].
    pub async fn start(&mut self, input: &mut dyn LineSource) -> Result<()> {
        let mut selector = MenuSelector::new(self.transport.as_ref(), &self.console);
        let (community, channel) = selector
            .select_community_and_channel(&mut self.context, input)
            .await
            .map_err(|err| match err {
                Error::Selection { message } | Error::Initialization { message } => {
                    Error::initialization(message)
                }
                other => Error::initialization(other.to_string()),
            })?;
        self.enter(Some(community), channel);
        Ok(())
    }

    /// Reads and handles lines until quit or end of input.
    ///
    /// Only a failure to read input ends the loop early; it is reported
    /// and the loop stops as if input had ended.
    pub async fn run(&mut self, input: &mut dyn LineSource) -> Result<()> {
        loop {
            let line = match read_logical_line(input).await {
                Ok(Some(line)) => line,
                Ok(None) => break,
                Err(err) => {
                    self.console.print_error(&err.to_string());
                    break;
                }
            };
            if !self.handle_line(line, input).await {
                break;
            }
        }
        Ok(())
    }

    /// Handles one classified line.  Returns `false` when the loop should stop.
    pub async fn handle_line(&mut self, line: InputLine, input: &mut dyn LineSource) -> bool {
        self.stats.lines_read += 1;
        let text = match line {
            InputLine::Quit => return false,
            InputLine::Fenced(block) => block,
            InputLine::Command(command) => {
                let rewritten = self.run_command(command, input).await;
                self.rewrite_mentions(&rewritten).await
            }
            InputLine::Text(text) => self.rewrite_mentions(&text).await,
        };
        self.dispatch(&text).await;
        true
    }

    async fn rewrite_mentions(&self, line: &str) -> String {
        MentionResolver::new(self.transport.as_ref(), &self.console)
            .rewrite(line, &self.context)
            .await
    }

    async fn dispatch(&mut self, text: &str) {
        let outcome = Dispatcher::new(self.transport.as_ref(), &self.console)
            .dispatch(&self.context, text)
            .await;
        match outcome {
            DispatchOutcome::Sent => self.stats.messages_sent += 1,
            DispatchOutcome::Failed => self.stats.send_failures += 1,
            DispatchOutcome::Skipped | DispatchOutcome::NoChannel => {}
        }
    }

    /// Applies a command's local effect and returns its rewritten line.
    async fn run_command(&mut self, command: ChatCommand, input: &mut dyn LineSource) -> String {
        match &command {
            ChatCommand::Help => {
                for line in help_text().lines() {
                    self.console.print_info(&format!("    {line}"));
                }
            }
            ChatCommand::Status => self.print_status(),
            ChatCommand::SwitchCommunity => {
                let mut selector = MenuSelector::new(self.transport.as_ref(), &self.console);
                match selector
                    .select_community_and_channel(&mut self.context, input)
                    .await
                {
                    Ok((community, channel)) => self.enter(Some(community), channel),
                    Err(err) => self.console.print_error(&err.to_string()),
                }
            }
            ChatCommand::SwitchChannel => {
                let mut selector = MenuSelector::new(self.transport.as_ref(), &self.console);
                match selector.select_channel(&mut self.context, input).await {
                    Ok(channel) => {
                        let community = self.community.take();
                        self.enter(community, channel);
                    }
                    Err(err) => self.console.print_error(&err.to_string()),
                }
            }
            ChatCommand::DirectMessages => {
                let mut selector = MenuSelector::new(self.transport.as_ref(), &self.console);
                match selector
                    .select_direct_message(&mut self.context, input)
                    .await
                {
                    Ok(channel) => self.enter(None, channel),
                    Err(err) => self.console.print_error(&err.to_string()),
                }
            }
            ChatCommand::Invalid(message) => self.console.print_error(message),
            ChatCommand::Me(_) | ChatCommand::Literal(_) => {}
        }
        command.rewritten()
    }

    fn enter(&mut self, community: Option<Community>, channel: Channel) {
        self.console.print_header(&describe(community.as_ref(), &channel));
        self.community = community;
        self.channel = Some(channel);
        self.channel_tx
            .send_replace(self.context.channel_id().map(String::from));
    }

    fn print_status(&self) {
        match &self.channel {
            Some(channel) if self.context.is_ready() => self
                .console
                .print_info(&describe(self.community.as_ref(), channel)),
            _ => self.console.print_info("No channel selected."),
        }
        self.console.print_info(&format!(
            "Lines read: {}, sent: {}, failed: {}",
            self.stats.lines_read, self.stats.messages_sent, self.stats.send_failures
        ));
    }
}

fn describe(community: Option<&Community>, channel: &Channel) -> String {
    match community {
        Some(community) => format!("Talking in #{} on {}", channel.name, community.name),
        None => format!("Talking privately with {}", channel.name),
    }
}
