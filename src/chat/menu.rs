//! Interactive selection of the community and channel to talk in.
//!
//! Selection runs `SelectingCommunity -> SelectingChannel -> Active`.  Choices
//! are 1-based indexes read from the same input as chat lines; an invalid
//! choice re-prompts without limit.  The context is only updated once a
//! channel has been chosen, so an abandoned selection leaves it untouched.

use crate::chat::console::Console;
use crate::chat::context::ContextState;
use crate::chat::input::{LineSource, strip_newline};
use crate::error::{Error, Result};
use crate::transport::Transport;
use crate::types::{Channel, Community};

/// Where the selector is in its state machine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MenuState {
    /// Waiting for a community choice.
    SelectingCommunity,
    /// Waiting for a channel choice within a community.
    SelectingChannel {
        /// The community whose channels are listed.
        community_id: String,
    },
    /// A channel has been chosen.
    Active,
}

/// Parses a 1-based menu choice into a 0-based index.
pub fn parse_selection(line: &str, count: usize) -> Option<usize> {
    match line.trim().parse::<usize>() {
        Ok(choice) if (1..=count).contains(&choice) => Some(choice - 1),
        _ => None,
    }
}

/// Walks the user through choosing a destination.
pub struct MenuSelector<'a, T: Transport + ?Sized> {
    transport: &'a T,
    console: &'a Console,
    state: MenuState,
}

impl<'a, T: Transport + ?Sized> MenuSelector<'a, T> {
    /// Creates a selector that lists choices through `transport`.
    pub fn new(transport: &'a T, console: &'a Console) -> Self {
        Self {
            transport,
            console,
            state: MenuState::SelectingCommunity,
        }
    }

    /// Returns the current state.
    pub fn state(&self) -> &MenuState {
        &self.state
    }

    /// Chooses a community and then one of its channels.
    ///
    /// Returns the chosen community and channel.  An empty community or
    /// channel list is a selection error.
    pub async fn select_community_and_channel(
        &mut self,
        context: &mut ContextState,
        input: &mut dyn LineSource,
    ) -> Result<(Community, Channel)> {
        self.state = MenuState::SelectingCommunity;
        let communities = self.transport.list_communities().await.map_err(|err| {
            Error::selection(format!("could not list communities: {err}"))
        })?;
        if communities.is_empty() {
            return Err(Error::selection("no communities available"));
        }
        let labels: Vec<String> = communities.iter().map(|c| c.name.clone()).collect();
        let index = self.choose("Communities", &labels, input).await?;
        let community = communities[index].clone();

        let mut next = context.clone();
        next.set_community(community.id.clone());
        let channel = self.choose_channel(&community.id, input).await?;
        next.set_channel(channel.id.clone());
        *context = next;
        self.state = MenuState::Active;
        Ok((community, channel))
    }

    /// Chooses another channel of the context's community.
    pub async fn select_channel(
        &mut self,
        context: &mut ContextState,
        input: &mut dyn LineSource,
    ) -> Result<Channel> {
        let Some(community_id) = context.community_id().map(String::from) else {
            return Err(Error::selection(
                "no community selected; use :g or :p instead",
            ));
        };
        let channel = self.choose_channel(&community_id, input).await?;
        context.set_channel(channel.id.clone());
        self.state = MenuState::Active;
        Ok(channel)
    }

    /// Chooses a direct-message conversation.
    pub async fn select_direct_message(
        &mut self,
        context: &mut ContextState,
        input: &mut dyn LineSource,
    ) -> Result<Channel> {
        let conversations = self
            .transport
            .list_direct_message_channels()
            .await
            .map_err(|err| {
                Error::selection(format!("could not list direct messages: {err}"))
            })?;
        if conversations.is_empty() {
            return Err(Error::selection("no direct-message conversations"));
        }
        let labels: Vec<String> = conversations.iter().map(|dm| dm.label()).collect();
        let index = self.choose("Direct messages", &labels, input).await?;
        let channel = conversations[index].as_channel();
        context.set_direct_channel(channel.id.clone());
        self.state = MenuState::Active;
        Ok(channel)
    }

    async fn choose_channel(
        &mut self,
        community_id: &str,
        input: &mut dyn LineSource,
    ) -> Result<Channel> {
        self.state = MenuState::SelectingChannel {
            community_id: community_id.to_string(),
        };
        let channels = self
            .transport
            .list_channels(community_id)
            .await
            .map_err(|err| Error::selection(format!("could not list channels: {err}")))?;
        if channels.is_empty() {
            return Err(Error::selection("no channels available"));
        }
        let labels: Vec<String> = channels.iter().map(|c| format!("#{}", c.name)).collect();
        let index = self.choose("Channels", &labels, input).await?;
        Ok(channels[index].clone())
    }

    async fn choose(
        &self,
        title: &str,
        labels: &[String],
        input: &mut dyn LineSource,
    ) -> Result<usize> {
        self.console.print_menu(title, labels);
        let prompt = format!("Select [1-{}]: ", labels.len());
        loop {
            let Some(line) = input.next_line_prompted(&prompt, self.console).await? else {
                return Err(Error::selection(
                    "input closed before a selection was made",
                ));
            };
            match parse_selection(strip_newline(&line), labels.len()) {
                Some(index) => return Ok(index),
                None => self.console.print_error(&format!(
                    "'{}' is not a choice between 1 and {}",
                    strip_newline(&line),
                    labels.len()
                )),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chat::input::ReaderSource;
    use crate::memory::MemoryTransport;
    use crate::types::{DirectMessageChannel, User};

    fn transport() -> MemoryTransport {
        MemoryTransport::new(User::new("1", "me"))
            .with_community(
                Community::new("10", "plan9"),
                vec![
                    Channel::community("100", "general"),
                    Channel::community("101", "acme"),
                ],
            )
            .with_community(Community::new("20", "rust"), vec![])
            .with_direct_message(DirectMessageChannel::new(
                "900",
                vec![User::new("5", "alicia")],
            ))
    }

    #[test]
    fn selection_bounds() {
        assert_eq!(parse_selection("1", 3), Some(0));
        assert_eq!(parse_selection(" 3 ", 3), Some(2));
        assert_eq!(parse_selection("0", 3), None);
        assert_eq!(parse_selection("4", 3), None);
        assert_eq!(parse_selection("-1", 3), None);
        assert_eq!(parse_selection("two", 3), None);
        assert_eq!(parse_selection("", 3), None);
    }

    #[tokio::test]
    async fn selects_community_then_channel() {
        let transport = transport();
        let (console, _) = Console::capture(false);
        let mut selector = MenuSelector::new(&transport, &console);
        let mut context = ContextState::new();
        let mut input = ReaderSource::new("1\n2\n".as_bytes());
        let (community, channel) = selector
            .select_community_and_channel(&mut context, &mut input)
            .await
            .unwrap();
        assert_eq!(community.name, "plan9");
        assert_eq!(channel.name, "acme");
        assert_eq!(context.community_id(), Some("10"));
        assert_eq!(context.channel_id(), Some("101"));
        assert!(context.is_ready());
        assert_eq!(selector.state(), &MenuState::Active);
    }

    #[tokio::test]
    async fn out_of_range_reprompts_without_mutation() {
        let transport = transport();
        let (console, buffer) = Console::capture(false);
        let mut selector = MenuSelector::new(&transport, &console);
        let mut context = ContextState::new();
        let mut input = ReaderSource::new("9\nx\n1\n".as_bytes());
        let err = selector
            .select_community_and_channel(&mut context, &mut input)
            .await
            .unwrap_err();
        // Community chosen on the third try; input ran out during channel selection.
        assert!(err.is_selection());
        assert_eq!(context, ContextState::new());
        assert_eq!(
            selector.state(),
            &MenuState::SelectingChannel {
                community_id: "10".to_string()
            }
        );
        let output = buffer.contents();
        assert!(output.contains("'9' is not a choice between 1 and 2"));
        assert!(output.contains("'x' is not a choice between 1 and 2"));
    }

    #[tokio::test]
    async fn empty_channel_list_is_selection_error() {
        let transport = transport();
        let (console, _) = Console::capture(false);
        let mut selector = MenuSelector::new(&transport, &console);
        let mut context = ContextState::new();
        let mut input = ReaderSource::new("2\n".as_bytes());
        let err = selector
            .select_community_and_channel(&mut context, &mut input)
            .await
            .unwrap_err();
        assert!(err.is_selection());
        assert!(!context.is_ready());
    }

    #[tokio::test]
    async fn empty_community_list_is_selection_error() {
        let transport = MemoryTransport::new(User::new("1", "me"));
        let (console, _) = Console::capture(false);
        let mut selector = MenuSelector::new(&transport, &console);
        let mut context = ContextState::new();
        let mut input = ReaderSource::new("1\n".as_bytes());
        let err = selector
            .select_community_and_channel(&mut context, &mut input)
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "Selection failed: no communities available");
    }

    #[tokio::test]
    async fn reselects_channel_in_current_community() {
        let transport = transport();
        let (console, _) = Console::capture(false);
        let mut selector = MenuSelector::new(&transport, &console);
        let mut context = ContextState::new();
        context.set_community("10");
        context.set_channel("100");
        let mut input = ReaderSource::new("2\n".as_bytes());
        let channel = selector
            .select_channel(&mut context, &mut input)
            .await
            .unwrap();
        assert_eq!(channel.id, "101");
        assert_eq!(context.channel_id(), Some("101"));
        assert_eq!(context.community_id(), Some("10"));
    }

    #[tokio::test]
    async fn channel_reselection_needs_a_community() {
        let transport = transport();
        let (console, _) = Console::capture(false);
        let mut selector = MenuSelector::new(&transport, &console);
        let mut context = ContextState::new();
        context.set_direct_channel("900");
        let mut input = ReaderSource::new("1\n".as_bytes());
        let err = selector
            .select_channel(&mut context, &mut input)
            .await
            .unwrap_err();
        assert!(err.is_selection());
        assert!(!err.to_string().starts_with("Initialization"));
        assert_eq!(context.channel_id(), Some("900"));
    }

    #[tokio::test]
    async fn prompt_is_written_once_per_attempt() {
        let transport = transport();
        let (console, buffer) = Console::capture(false);
        let mut selector = MenuSelector::new(&transport, &console);
        let mut context = ContextState::new();
        let mut input = ReaderSource::new("5\n1\n1\n".as_bytes());
        selector
            .select_community_and_channel(&mut context, &mut input)
            .await
            .unwrap();
        assert_eq!(buffer.contents().matches("Select [1-2]: ").count(), 3);
    }

    #[tokio::test]
    async fn selects_direct_message() {
        let transport = transport();
        let (console, _) = Console::capture(false);
        let mut selector = MenuSelector::new(&transport, &console);
        let mut context = ContextState::new();
        context.set_community("10");
        context.set_channel("100");
        let mut input = ReaderSource::new("1\n".as_bytes());
        let channel = selector
            .select_direct_message(&mut context, &mut input)
            .await
            .unwrap();
        assert_eq!(channel.name, "alicia");
        assert!(context.is_direct());
        assert_eq!(context.channel_id(), Some("900"));
    }
}
