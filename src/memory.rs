//! An in-process [`Transport`].
//!
//! `MemoryTransport` holds communities, members and conversations in memory,
//! records everything sent through it, and can be told to fail individual
//! capabilities.  Sent messages are appended to the channel's history so the
//! inbound path sees them the way it would on a live platform.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

use crate::error::{Error, Result};
use crate::transport::{MEMBER_LOOKUP_LIMIT, Transport};
use crate::types::{
    Channel, Community, DirectMessageChannel, Member, Message, Presence, User, snowflake_cmp,
};

#[derive(Default)]
struct State {
    user: User,
    communities: Vec<Community>,
    channels: HashMap<String, Vec<Channel>>,
    members: HashMap<String, Vec<Member>>,
    direct_messages: Vec<DirectMessageChannel>,
    history: HashMap<String, Vec<Message>>,
    sent: Vec<(String, String)>,
    presence: Option<Presence>,
    member_lookups: usize,
    direct_message_lookups: usize,
    next_id: u64,
    fail_members: bool,
    fail_direct_messages: bool,
    fail_sends: bool,
}

/// A transport backed by in-memory state.
pub struct MemoryTransport {
    state: Mutex<State>,
}

impl MemoryTransport {
    /// Creates an empty transport logged in as `user`.
    pub fn new(user: User) -> Self {
        Self {
            state: Mutex::new(State {
                user,
                next_id: 1_000,
                ..State::default()
            }),
        }
    }

    fn state(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Adds a community with its text channels.
    pub fn with_community(self, community: Community, channels: Vec<Channel>) -> Self {
        {
            let mut state = self.state();
            state.channels.insert(community.id.clone(), channels);
            state.communities.push(community);
        }
        self
    }

    /// Sets the member list of a community, in listing order.
    pub fn with_members(self, community_id: &str, members: Vec<Member>) -> Self {
        self.state()
            .members
            .insert(community_id.to_string(), members);
        self
    }

    /// Adds a direct-message conversation.
    pub fn with_direct_message(self, channel: DirectMessageChannel) -> Self {
        self.state().direct_messages.push(channel);
        self
    }

    /// Makes member listings fail.
    pub fn fail_member_lookups(&self, fail: bool) {
        self.state().fail_members = fail;
    }

    /// Makes direct-message listings fail.
    pub fn fail_direct_message_lookups(&self, fail: bool) {
        self.state().fail_direct_messages = fail;
    }

    /// Makes sends fail.
    pub fn fail_sends(&self, fail: bool) {
        self.state().fail_sends = fail;
    }

    /// Posts a message authored by someone else into a channel's history.
    pub fn post(&self, channel_id: &str, author: User, content: &str) -> Message {
        let mut state = self.state();
        let id = state.next_id.to_string();
        state.next_id += 1;
        let message = Message::new(id, channel_id, author, content);
        state
            .history
            .entry(channel_id.to_string())
            .or_default()
            .push(message.clone());
        message
    }

    /// Returns every `(channel_id, text)` pair sent so far.
    pub fn sent(&self) -> Vec<(String, String)> {
        self.state().sent.clone()
    }

    /// Returns how many member listings were requested.
    pub fn member_lookups(&self) -> usize {
        self.state().member_lookups
    }

    /// Returns how many direct-message listings were requested.
    pub fn direct_message_lookups(&self) -> usize {
        self.state().direct_message_lookups
    }

    /// Returns the last presence set.
    pub fn presence(&self) -> Option<Presence> {
        self.state().presence.clone()
    }
}

#[async_trait::async_trait]
impl Transport for MemoryTransport {
    async fn current_user(&self) -> Result<User> {
        Ok(self.state().user.clone())
    }

    async fn list_communities(&self) -> Result<Vec<Community>> {
        Ok(self.state().communities.clone())
    }

    async fn list_channels(&self, community_id: &str) -> Result<Vec<Channel>> {
        self.state()
            .channels
            .get(community_id)
            .cloned()
            .ok_or_else(|| {
                Error::not_found(
                    "Unknown Guild",
                    Some("community".to_string()),
                    Some(community_id.to_string()),
                )
            })
    }

    async fn list_members(&self, community_id: &str, limit: u16) -> Result<Vec<Member>> {
        let mut state = self.state();
        state.member_lookups += 1;
        if state.fail_members {
            return Err(Error::permission("Missing Access"));
        }
        let limit = usize::from(limit.min(MEMBER_LOOKUP_LIMIT));
        Ok(state
            .members
            .get(community_id)
            .map(|members| members.iter().take(limit).cloned().collect())
            .unwrap_or_default())
    }

    async fn list_direct_message_channels(&self) -> Result<Vec<DirectMessageChannel>> {
        let mut state = self.state();
        state.direct_message_lookups += 1;
        if state.fail_direct_messages {
            return Err(Error::connection("connection reset", None));
        }
        Ok(state.direct_messages.clone())
    }

    async fn send_message(&self, channel_id: &str, text: &str) -> Result<()> {
        if self.state().fail_sends {
            return Err(Error::permission("Cannot send messages in this channel"));
        }
        let author = self.state().user.clone();
        self.post(channel_id, author, text);
        self.state()
            .sent
            .push((channel_id.to_string(), text.to_string()));
        Ok(())
    }

    async fn set_presence(&self, presence: &Presence) -> Result<()> {
        self.state().presence = Some(presence.clone());
        Ok(())
    }

    async fn fetch_messages(
        &self,
        channel_id: &str,
        after: Option<&str>,
        limit: u8,
    ) -> Result<Vec<Message>> {
        let state = self.state();
        let mut messages: Vec<Message> = state
            .history
            .get(channel_id)
            .map(|history| {
                history
                    .iter()
                    .filter(|m| after.is_none_or(|after| snowflake_cmp(&m.id, after).is_gt()))
                    .cloned()
                    .collect()
            })
            .unwrap_or_default();
        // Newest first, like the REST listing.
        messages.sort_by(|a, b| snowflake_cmp(&b.id, &a.id));
        messages.truncate(usize::from(limit));
        Ok(messages)
    }
}
