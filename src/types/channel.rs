use serde::{Deserialize, Serialize};

use crate::types::User;

/// Where a channel lives.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ChannelKind {
    /// A text channel that belongs to a community.
    Community,
    /// A one-to-one or group direct-message channel.
    DirectMessage,
}

/// An addressable destination for messages.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Channel {
    /// Snowflake identifier of the channel.
    pub id: String,

    /// Human-readable name; direct-message channels carry their recipients' names.
    pub name: String,

    /// Community channel or direct-message channel.
    pub kind: ChannelKind,
}

impl Channel {
    /// Creates a community channel.
    pub fn community(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            kind: ChannelKind::Community,
        }
    }
}

/// A direct-message channel visible to the session's user.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct DirectMessageChannel {
    /// Snowflake identifier of the channel.
    pub id: String,

    /// Everyone in the conversation except the session's user.
    #[serde(default)]
    pub recipients: Vec<User>,
}

impl DirectMessageChannel {
    /// Creates a direct-message channel with the given recipients.
    pub fn new(id: impl Into<String>, recipients: Vec<User>) -> Self {
        Self {
            id: id.into(),
            recipients,
        }
    }

    /// Returns a label listing the recipients' usernames.
    pub fn label(&self) -> String {
        if self.recipients.is_empty() {
            return format!("(empty conversation {})", self.id);
        }
        self.recipients
            .iter()
            .map(|user| user.username.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    }

    /// Returns this conversation as a generic channel.
    pub fn as_channel(&self) -> Channel {
        Channel {
            id: self.id.clone(),
            name: self.label(),
            kind: ChannelKind::DirectMessage,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn direct_message_label() {
        let dm = DirectMessageChannel::new(
            "9",
            vec![User::new("1", "alice"), User::new("2", "bob")],
        );
        assert_eq!(dm.label(), "alice, bob");
        assert_eq!(dm.as_channel().kind, ChannelKind::DirectMessage);
        assert_eq!(dm.as_channel().name, "alice, bob");
    }

    #[test]
    fn channel_kind_serialization() {
        let channel = Channel::community("3", "general");
        let json = serde_json::to_value(&channel).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"id": "3", "name": "general", "kind": "community"})
        );
    }
}
