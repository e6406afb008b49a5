use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::types::User;

/// A message posted to a channel.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Message {
    /// Snowflake identifier of the message.
    pub id: String,

    /// Channel the message was posted to.
    pub channel_id: String,

    /// Who posted it.
    pub author: User,

    /// Raw text content, with mentions in their addressable form.
    #[serde(default)]
    pub content: String,

    /// When the message was posted.
    #[serde(with = "crate::utils::time")]
    pub timestamp: OffsetDateTime,
}

impl Message {
    /// Creates a message posted now.
    pub fn new(
        id: impl Into<String>,
        channel_id: impl Into<String>,
        author: User,
        content: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            channel_id: channel_id.into(),
            author,
            content: content.into(),
            timestamp: OffsetDateTime::now_utc(),
        }
    }
}

/// Orders snowflake identifiers numerically without parsing them.
///
/// Snowflakes are decimal integers, so a shorter id is always older.
pub fn snowflake_cmp(a: &str, b: &str) -> std::cmp::Ordering {
    a.len().cmp(&b.len()).then_with(|| a.cmp(b))
}

#[cfg(test)]
mod tests {
    use std::cmp::Ordering;

    use super::*;

    #[test]
    fn deserialize_message() {
        let json = serde_json::json!({
            "id": "334385199974967042",
            "channel_id": "290926798999357250",
            "author": {"id": "53908099506183680", "username": "mason"},
            "content": "hello <@80351110224678912>",
            "timestamp": "2017-07-11T17:27:07.299000+00:00",
            "edited_timestamp": null,
            "tts": false
        });
        let message: Message = serde_json::from_value(json).unwrap();
        assert_eq!(message.author.username, "mason");
        assert_eq!(message.timestamp.year(), 2017);
        assert_eq!(message.timestamp.hour(), 17);
    }

    #[test]
    fn snowflake_ordering() {
        assert_eq!(snowflake_cmp("99", "100"), Ordering::Less);
        assert_eq!(snowflake_cmp("200", "100"), Ordering::Greater);
        assert_eq!(snowflake_cmp("123", "123"), Ordering::Equal);
    }
}
