use serde::{Deserialize, Serialize};

/// An account on the chat platform.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct User {
    /// Snowflake identifier of the account.
    pub id: String,

    /// The account's unique username.
    pub username: String,

    /// Display name chosen by the user, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub global_name: Option<String>,

    /// Whether the account is an automated bot.
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub bot: bool,
}

impl User {
    /// Creates a user with the given id and username.
    pub fn new(id: impl Into<String>, username: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            username: username.into(),
            global_name: None,
            bot: false,
        }
    }

    /// Returns the addressable reference that notifies this user when sent in text.
    pub fn mention(&self) -> String {
        format!("<@{}>", self.id)
    }

    /// Returns the name to show in the channel log.
    pub fn display_name(&self) -> &str {
        self.global_name.as_deref().unwrap_or(&self.username)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mention_format() {
        let user = User::new("80351110224678912", "nelly");
        assert_eq!(user.mention(), "<@80351110224678912>");
    }

    #[test]
    fn deserialize_minimal() {
        let json = serde_json::json!({"id": "1", "username": "alice", "discriminator": "0"});
        let user: User = serde_json::from_value(json).unwrap();
        assert_eq!(user, User::new("1", "alice"));
        assert_eq!(user.display_name(), "alice");
    }

    #[test]
    fn display_name_prefers_global_name() {
        let json = serde_json::json!({"id": "1", "username": "alice", "global_name": "Alice L."});
        let user: User = serde_json::from_value(json).unwrap();
        assert_eq!(user.display_name(), "Alice L.");
    }
}
