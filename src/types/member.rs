use serde::{Deserialize, Serialize};

use crate::types::User;

/// A user's membership in a community.
///
/// The nickname is community-specific; the username belongs to the account.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Member {
    /// The account behind this membership.
    pub user: User,

    /// Community-specific nickname, if one is set.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nick: Option<String>,
}

impl Member {
    /// Creates a member without a nickname.
    pub fn new(user: User) -> Self {
        Self { user, nick: None }
    }

    /// Creates a member with a nickname.
    pub fn with_nick(user: User, nick: impl Into<String>) -> Self {
        Self {
            user,
            nick: Some(nick.into()),
        }
    }

    /// Returns the member's account id.
    pub fn id(&self) -> &str {
        &self.user.id
    }

    /// Returns the member's username.
    pub fn username(&self) -> &str {
        &self.user.username
    }

    /// Returns the member's nickname, if any.
    pub fn nickname(&self) -> Option<&str> {
        self.nick.as_deref()
    }

    /// Returns the member's addressable reference.
    pub fn mention(&self) -> String {
        self.user.mention()
    }
}
