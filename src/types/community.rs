use serde::{Deserialize, Serialize};

use crate::types::Member;

/// A named collection of channels and members (a "server" or "guild").
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Community {
    /// Snowflake identifier of the community.
    pub id: String,

    /// Human-readable name.
    pub name: String,

    /// Members, when the listing included them; usually empty.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub members: Vec<Member>,
}

impl Community {
    /// Creates a community with no member list.
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            members: Vec::new(),
        }
    }
}
