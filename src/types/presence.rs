use serde::{Deserialize, Serialize};

/// Online status advertised to other users.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    /// Available.
    #[default]
    Online,
    /// Away.
    Idle,
    /// Do not disturb.
    Dnd,
    /// Shown as offline.
    Invisible,
}

/// Custom status text shown next to the user's name.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CustomStatus {
    /// The text to show.
    pub text: String,
}

/// The presence set once when a session starts.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Presence {
    /// Online status.
    pub status: Status,

    /// Optional custom status text.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub custom_status: Option<CustomStatus>,
}

impl Presence {
    /// Creates an online presence without status text.
    pub fn online() -> Self {
        Self::default()
    }

    /// Sets the custom status text.
    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.custom_status = Some(CustomStatus { text: text.into() });
        self
    }
}
