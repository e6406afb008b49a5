//! Which community and channel the user is addressing.

/// The session's current destination.
///
/// The channel is either unset, a channel of the current community, or a
/// direct-message channel with no community.  Callers are responsible for
/// only setting channels that satisfy this; the context does not look them up.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ContextState {
    community_id: Option<String>,
    channel_id: Option<String>,
    enabled: bool,
}

impl ContextState {
    /// Creates a context with nothing selected.
    pub fn new() -> Self {
        Self::default()
    }

    /// Selects a community.
    ///
    /// Any channel of the previous community no longer applies, so the
    /// channel is cleared and the context disabled until a new one is set.
    pub fn set_community(&mut self, community_id: impl Into<String>) {
        self.community_id = Some(community_id.into());
        self.channel_id = None;
        self.enabled = false;
    }

    /// Selects a channel of the current community and enables the context.
    pub fn set_channel(&mut self, channel_id: impl Into<String>) {
        self.channel_id = Some(channel_id.into());
        self.enabled = true;
    }

    /// Selects a direct-message channel; the community is cleared.
    pub fn set_direct_channel(&mut self, channel_id: impl Into<String>) {
        self.community_id = None;
        self.set_channel(channel_id);
    }

    /// Returns true iff a channel is set and the context is enabled.
    pub fn is_ready(&self) -> bool {
        self.enabled && self.channel_id.is_some()
    }

    /// Returns the current community, if any.
    pub fn community_id(&self) -> Option<&str> {
        self.community_id.as_deref()
    }

    /// Returns the current channel, if any.
    pub fn channel_id(&self) -> Option<&str> {
        self.channel_id.as_deref()
    }

    /// Returns true when the current channel is a direct-message channel.
    pub fn is_direct(&self) -> bool {
        self.community_id.is_none() && self.channel_id.is_some()
    }
}
