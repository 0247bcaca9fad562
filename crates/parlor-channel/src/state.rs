//! Channel connectivity states.

use serde::{Deserialize, Serialize};

/// The connectivity state of a realtime channel.
///
/// The channel implementation mutates this from its own task as the
/// underlying connection comes and goes; consumers observe it but never own
/// it. `Suspended` is recoverable (the channel will keep trying to
/// re-establish itself); `Failed` is terminal for the channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChannelState {
    Initialized,
    Attaching,
    Attached,
    Detaching,
    Detached,
    Suspended,
    Failed,
}

impl ChannelState {
    /// Returns `true` while an attach or detach is still in flight.
    ///
    /// A channel reporting an operation failure while still in one of these
    /// states is breaking its contract: failure implies the state has
    /// settled.
    pub fn is_in_progress(&self) -> bool {
        matches!(self, Self::Attaching | Self::Detaching)
    }
}

impl std::fmt::Display for ChannelState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Initialized => "initialized",
            Self::Attaching => "attaching",
            Self::Attached => "attached",
            Self::Detaching => "detaching",
            Self::Detached => "detached",
            Self::Suspended => "suspended",
            Self::Failed => "failed",
        };
        write!(f, "{name}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_uses_lowercase_names() {
        assert_eq!(ChannelState::Initialized.to_string(), "initialized");
        assert_eq!(ChannelState::Suspended.to_string(), "suspended");
        assert_eq!(ChannelState::Failed.to_string(), "failed");
    }

    #[test]
    fn test_is_in_progress() {
        assert!(ChannelState::Attaching.is_in_progress());
        assert!(ChannelState::Detaching.is_in_progress());
        assert!(!ChannelState::Attached.is_in_progress());
        assert!(!ChannelState::Failed.is_in_progress());
    }
}
