//! Room lifecycle states and status change events.

use serde::{Deserialize, Serialize};

use crate::RoomError;

/// The lifecycle state of a room.
///
/// Exactly one state is current at any instant. `Suspended` is a recoverable
/// failure (a later attach may succeed); `Failed` requires caller
/// intervention; `Released` is terminal — once a room is released, further
/// attach and detach calls are rejected without touching any contributor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RoomLifecycle {
    Initialized,
    Attaching,
    Attached,
    Detaching,
    Detached,
    Suspended,
    Failed,
    Releasing,
    Released,
}

impl std::fmt::Display for RoomLifecycle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Initialized => "initialized",
            Self::Attaching => "attaching",
            Self::Attached => "attached",
            Self::Detaching => "detaching",
            Self::Detached => "detached",
            Self::Suspended => "suspended",
            Self::Failed => "failed",
            Self::Releasing => "releasing",
            Self::Released => "released",
        };
        write!(f, "{name}")
    }
}

/// A single lifecycle transition, as delivered to observers.
#[derive(Debug, Clone, PartialEq)]
pub struct RoomStatusChange {
    /// State after the transition.
    pub current: RoomLifecycle,

    /// State before the transition.
    pub previous: RoomLifecycle,

    /// The error associated with the transition, if any.
    pub error: Option<RoomError>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_uses_lowercase_names() {
        assert_eq!(RoomLifecycle::Initialized.to_string(), "initialized");
        assert_eq!(RoomLifecycle::Releasing.to_string(), "releasing");
        assert_eq!(RoomLifecycle::Released.to_string(), "released");
    }
}
