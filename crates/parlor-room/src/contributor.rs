//! Contributors: the per-feature channels a room is composed of.

use std::fmt;
use std::sync::Arc;

use parlor_channel::RealtimeChannel;
use serde::{Deserialize, Serialize};

/// The features a chat room offers.
///
/// Used only to select the right error code when a contributor operation
/// fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RoomFeature {
    Messages,
    Presence,
    Reactions,
    Occupancy,
    Typing,
}

impl fmt::Display for RoomFeature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Messages => "messages",
            Self::Presence => "presence",
            Self::Reactions => "reactions",
            Self::Occupancy => "occupancy",
            Self::Typing => "typing",
        };
        write!(f, "{name}")
    }
}

/// A realtime channel that contributes to the room lifecycle.
///
/// The channel itself is externally owned; the manager holds a handle and
/// observes its state but never reaches into its internals. The contributor
/// list is fixed at manager construction.
#[derive(Clone)]
pub struct Contributor {
    /// The feature this channel backs.
    pub feature: RoomFeature,

    /// Handle to the externally-owned channel.
    pub channel: Arc<dyn RealtimeChannel>,
}

impl Contributor {
    /// Pairs a feature with its channel.
    pub fn new(feature: RoomFeature, channel: Arc<dyn RealtimeChannel>) -> Self {
        Self { feature, channel }
    }
}

impl fmt::Debug for Contributor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Contributor")
            .field("feature", &self.feature)
            .finish_non_exhaustive()
    }
}
