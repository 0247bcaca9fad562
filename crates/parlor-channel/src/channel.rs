//! The seam between the room lifecycle layer and a concrete channel.

use async_trait::async_trait;

use crate::{ChannelState, ErrorInfo};

/// A realtime channel as seen by the room lifecycle layer.
///
/// Implementations own reconnection, framing, and the rest of the wire
/// protocol; the lifecycle layer only drives attach/detach and observes the
/// resulting state.
///
/// The state accessors are async on purpose. The channel mutates this state
/// from its own task, so a value read before a suspension point may be stale
/// by the time it is used — callers must re-read rather than cache.
#[async_trait]
pub trait RealtimeChannel: Send + Sync {
    /// Attaches the channel.
    ///
    /// When this returns an error, the channel's [`state`](Self::state) has
    /// already settled into the terminal state for this attempt (suspended
    /// or failed) — reporting failure from an in-progress state is a
    /// contract violation.
    async fn attach(&self) -> Result<(), ErrorInfo>;

    /// Detaches the channel. Same settling contract as
    /// [`attach`](Self::attach).
    async fn detach(&self) -> Result<(), ErrorInfo>;

    /// The channel's current connectivity state.
    async fn state(&self) -> ChannelState;

    /// The last error recorded by the channel. Set by the time the channel
    /// reports [`ChannelState::Failed`].
    async fn error_reason(&self) -> Option<ErrorInfo>;
}
