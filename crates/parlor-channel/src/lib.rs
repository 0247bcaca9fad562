//! The realtime channel contract consumed by the Parlor room lifecycle.
//!
//! The wire-level channel implementation (publish/subscribe, reconnection,
//! message framing) lives outside this workspace. The lifecycle layer needs
//! exactly four things from a channel: `attach`, `detach`, its current
//! connectivity state, and its last recorded error — so that is all this
//! crate defines.
//!
//! # Key types
//!
//! - [`RealtimeChannel`] — the async seam a channel implementation provides
//! - [`ChannelState`] — the connectivity states a channel reports
//! - [`ErrorInfo`] — the structured error of the channel layer

mod channel;
mod error;
mod state;

pub use channel::RealtimeChannel;
pub use error::ErrorInfo;
pub use state::ChannelState;
