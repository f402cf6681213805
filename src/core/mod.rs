//! Core autosplitter abstractions
//!
//! This module contains the main types for the autosplitter:
//! - `GameSession` - Detection, binding and per-tick sampling
//! - `Autosplitter` - Host-facing poll contract and lifecycle callbacks
//! - `AutosplitterState` - Serializable status snapshot
//! - `VersionStatus` - Payload of version-changed notifications

mod events;
mod runner;
mod session;
mod state;

pub use events::{EventHandler, SubscriptionId, VersionCallback, VersionStatus};
pub use runner::Autosplitter;
pub use session::GameSession;
pub use state::AutosplitterState;
