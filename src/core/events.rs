//! Version-changed notifications

use serde::{Deserialize, Serialize};

use crate::games::VersionDescriptor;

/// What the session currently knows about the running game
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VersionStatus {
    /// No candidate process, or it exited
    #[default]
    None,
    /// A candidate runs but its executable hash is not in the catalog
    Unknown(String),
    /// A known build is bound
    Found(VersionDescriptor),
}

impl std::fmt::Display for VersionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            VersionStatus::None => write!(f, "not running"),
            VersionStatus::Unknown(hash) => write!(f, "unknown version (sha256 {})", hash),
            VersionStatus::Found(version) => write!(f, "{}", version),
        }
    }
}

/// Handle returned by [`EventHandler::subscribe`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

/// Callback type for version-changed events
pub type VersionCallback = Box<dyn Fn(&VersionStatus) + Send + Sync>;

/// Event handler that can have multiple listeners
///
/// Listeners live exactly as long as the handler; dropping the owning
/// session drops every callback.
pub struct EventHandler {
    callbacks: Vec<(SubscriptionId, VersionCallback)>,
    next_id: u64,
}

impl EventHandler {
    /// Create a new event handler
    pub fn new() -> Self {
        Self {
            callbacks: Vec::new(),
            next_id: 0,
        }
    }

    /// Add a callback for version-changed events
    pub fn subscribe(&mut self, callback: VersionCallback) -> SubscriptionId {
        let id = SubscriptionId(self.next_id);
        self.next_id += 1;
        self.callbacks.push((id, callback));
        id
    }

    /// Remove a callback. Returns false if the id was not registered.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.callbacks.len();
        self.callbacks.retain(|(cid, _)| *cid != id);
        self.callbacks.len() != before
    }

    /// Emit an event to all listeners
    pub fn emit(&self, status: &VersionStatus) {
        for (_, callback) in &self.callbacks {
            callback(status);
        }
    }

    /// Check if there are any listeners
    pub fn has_listeners(&self) -> bool {
        !self.callbacks.is_empty()
    }
}

impl Default for EventHandler {
    fn default() -> Self {
        Self::new()
    }
}
