//! Run mode and toggles chosen by the user

use std::sync::Arc;

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};

/// Exactly one run mode is active at a time
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunMode {
    #[default]
    FullGame,
    IndividualSegment,
    /// The run ends when the player character dies
    Deathrun,
}

/// User settings read by the decision policies every tick
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RunSettings {
    pub mode: RunMode,
    pub auto_reset: bool,
    pub split_on_secret: bool,
    pub split_on_cutscene: bool,
}

impl RunSettings {
    pub fn new(mode: RunMode) -> Self {
        Self {
            mode,
            ..Self::default()
        }
    }

    pub fn is_deathrun(&self) -> bool {
        self.mode == RunMode::Deathrun
    }
}

/// Settings handle shared with the settings collaborator
pub type SharedSettings = Arc<RwLock<RunSettings>>;

pub fn shared_settings(settings: RunSettings) -> SharedSettings {
    Arc::new(RwLock::new(settings))
}
