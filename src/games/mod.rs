//! Game titles, versions and version detection
//!
//! Titles are data, not code: each [`TitleConfig`] names its decision
//! family, candidate process names, variants and per-version field tables.
//! The [`GameCatalog`] indexes them and the [`VersionDetector`] matches a
//! running executable against the known builds.

mod config;
mod detect;
mod registry;

pub use config::{CatalogFile, RepeatableSegment, TitleConfig, VariantConfig, VersionConfig};
pub use detect::{hash_executable, DetectionResult, VersionDetector};
pub use registry::GameCatalog;

use serde::{Deserialize, Serialize};

/// Decision family shared by titles with similar memory semantics
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Family {
    /// Per-segment timer, completed segment times kept in save-state memory
    Classic,
    /// One monotonic tick counter since New Game
    Later,
}

impl Family {
    /// Native tick rate used when a title does not declare one
    pub fn default_tick_rate(&self) -> u32 {
        match self {
            Family::Classic => 30,
            Family::Later => 60,
        }
    }
}

/// Identity of one exact build of one game
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct VersionDescriptor {
    pub title_id: String,
    pub version_id: String,
    pub family: Family,
}

impl std::fmt::Display for VersionDescriptor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({})", self.title_id, self.version_id)
    }
}

/// A game/category combination with its own ledger
///
/// Resolved from a title's [`VariantConfig`] with the title's tick rate
/// filled in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Variant {
    pub id: String,
    pub title_id: String,
    pub first_segment: i64,
    pub final_segment: i64,
    /// Hub segment counted at most once per attempt
    pub home_segment: Option<i64>,
    /// Native ticks per second
    pub tick_rate: u32,
}

impl Variant {
    pub fn is_home(&self, segment_id: i64) -> bool {
        self.home_segment == Some(segment_id)
    }
}
