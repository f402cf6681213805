//! Catalog configuration types for loading titles from TOML files
//!
//! A catalog file lists one or more `[[title]]` tables:
//!
//! ```toml
//! [[title]]
//! id = "lost-temple"
//! name = "Lost Temple"
//! family = "classic"
//! process_names = ["temple.exe"]
//!
//! [title.classic]
//! new_game_choice = 0
//! exit_choice = 2
//!
//! [[title.variants]]
//! id = "lost-temple"
//! first_segment = 1
//! final_segment = 15
//!
//! [[title.versions]]
//! id = "1.0"
//! hash = "9f86d081884c7d659a2feaa0c55ad015a3bf4f1b2b0b822cd15d6c15b0f00a08"
//!
//! [title.versions.fields.level]
//! type = "u8"
//! address = [0x1000]
//! ```

use serde::{Deserialize, Serialize};

use super::{Family, Variant};
use crate::engine::{ClassicParams, LaterParams};
use crate::error::{AutosplitterError, Result};
use crate::watch::FieldTable;

// =============================================================================
// FILE LAYOUT
// =============================================================================

/// One catalog document
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct CatalogFile {
    #[serde(default)]
    pub title: Vec<TitleConfig>,
}

/// A supported game title
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TitleConfig {
    pub id: String,
    pub name: String,
    pub family: Family,
    pub process_names: Vec<String>,

    /// Native ticks per second; defaults by family
    #[serde(default)]
    pub tick_rate: Option<u32>,

    #[serde(default)]
    pub classic: ClassicParams,

    #[serde(default)]
    pub later: LaterParams,

    pub variants: Vec<VariantConfig>,

    /// Segments that may be completed more than once per attempt
    #[serde(default)]
    pub repeatable_segments: Vec<RepeatableSegment>,

    #[serde(default)]
    pub versions: Vec<VersionConfig>,
}

/// A variant as written in the catalog
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct VariantConfig {
    pub id: String,
    pub first_segment: i64,
    pub final_segment: i64,
    #[serde(default)]
    pub home_segment: Option<i64>,
    /// Value of the `variant` field that selects this variant
    #[serde(default)]
    pub selector: Option<i64>,
}

#[derive(Debug, Clone, Copy, Deserialize, Serialize)]
pub struct RepeatableSegment {
    pub segment: i64,
    pub max_completions: u32,
}

/// One known build: executable hash plus its field table
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct VersionConfig {
    pub id: String,
    /// Hex SHA-256 of the executable
    pub hash: String,
    #[serde(default)]
    pub fields: FieldTable,
}

// =============================================================================
// TITLE HELPERS
// =============================================================================

impl TitleConfig {
    /// Native ticks per second
    pub fn tick_rate(&self) -> u32 {
        self.tick_rate
            .unwrap_or_else(|| self.family.default_tick_rate())
    }

    /// Completion limit for a segment (1 unless listed as repeatable)
    pub fn max_completions(&self, segment_id: i64) -> u32 {
        self.repeatable_segments
            .iter()
            .find(|r| r.segment == segment_id)
            .map(|r| r.max_completions)
            .unwrap_or(1)
    }

    pub fn version(&self, version_id: &str) -> Option<&VersionConfig> {
        self.versions.iter().find(|v| v.id == version_id)
    }

    /// Resolve a catalog variant into a runtime [`Variant`]
    pub fn variant(&self, config: &VariantConfig) -> Variant {
        Variant {
            id: config.id.clone(),
            title_id: self.id.clone(),
            first_segment: config.first_segment,
            final_segment: config.final_segment,
            home_segment: config.home_segment,
            tick_rate: self.tick_rate(),
        }
    }

    /// Variant selected by the current value of the `variant` field
    ///
    /// Falls back to the first variant when there is no selector value or
    /// none matches.
    pub fn select_variant(&self, selector: Option<i64>) -> Option<Variant> {
        let chosen = selector
            .and_then(|s| self.variants.iter().find(|v| v.selector == Some(s)))
            .or_else(|| self.variants.first())?;
        Some(self.variant(chosen))
    }

    /// Check the title for mistakes that would only show up mid-run
    pub fn validate(&self) -> Result<()> {
        if self.process_names.is_empty() {
            return Err(AutosplitterError::ConfigError(format!(
                "title '{}' has no process names",
                self.id
            )));
        }
        if self.variants.is_empty() {
            return Err(AutosplitterError::ConfigError(format!(
                "title '{}' has no variants",
                self.id
            )));
        }
        if self.tick_rate == Some(0) {
            return Err(AutosplitterError::ConfigError(format!(
                "title '{}' has a zero tick rate",
                self.id
            )));
        }
        for version in &self.versions {
            if version.hash.len() != 64 || !version.hash.chars().all(|c| c.is_ascii_hexdigit()) {
                return Err(AutosplitterError::ConfigError(format!(
                    "title '{}' version '{}' has a malformed hash",
                    self.id, version.id
                )));
            }
            for (name, spec) in &version.fields {
                if spec.address.is_empty() || spec.count == 0 {
                    return Err(AutosplitterError::ConfigError(format!(
                        "title '{}' version '{}' field '{}' has no address or a zero count",
                        self.id, version.id, name
                    )));
                }
            }
        }
        Ok(())
    }
}

impl CatalogFile {
    pub fn from_toml_str(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }
}
