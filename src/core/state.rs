//! Autosplitter state snapshot for status displays

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::VersionStatus;

/// Point-in-time view of the autosplitter
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct AutosplitterState {
    /// Whether a known build is bound
    pub process_attached: bool,
    /// Process ID if attached
    pub process_id: Option<u32>,
    pub process_name: Option<String>,
    pub version: VersionStatus,
    /// Whether the last refresh produced fresh samples
    pub last_refresh_ok: bool,
    pub active_variant: Option<String>,
    pub current_segment: Option<i64>,
    /// Completed segments of the active variant, in split order
    pub completed_segments: Vec<i64>,
    /// Stored ticks per variant at native rate
    pub ledger_totals: BTreeMap<String, u64>,
    /// Number of splits that can be undone
    pub undo_depth: usize,
}

impl AutosplitterState {
    /// Create a new default state
    pub fn new() -> Self {
        Self::default()
    }

    /// Check if a segment has been completed
    pub fn is_segment_completed(&self, segment_id: i64) -> bool {
        self.completed_segments.contains(&segment_id)
    }

    /// Stored ticks for a variant
    pub fn variant_total(&self, variant_id: &str) -> u64 {
        self.ledger_totals.get(variant_id).copied().unwrap_or(0)
    }
}
