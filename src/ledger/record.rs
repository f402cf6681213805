//! Segment records

use serde::{Deserialize, Serialize};

/// How the player reached the segment that followed this one
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransitionDirection {
    /// The next segment has a higher id than the completed one
    FromLower,
    /// Any other transition (backtracking, hub, unknown)
    #[default]
    Other,
}

impl TransitionDirection {
    /// Direction of a move from `from` to `to`
    pub fn between(from: i64, to: i64) -> Self {
        if to > from {
            TransitionDirection::FromLower
        } else {
            TransitionDirection::Other
        }
    }
}

/// One completed (or ignored) segment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SegmentRecord {
    pub segment_id: i64,
    /// In-game ticks spent in the segment, at the variant's native rate
    pub igt_ticks: u64,
    pub max_completions: u32,
    /// Split that does not complete a segment (secrets); always 0 ticks
    pub ignored: bool,
    pub transition_direction: TransitionDirection,
}

impl SegmentRecord {
    /// A completed segment
    pub fn completed(segment_id: i64, igt_ticks: u64) -> Self {
        Self {
            segment_id,
            igt_ticks,
            max_completions: 1,
            ignored: false,
            transition_direction: TransitionDirection::Other,
        }
    }

    /// A split that does not complete its segment
    pub fn ignored(segment_id: i64) -> Self {
        Self {
            segment_id,
            igt_ticks: 0,
            max_completions: 1,
            ignored: true,
            transition_direction: TransitionDirection::Other,
        }
    }

    pub fn with_max_completions(mut self, max: u32) -> Self {
        self.max_completions = max;
        self
    }

    pub fn with_direction(mut self, direction: TransitionDirection) -> Self {
        self.transition_direction = direction;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_direction_between() {
        assert_eq!(TransitionDirection::between(3, 4), TransitionDirection::FromLower);
        assert_eq!(TransitionDirection::between(4, 3), TransitionDirection::Other);
        assert_eq!(TransitionDirection::between(4, 4), TransitionDirection::Other);
    }

    #[test]
    fn test_ignored_carries_no_time() {
        let r = SegmentRecord::ignored(5);
        assert!(r.ignored);
        assert_eq!(r.igt_ticks, 0);
    }
}
