//! Per-variant segment stack

use std::collections::BTreeMap;

use serde::Serialize;

use super::{CompletedSegments, SegmentRecord};

/// Completed segments of one variant plus their running total
///
/// `total` always equals the sum of `igt_ticks` over `stack`, saturating at
/// `u64::MAX`. Home records live in a separate completion set and never
/// count towards the total.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VariantLedger {
    tick_rate: u32,
    final_segment: i64,
    stack: Vec<SegmentRecord>,
    total: u64,
    home: BTreeMap<i64, SegmentRecord>,
}

impl VariantLedger {
    pub fn new(tick_rate: u32, final_segment: i64) -> Self {
        Self {
            tick_rate,
            final_segment,
            stack: Vec::new(),
            total: 0,
            home: BTreeMap::new(),
        }
    }

    pub fn push(&mut self, record: SegmentRecord) {
        self.total = self.total.saturating_add(record.igt_ticks);
        self.stack.push(record);
    }

    pub fn pop(&mut self) -> Option<SegmentRecord> {
        let record = self.stack.pop()?;
        // Recomputed so a saturated total cannot drift
        self.total = self
            .stack
            .iter()
            .fold(0, |total, r| total.saturating_add(r.igt_ticks));
        Some(record)
    }

    /// Mark a home segment completed. Returns false if it already was.
    pub fn complete_home(&mut self, record: SegmentRecord) -> bool {
        if self.home.contains_key(&record.segment_id) {
            return false;
        }
        self.home.insert(record.segment_id, record);
        true
    }

    pub fn undo_home(&mut self, segment_id: i64) -> Option<SegmentRecord> {
        self.home.remove(&segment_id)
    }

    pub fn is_home_completed(&self, segment_id: i64) -> bool {
        self.home.contains_key(&segment_id)
    }

    /// Stored ticks at this variant's native rate
    pub fn total(&self) -> u64 {
        self.total
    }

    pub fn tick_rate(&self) -> u32 {
        self.tick_rate
    }

    pub fn records(&self) -> &[SegmentRecord] {
        &self.stack
    }

    /// Whether the variant's final segment has been recorded
    pub fn is_complete(&self) -> bool {
        self.stack
            .iter()
            .any(|r| !r.ignored && r.segment_id == self.final_segment)
    }

    /// Non-ignored segment ids in push order, home segments excluded
    pub fn completed_segments(&self) -> CompletedSegments {
        CompletedSegments::new(
            self.stack
                .iter()
                .filter(|r| !r.ignored)
                .map(|r| r.segment_id)
                .collect(),
        )
    }

    pub fn is_empty(&self) -> bool {
        self.stack.is_empty() && self.home.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_total_tracks_stack() {
        let mut ledger = VariantLedger::new(30, 3);
        ledger.push(SegmentRecord::completed(1, 100));
        ledger.push(SegmentRecord::ignored(2));
        ledger.push(SegmentRecord::completed(2, 40));
        assert_eq!(ledger.total(), 140);
        assert_eq!(ledger.completed_segments().as_slice(), &[1, 2]);

        let popped = ledger.pop().unwrap();
        assert_eq!(popped.igt_ticks, 40);
        assert_eq!(ledger.total(), 100);
        assert_eq!(
            ledger.total(),
            ledger.records().iter().map(|r| r.igt_ticks).sum::<u64>()
        );
    }

    #[test]
    fn test_total_saturates_and_recovers_on_pop() {
        let mut ledger = VariantLedger::new(30, 9);
        ledger.push(SegmentRecord::completed(1, 5));
        ledger.push(SegmentRecord::completed(2, u64::MAX - 1));
        ledger.push(SegmentRecord::completed(3, u64::MAX));
        assert_eq!(ledger.total(), u64::MAX);

        ledger.pop();
        assert_eq!(ledger.total(), u64::MAX);
        ledger.pop();
        assert_eq!(ledger.total(), 5);
    }

    #[test]
    fn test_home_counted_once() {
        let mut ledger = VariantLedger::new(30, 3);
        assert!(ledger.complete_home(SegmentRecord::completed(0, 10)));
        assert!(!ledger.complete_home(SegmentRecord::completed(0, 20)));
        assert_eq!(ledger.total(), 0);
        assert!(ledger.is_home_completed(0));
        assert!(ledger.completed_segments().is_empty());

        assert_eq!(ledger.undo_home(0).map(|r| r.igt_ticks), Some(10));
        assert!(ledger.is_empty());
    }

    #[test]
    fn test_complete_only_on_final_segment() {
        let mut ledger = VariantLedger::new(30, 2);
        ledger.push(SegmentRecord::completed(1, 5));
        assert!(!ledger.is_complete());
        ledger.push(SegmentRecord::ignored(2));
        assert!(!ledger.is_complete());
        ledger.push(SegmentRecord::completed(2, 5));
        assert!(ledger.is_complete());
    }
}
