//! Segments completed in the current attempt

use serde::Serialize;

/// Ordered list of completed segment ids for one variant
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CompletedSegments(Vec<i64>);

impl CompletedSegments {
    pub fn new(ids: Vec<i64>) -> Self {
        Self(ids)
    }

    pub fn contains(&self, segment_id: i64) -> bool {
        self.0.contains(&segment_id)
    }

    /// How many times a segment was completed
    pub fn count(&self, segment_id: i64) -> u32 {
        self.0.iter().filter(|&&id| id == segment_id).count() as u32
    }

    pub fn iter(&self) -> impl Iterator<Item = i64> + '_ {
        self.0.iter().copied()
    }

    pub fn as_slice(&self) -> &[i64] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_count_and_order() {
        let done = CompletedSegments::new(vec![1, 2, 4, 2]);
        assert!(done.contains(4));
        assert!(!done.contains(3));
        assert_eq!(done.count(2), 2);
        assert_eq!(done.iter().collect::<Vec<_>>(), vec![1, 2, 4, 2]);
    }
}
