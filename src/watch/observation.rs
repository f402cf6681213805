//! Current/previous view over the watched fields

use std::collections::HashMap;

use super::Value;

/// The newest and the immediately prior sample of every watched field
///
/// Scalar fields hold one element, array fields hold `count`. A field the
/// bound version does not declare is simply absent: every accessor returns
/// `None` and `changed` is false.
#[derive(Debug, Clone, Default)]
pub struct Observation {
    current: HashMap<String, Vec<Value>>,
    old: HashMap<String, Vec<Value>>,
}

impl Observation {
    pub fn new() -> Self {
        Self::default()
    }

    /// Promote the current sample to `old` and install a new current sample
    pub(crate) fn commit(&mut self, sample: HashMap<String, Vec<Value>>) {
        self.old = std::mem::replace(&mut self.current, sample);
    }

    /// Set a scalar field's previous and current value directly
    pub fn insert(&mut self, name: &str, old: Value, current: Value) -> &mut Self {
        self.old.insert(name.to_string(), vec![old]);
        self.current.insert(name.to_string(), vec![current]);
        self
    }

    /// Set an array field's previous and current elements directly
    pub fn insert_array(&mut self, name: &str, old: Vec<Value>, current: Vec<Value>) -> &mut Self {
        self.old.insert(name.to_string(), old);
        self.current.insert(name.to_string(), current);
        self
    }

    /// Whether the field has a current sample
    pub fn contains(&self, name: &str) -> bool {
        self.current.contains_key(name)
    }

    /// Names of every field with a current sample
    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.current.keys().map(|k| k.as_str())
    }

    pub fn current(&self, name: &str) -> Option<Value> {
        self.current.get(name).and_then(|v| v.first().copied())
    }

    pub fn old(&self, name: &str) -> Option<Value> {
        self.old.get(name).and_then(|v| v.first().copied())
    }

    /// `current != old`; false for absent fields
    pub fn changed(&self, name: &str) -> bool {
        match (self.current.get(name), self.old.get(name)) {
            (Some(cur), Some(old)) => cur != old,
            _ => false,
        }
    }

    pub fn current_i64(&self, name: &str) -> Option<i64> {
        self.current(name).map(|v| v.as_i64())
    }

    pub fn old_i64(&self, name: &str) -> Option<i64> {
        self.old(name).map(|v| v.as_i64())
    }

    pub fn current_f64(&self, name: &str) -> Option<f64> {
        self.current(name).map(|v| v.as_f64())
    }

    pub fn old_f64(&self, name: &str) -> Option<f64> {
        self.old(name).map(|v| v.as_f64())
    }

    pub fn current_bool(&self, name: &str) -> Option<bool> {
        self.current(name).map(|v| v.as_bool())
    }

    pub fn old_bool(&self, name: &str) -> Option<bool> {
        self.old(name).map(|v| v.as_bool())
    }

    /// Every element of an array field's current sample
    pub fn current_array(&self, name: &str) -> Option<&[Value]> {
        self.current.get(name).map(|v| v.as_slice())
    }

    /// Previous and current value of a scalar field, if both exist
    pub fn edge_i64(&self, name: &str) -> Option<(i64, i64)> {
        Some((self.old_i64(name)?, self.current_i64(name)?))
    }

    /// Previous and current value of a scalar field as booleans
    pub fn edge_bool(&self, name: &str) -> Option<(bool, bool)> {
        Some((self.old_bool(name)?, self.current_bool(name)?))
    }

    /// Previous and current value of a scalar field as floats
    pub fn edge_f64(&self, name: &str) -> Option<(f64, f64)> {
        Some((self.old_f64(name)?, self.current_f64(name)?))
    }

    pub fn clear(&mut self) {
        self.current.clear();
        self.old.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(level: i64) -> HashMap<String, Vec<Value>> {
        HashMap::from([("level".to_string(), vec![Value::I64(level)])])
    }

    #[test]
    fn test_commit_shifts_samples() {
        let mut obs = Observation::new();
        obs.commit(sample(1));
        assert_eq!(obs.current_i64("level"), Some(1));
        assert_eq!(obs.old_i64("level"), None);
        assert!(!obs.changed("level"));

        obs.commit(sample(2));
        assert_eq!(obs.edge_i64("level"), Some((1, 2)));
        assert!(obs.changed("level"));

        obs.commit(sample(2));
        assert!(!obs.changed("level"));
    }

    #[test]
    fn test_absent_field_has_no_edge() {
        let obs = Observation::new();
        assert!(!obs.contains("health"));
        assert!(!obs.changed("health"));
        assert_eq!(obs.edge_f64("health"), None);
    }

    #[test]
    fn test_insert_helpers() {
        let mut obs = Observation::new();
        obs.insert("complete", Value::Bool(false), Value::Bool(true))
            .insert_array(
                "saved",
                vec![Value::U32(0); 2],
                vec![Value::U32(10), Value::U32(20)],
            );

        assert_eq!(obs.edge_bool("complete"), Some((false, true)));
        assert_eq!(obs.current_array("saved").map(|a| a.len()), Some(2));
        assert_eq!(obs.current_i64("saved"), Some(10));
    }
}
