//! Shared fixtures published by helper modules.

use specdrive_runtime::Value;

/// Ordered name → value map visible to every spec and helper loaded after it is filled.
///
/// Inserting an existing name replaces its value in place (last write wins).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FixtureRegistry {
    entries: Vec<(String, Value)>,
}

impl FixtureRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace `name`. Returns the previous value, if any.
    pub fn insert(&mut self, name: impl Into<String>, value: Value) -> Option<Value> {
        let name = name.into();
        match self.entries.iter_mut().find(|(n, _)| *n == name) {
            Some((_, slot)) => Some(std::mem::replace(slot, value)),
            None => {
                self.entries.push((name, value));
                None
            }
        }
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.entries.iter().find(|(n, _)| n == name).map(|(_, v)| v)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries in first-insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.entries.iter().map(|(n, v)| (n.as_str(), v))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_last_write_wins() {
        let mut fixtures = FixtureRegistry::new();
        assert_eq!(fixtures.insert("baz", Value::Int(1)), None);
        assert_eq!(fixtures.insert("baz", Value::Int(42)), Some(Value::Int(1)));
        assert_eq!(fixtures.get("baz"), Some(&Value::Int(42)));
        assert_eq!(fixtures.len(), 1);
    }

    #[test]
    fn test_iteration_keeps_first_insertion_order() {
        let mut fixtures = FixtureRegistry::new();
        fixtures.insert("b", Value::Null);
        fixtures.insert("a", Value::Null);
        fixtures.insert("b", Value::Bool(true));
        let names: Vec<&str> = fixtures.iter().map(|(n, _)| n).collect();
        assert_eq!(names, vec!["b", "a"]);
    }

    #[test]
    fn test_missing_name() {
        let fixtures = FixtureRegistry::new();
        assert!(fixtures.is_empty());
        assert!(!fixtures.contains("nope"));
    }
}
