//! String interning for binary encodings
//!
//! Indices are handed out in first-seen order, so encoding the same graph
//! with the same traversal always produces the same table.

use hashbrown::HashMap;

#[derive(Debug, Default, Clone)]
pub struct StringTable {
    strings: Vec<String>,
    lookup: HashMap<String, u32>,
}

impl StringTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Intern `text`, returning its existing index when already present
    pub fn add(&mut self, text: &str) -> u32 {
        if let Some(&index) = self.lookup.get(text) {
            return index;
        }
        let index = self.strings.len() as u32;
        self.strings.push(text.to_string());
        self.lookup.insert(text.to_string(), index);
        index
    }

    pub fn get(&self, index: u32) -> Option<&str> {
        self.strings.get(index as usize).map(String::as_str)
    }

    /// Replace the table with decoded strings, rebuilding the reverse index
    ///
    /// Duplicates keep their first index in the reverse lookup.
    pub fn load(&mut self, strings: Vec<String>) {
        self.lookup.clear();
        for (i, s) in strings.iter().enumerate() {
            self.lookup.entry(s.clone()).or_insert(i as u32);
        }
        self.strings = strings;
    }

    pub fn strings(&self) -> &[String] {
        &self.strings
    }

    pub fn len(&self) -> usize {
        self.strings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.strings.is_empty()
    }

    pub fn clear(&mut self) {
        self.strings.clear();
        self.lookup.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_is_idempotent() {
        let mut table = StringTable::new();
        let a = table.add("cube");
        let b = table.add("sphere");
        assert_eq!(table.add("cube"), a);
        assert_ne!(a, b);
        assert_eq!(table.len(), 2);
    }

    #[test]
    fn test_first_seen_order() {
        let mut table = StringTable::new();
        table.add("z");
        table.add("a");
        table.add("z");
        assert_eq!(table.strings(), &["z".to_string(), "a".to_string()]);
        assert_eq!(table.get(1), Some("a"));
        assert_eq!(table.get(2), None);
    }

    #[test]
    fn test_load_rebuilds_lookup() {
        let mut table = StringTable::new();
        table.add("stale");
        table.load(vec!["one".into(), "two".into()]);
        assert_eq!(table.get(0), Some("one"));
        assert_eq!(table.add("two"), 1);
        assert_eq!(table.add("three"), 2);
    }
}
