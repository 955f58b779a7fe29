use serde::ser::{Serialize, SerializeMap, Serializer};
use std::collections::HashMap;

/// Category → summed amount, kept in first-insertion order.
///
/// Serializes as a JSON object whose keys appear in insertion order.
#[derive(Debug, Clone, Default)]
pub struct CategoryTotals {
    entries: Vec<(String, f64)>,
    index: HashMap<String, usize>,
}

impl CategoryTotals {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, category: &str, amount: f64) {
        match self.index.get(category) {
            Some(&i) => self.entries[i].1 += amount,
            None => {
                self.index.insert(category.to_string(), self.entries.len());
                self.entries.push((category.to_string(), amount));
            }
        }
    }

    pub fn get(&self, category: &str) -> Option<f64> {
        self.index.get(category).map(|&i| self.entries[i].1)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.entries.iter().map(|(c, v)| (c.as_str(), *v))
    }

    pub fn categories(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(c, _)| c.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn sum(&self) -> f64 {
        self.entries.iter().map(|(_, v)| v).sum()
    }

    /// First strict maximum in insertion order, so ties go to the category
    /// seen first.
    pub fn top(&self) -> Option<&str> {
        let mut best: Option<&(String, f64)> = None;
        for entry in &self.entries {
            if best.is_none_or(|b| entry.1 > b.1) {
                best = Some(entry);
            }
        }
        best.map(|(c, _)| c.as_str())
    }
}

impl PartialEq for CategoryTotals {
    fn eq(&self, other: &Self) -> bool {
        self.entries == other.entries
    }
}

impl Serialize for CategoryTotals {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (category, amount) in &self.entries {
            map.serialize_entry(category, amount)?;
        }
        map.end()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accumulates_in_insertion_order() {
        let mut totals = CategoryTotals::new();
        totals.add("Food", 10.0);
        totals.add("Rent", 100.0);
        totals.add("Food", 5.0);

        let entries: Vec<_> = totals.iter().collect();
        assert_eq!(entries, vec![("Food", 15.0), ("Rent", 100.0)]);
        assert_eq!(totals.get("Food"), Some(15.0));
        assert_eq!(totals.get("Misc"), None);
        assert_eq!(totals.sum(), 115.0);
    }

    #[test]
    fn test_top_prefers_first_seen_on_ties() {
        let mut totals = CategoryTotals::new();
        assert_eq!(totals.top(), None);

        totals.add("Beverage", 50.0);
        totals.add("Food", 50.0);
        assert_eq!(totals.top(), Some("Beverage"));

        totals.add("Food", 0.5);
        assert_eq!(totals.top(), Some("Food"));
    }

    #[test]
    fn test_serializes_as_ordered_object() {
        let mut totals = CategoryTotals::new();
        totals.add("Zebra", 1.0);
        totals.add("Apple", 2.5);
        let json = serde_json::to_string(&totals).unwrap();
        assert_eq!(json, r#"{"Zebra":1.0,"Apple":2.5}"#);
    }
}
