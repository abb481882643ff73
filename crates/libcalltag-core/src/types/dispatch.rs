use std::collections::{BTreeMap, HashSet};

use serde::{Deserialize, Serialize};

use crate::hash::hash_tag;
use crate::location::ordinal_cmp;
use crate::types::CallSite;

/// A location key paired with its hash tag
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MappingEntry {
    pub location: String,
    pub tag: String,
}

/// Deduplicated mapping from location keys to hash tags, ordered by
/// ordinal UTF-16 comparison of the key.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DispatchTable {
    entries: Vec<MappingEntry>,
}

impl DispatchTable {
    /// Build a table from location keys in any order, duplicates allowed
    pub fn from_keys<I>(keys: I) -> Self
    where
        I: IntoIterator<Item = String>,
    {
        let unique: HashSet<String> = keys.into_iter().collect();
        let mut locations: Vec<String> = unique.into_iter().collect();
        // Set iteration order is arbitrary; the sort is what makes output stable
        locations.sort_by(|a, b| ordinal_cmp(a, b));

        let entries = locations
            .into_iter()
            .map(|location| MappingEntry {
                tag: hash_tag(&location),
                location,
            })
            .collect();
        Self { entries }
    }

    pub fn from_call_sites<'a, I>(sites: I) -> Self
    where
        I: IntoIterator<Item = &'a CallSite>,
    {
        Self::from_keys(sites.into_iter().map(CallSite::location_key))
    }

    pub fn entries(&self) -> &[MappingEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Resolve a location to its tag, or hand the location back unchanged
    pub fn lookup_or_key<'a>(&'a self, location: &'a str) -> &'a str {
        self.entries
            .binary_search_by(|entry| ordinal_cmp(&entry.location, location))
            .map(|idx| self.entries[idx].tag.as_str())
            .unwrap_or(location)
    }

    /// Tags shared by more than one distinct location.
    ///
    /// Collisions are reported, never resolved: both keys keep the same tag.
    pub fn collisions(&self) -> Vec<(String, Vec<String>)> {
        let mut by_tag: BTreeMap<&str, Vec<String>> = BTreeMap::new();
        for entry in &self.entries {
            by_tag.entry(entry.tag.as_str()).or_default().push(entry.location.clone());
        }
        by_tag
            .into_iter()
            .filter(|(_, locations)| locations.len() > 1)
            .map(|(tag, locations)| (tag.to_string(), locations))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn keys(list: &[&str]) -> Vec<String> {
        list.iter().map(|k| k.to_string()).collect()
    }

    #[test]
    fn test_sorted_and_deduplicated() {
        let table = DispatchTable::from_keys(keys(&["b.f:L2", "a.f:L1", "b.f:L2", "B.f:L9"]));
        let locations: Vec<&str> = table.entries().iter().map(|e| e.location.as_str()).collect();
        assert_eq!(locations, vec!["B.f:L9", "a.f:L1", "b.f:L2"]);
    }

    #[test]
    fn test_order_independent_of_input_order() {
        let forward = DispatchTable::from_keys(keys(&["x.a:L1", "x.b:L2", "y.a:L3"]));
        let backward = DispatchTable::from_keys(keys(&["y.a:L3", "x.b:L2", "x.a:L1"]));
        assert_eq!(forward, backward);
    }

    #[test]
    fn test_lookup_hit_and_fallback() {
        let table = DispatchTable::from_keys(keys(&["Test0.Main:L38"]));
        assert_eq!(table.lookup_or_key("Test0.Main:L38"), "#c9c32584");
        assert_eq!(table.lookup_or_key("Test0.Main:L40"), "Test0.Main:L40");
        assert_eq!(DispatchTable::default().lookup_or_key("x.y:L1"), "x.y:L1");
    }

    #[test]
    fn test_lines_sort_as_text() {
        let table = DispatchTable::from_keys(keys(&["m.f:L9", "m.f:L10"]));
        assert_eq!(table.entries()[0].location, "m.f:L10");
    }

    #[test]
    fn test_no_collisions_for_distinct_tags() {
        let table = DispatchTable::from_keys(keys(&["a.f:L1", "a.f:L2"]));
        assert!(table.collisions().is_empty());
    }
}
