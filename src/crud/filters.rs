//! List-view filter sets

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::hash::{Hash, Hasher};

pub const SEARCH: &str = "search";
pub const STATUS: &str = "status";
pub const PAGE: &str = "page";
pub const LIMIT: &str = "limit";
pub const SORT_BY: &str = "sortBy";
pub const SORT_ORDER: &str = "sortOrder";

/// Query parameters describing what a list view wants from the server.
///
/// Keys are kept sorted, so two sets with the same pairs serialize to the same
/// key regardless of the order they were built in.
///
/// An empty value marks a cleared filter. It is kept in the set so that a
/// partial passed to `merge` can remove the key, but it never reaches the
/// query, the memo key or equality.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FilterSet(BTreeMap<String, String>);

impl FilterSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert
    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.set(key, value);
        self
    }

    /// Insert or replace; an empty value marks the key as cleared
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.0.insert(key.into(), value.into());
    }

    /// Clear a filter
    pub fn remove(&mut self, key: &str) {
        self.0.remove(key);
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.0
            .get(key)
            .map(String::as_str)
            .filter(|v| !v.is_empty())
    }

    /// Apply `partial`: non-empty values replace, empty values remove
    pub fn merge(&mut self, partial: FilterSet) {
        for (key, value) in partial.0 {
            if value.is_empty() {
                self.0.remove(&key);
            } else {
                self.0.insert(key, value);
            }
        }
    }

    pub fn is_empty(&self) -> bool {
        self.iter().next().is_none()
    }

    pub fn len(&self) -> usize {
        self.iter().count()
    }

    /// Canonical serialized form used for memoization
    pub fn key(&self) -> String {
        self.iter()
            .map(|(k, v)| format!("{}={}", escape(k), escape(v)))
            .collect::<Vec<_>>()
            .join("&")
    }

    pub fn to_query(&self) -> Vec<(String, String)> {
        self.iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    /// Active filters, skipping cleared keys
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0
            .iter()
            .filter(|(_, v)| !v.is_empty())
            .map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

impl PartialEq for FilterSet {
    fn eq(&self, other: &Self) -> bool {
        self.iter().eq(other.iter())
    }
}

impl Eq for FilterSet {}

impl Hash for FilterSet {
    fn hash<H: Hasher>(&self, state: &mut H) {
        for pair in self.iter() {
            pair.hash(state);
        }
    }
}

// Keeps `a=b&c` and `a=b%26c` from colliding
fn escape(s: &str) -> String {
    s.replace('%', "%25").replace('&', "%26").replace('=', "%3D")
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for FilterSet {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut filters = FilterSet::new();
        for (k, v) in iter {
            filters.set(k, v);
        }
        filters
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_ignores_insertion_order() {
        let a = FilterSet::new().with(STATUS, "published").with(SEARCH, "hull");
        let b = FilterSet::new().with(SEARCH, "hull").with(STATUS, "published");
        assert_eq!(a.key(), b.key());
        assert_eq!(a, b);
    }

    #[test]
    fn test_merge_overrides_and_removes() {
        let mut filters: FilterSet = [(STATUS, "draft"), (PAGE, "2")].into_iter().collect();
        filters.merge(FilterSet::new().with(STATUS, "published").with(PAGE, ""));
        assert_eq!(filters.get(STATUS), Some("published"));
        assert_eq!(filters.get(PAGE), None);
        assert_eq!(filters.len(), 1);
    }

    #[test]
    fn test_key_escapes_separators() {
        let a = FilterSet::new().with("a", "b&c=d");
        let b = FilterSet::new().with("a", "b").with("c", "d");
        assert_ne!(a.key(), b.key());
    }

    #[test]
    fn test_cleared_value_stays_out_of_query() {
        let filters = FilterSet::new().with(SEARCH, "").with(STATUS, "open");
        assert_eq!(filters.get(SEARCH), None);
        assert_eq!(filters.key(), "status=open");
        assert_eq!(filters.to_query(), vec![(STATUS.to_string(), "open".to_string())]);
        assert_eq!(filters, FilterSet::new().with(STATUS, "open"));
        assert_eq!(filters.len(), 1);
    }

    #[test]
    fn test_empty_key() {
        assert_eq!(FilterSet::new().key(), "");
    }
}
