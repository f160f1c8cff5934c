//! Filter tables mapping asset categories to filter specifications.
//!
//! Filters are opaque to the registry: it only stores and layers them, the
//! downstream bundle pipeline interprets them. Three layers combine before a
//! bundle is built: the registry-wide table, the owning asset's table, and an
//! optional call-site override, with later layers winning per category.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Opaque filter specification understood by the downstream bundle pipeline.
///
/// Typically the name of a filter (`"jsmin"`, `"cssrewrite"`).
pub type FilterSpec = String;

/// Mapping from a file-extension-like category to a filter specification.
///
/// A category stored with `None` is an explicit suppression: merging it over
/// an earlier layer removes that layer's filter rather than keeping it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(transparent)]
pub struct FilterTable {
    entries: BTreeMap<String, Option<FilterSpec>>,
}

impl FilterTable {
    /// Create an empty filter table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Assign the filter for a category. Last write wins per category.
    pub fn set(&mut self, category: impl Into<String>, spec: Option<FilterSpec>) {
        self.entries.insert(category.into(), spec);
    }

    /// Look up the filter stored for a category.
    ///
    /// The outer `Option` distinguishes "category absent" from "category
    /// explicitly suppressed" (`Some(None)`).
    pub fn get(&self, category: &str) -> Option<Option<&FilterSpec>> {
        self.entries.get(category).map(Option::as_ref)
    }

    /// The effective filter for a category, collapsing absence and explicit
    /// suppression into `None`.
    pub fn effective(&self, category: &str) -> Option<&FilterSpec> {
        self.entries.get(category).and_then(Option::as_ref)
    }

    /// Returns `true` when no categories are stored.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Merge layers left to right, later layers overwriting earlier keys.
    ///
    /// Absent layers (`None`) are skipped entirely, while a present layer's
    /// suppressed categories still overwrite earlier assignments.
    pub fn merged<'a>(layers: impl IntoIterator<Item = Option<&'a FilterTable>>) -> FilterTable {
        let mut result = FilterTable::new();
        for layer in layers.into_iter().flatten() {
            for (category, spec) in &layer.entries {
                result.entries.insert(category.clone(), spec.clone());
            }
        }
        result
    }
}

impl<const N: usize> From<[(&str, Option<&str>); N]> for FilterTable {
    fn from(entries: [(&str, Option<&str>); N]) -> Self {
        let mut table = FilterTable::new();
        for (category, spec) in entries {
            table.set(category, spec.map(str::to_string));
        }
        table
    }
}

#[cfg(test)]
mod tests {
    use super::FilterTable;

    #[test]
    fn last_write_wins_per_category() {
        let mut table = FilterTable::new();
        table.set("js", Some("jsmin".into()));
        table.set("js", Some("rjsmin".into()));

        assert_eq!(table.effective("js").map(String::as_str), Some("rjsmin"));
    }

    #[test]
    fn merge_prefers_later_layers() {
        let global = FilterTable::from([("js", Some("jsmin")), ("css", Some("cssmin"))]);
        let asset = FilterTable::from([("js", Some("rjsmin"))]);

        let merged = FilterTable::merged([Some(&global), Some(&asset)]);

        assert_eq!(merged.effective("js").map(String::as_str), Some("rjsmin"));
        assert_eq!(merged.effective("css").map(String::as_str), Some("cssmin"));
    }

    #[test]
    fn explicit_suppression_wins_over_earlier_layers() {
        let global = FilterTable::from([("js", Some("jsmin"))]);
        let asset = FilterTable::new();
        let call_site = FilterTable::from([("js", None)]);

        let merged = FilterTable::merged([Some(&global), Some(&asset), Some(&call_site)]);

        assert_eq!(merged.effective("js"), None);
        assert_eq!(merged.get("js"), Some(None));
    }

    #[test]
    fn absent_layers_are_skipped() {
        let global = FilterTable::from([("js", Some("jsmin"))]);

        let merged = FilterTable::merged([Some(&global), None, None]);

        assert_eq!(merged.effective("js").map(String::as_str), Some("jsmin"));
    }

    #[test]
    fn deserialises_from_json_with_null_suppression() {
        let table: FilterTable =
            serde_json::from_str(r#"{"js": "jsmin", "css": null}"#).expect("valid filter table");

        assert_eq!(table.effective("js").map(String::as_str), Some("jsmin"));
        assert_eq!(table.get("css"), Some(None));
        assert_eq!(table.get("scss"), None);
    }
}
