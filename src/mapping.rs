//! Translation from raw file extensions to canonical output categories.

use std::collections::BTreeMap;

/// The canonical output kind of a bundle.
///
/// The bundle pipeline only knows how to emit scripts and stylesheets; any
/// other canonical category is rejected when a bundle is built.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum OutputCategory {
    /// JavaScript output (`.js`).
    Script,
    /// Stylesheet output (`.css`).
    Style,
}

impl OutputCategory {
    /// The canonical extension used in output filenames.
    pub fn as_str(self) -> &'static str {
        match self {
            OutputCategory::Script => "js",
            OutputCategory::Style => "css",
        }
    }

    /// Parse a canonical category string produced by [`CategoryMapping`].
    pub fn from_canonical(value: &str) -> Option<Self> {
        match value {
            "js" => Some(OutputCategory::Script),
            "css" => Some(OutputCategory::Style),
            _ => None,
        }
    }
}

/// Mapping from raw file extension to canonical category.
///
/// Ships with defaults for the common compiled-to-web languages and can be
/// extended or overridden one extension at a time via declarations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryMapping {
    entries: BTreeMap<String, String>,
}

impl Default for CategoryMapping {
    fn default() -> Self {
        let mut entries = BTreeMap::new();
        for (extension, category) in [
            ("js", "js"),
            ("jsx", "js"),
            ("ts", "js"),
            ("coffee", "js"),
            ("css", "css"),
            ("scss", "css"),
            ("sass", "css"),
            ("less", "css"),
        ] {
            entries.insert(extension.to_string(), category.to_string());
        }
        Self { entries }
    }
}

impl CategoryMapping {
    /// Assign the canonical category for a raw extension. Last write wins.
    pub fn set(&mut self, extension: impl Into<String>, category: impl Into<String>) {
        self.entries.insert(extension.into(), category.into());
    }

    /// Translate a raw extension to its canonical category.
    ///
    /// Unmapped extensions pass through unchanged, so e.g. `png` resolves to
    /// the (invalid) canonical category `png` and is rejected downstream.
    pub fn canonical<'a>(&'a self, extension: &'a str) -> &'a str {
        self.entries
            .get(extension)
            .map(String::as_str)
            .unwrap_or(extension)
    }
}

/// The raw extension of a file reference, taken from its final path segment.
///
/// Returns `None` when the basename carries no extension separator, which in
/// registry terms means the reference names another asset rather than a file.
pub(crate) fn raw_extension(reference: &str) -> Option<&str> {
    let basename = basename(reference);
    match basename.rsplit_once('.') {
        Some((stem, extension)) if !stem.is_empty() => Some(extension),
        _ => None,
    }
}

/// The final path segment of a reference, tolerating both separator styles.
pub(crate) fn basename(reference: &str) -> &str {
    reference
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or(reference)
}
