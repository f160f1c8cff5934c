//! Bundle descriptors and the recursive derivation of bundles from assets.

use std::path::PathBuf;

use crate::error::{RegistryError, RegistryResult};
use crate::filters::{FilterSpec, FilterTable};
use crate::graph::AssetGraph;
use crate::mapping::{CategoryMapping, OutputCategory, basename, raw_extension};

/// A concrete build unit handed to the output mechanism.
///
/// Leaf bundles carry file inputs; bundles synthesized by environment
/// assembly wrap other bundles instead.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Bundle {
    /// Ordered inputs, in declaration order.
    pub inputs: Vec<BundleInput>,
    /// The filter to apply, if any survived layering and suppression.
    pub filter: Option<FilterSpec>,
    /// Output filename, always `{name}.bundle.{category}`.
    pub output: String,
}

/// One input of a [`Bundle`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BundleInput {
    /// A resolved source file on disk.
    File(PathBuf),
    /// A nested bundle, used by synthesized wrapper bundles.
    Bundle(Bundle),
}

impl Bundle {
    /// The output category, parsed back from the output filename.
    pub fn category(&self) -> Option<OutputCategory> {
        let extension = self.output.rsplit_once('.')?.1;
        OutputCategory::from_canonical(extension)
    }

    /// The file inputs of this bundle, skipping nested bundles.
    pub fn files(&self) -> impl Iterator<Item = &PathBuf> {
        self.inputs.iter().filter_map(|input| match input {
            BundleInput::File(path) => Some(path),
            BundleInput::Bundle(_) => None,
        })
    }
}

/// Derives bundles from the asset graph.
///
/// Pure assets produce exactly one bundle; impure assets flatten depth-first
/// into one bundle per pure sub-tree, preserving declaration order.
pub(crate) struct BundleBuilder<'a> {
    graph: &'a AssetGraph,
    mapping: &'a CategoryMapping,
    global_filters: &'a FilterTable,
}

impl<'a> BundleBuilder<'a> {
    pub(crate) fn new(
        graph: &'a AssetGraph,
        mapping: &'a CategoryMapping,
        global_filters: &'a FilterTable,
    ) -> Self {
        Self {
            graph,
            mapping,
            global_filters,
        }
    }

    /// Derive the bundle sequence for a registered name.
    ///
    /// `call_filters` is the call-site override layer; during recursion it
    /// carries the parent's merged table so outer declarations win over
    /// nested asset tables.
    pub(crate) fn build(
        &self,
        name: &str,
        call_filters: Option<&FilterTable>,
    ) -> RegistryResult<Vec<Bundle>> {
        let asset = self.graph.get(name).ok_or_else(|| RegistryError::UnknownAsset {
            name: name.to_string(),
        })?;

        let effective = FilterTable::merged([
            Some(self.global_filters),
            asset.filters.as_ref(),
            call_filters,
        ]);

        let Some(canonical) = self.graph.canonical_category(asset, self.mapping) else {
            // Impure: flatten each direct reference in turn, pushing the
            // merged filter table down. File references recurse through the
            // leaf entry keyed by their basename.
            let mut bundles = Vec::new();
            for reference in &asset.references {
                let key = if raw_extension(reference).is_some() {
                    basename(reference)
                } else {
                    reference.as_str()
                };
                bundles.extend(self.build(key, Some(&effective))?);
            }
            return Ok(bundles);
        };

        let category = OutputCategory::from_canonical(canonical).ok_or_else(|| {
            RegistryError::InvalidCategory {
                name: name.to_string(),
                category: canonical.to_string(),
            }
        })?;

        // Purity guarantees every reference carries an extension, so each
        // one has a single-file leaf entry under its basename holding the
        // resolved path. A leaf asset resolves through itself here.
        let mut inputs = Vec::with_capacity(asset.references.len());
        for reference in &asset.references {
            let leaf = self.graph.get(basename(reference)).ok_or_else(|| {
                RegistryError::UnknownAsset {
                    name: reference.clone(),
                }
            })?;
            let path = leaf.path().ok_or_else(|| RegistryError::UnknownAsset {
                name: reference.clone(),
            })?;
            inputs.push(BundleInput::File(PathBuf::from(path)));
        }

        // The filter is keyed by the raw extension of the first input, never
        // by the canonical category.
        let filter = asset
            .references
            .first()
            .and_then(|reference| raw_extension(reference))
            .and_then(|extension| effective.effective(extension))
            .cloned();

        Ok(vec![Bundle {
            inputs,
            filter,
            output: format!("{name}.bundle.{}", category.as_str()),
        }])
    }
}

#[cfg(test)]
mod tests {
    use std::fs;
    use std::path::PathBuf;

    use tempfile::tempdir;

    use super::{Bundle, BundleBuilder, BundleInput};
    use crate::error::RegistryError;
    use crate::filters::FilterTable;
    use crate::graph::AssetGraph;
    use crate::mapping::{CategoryMapping, OutputCategory};
    use crate::paths::PathSearchIndex;

    struct Fixture {
        _temp: tempfile::TempDir,
        root: PathBuf,
        paths: PathSearchIndex,
        graph: AssetGraph,
        mapping: CategoryMapping,
    }

    fn fixture(files: &[&str]) -> Fixture {
        let temp = tempdir().expect("failed to create temp dir");
        let root = temp.path().to_path_buf();
        for file in files {
            fs::write(root.join(file), b"fixture").unwrap();
        }
        let mut paths = PathSearchIndex::new();
        paths.register(&root).unwrap();
        Fixture {
            _temp: temp,
            root,
            paths,
            graph: AssetGraph::new(),
            mapping: CategoryMapping::default(),
        }
    }

    fn input_files(bundle: &Bundle) -> Vec<PathBuf> {
        bundle.files().cloned().collect()
    }

    #[test]
    fn pure_composite_yields_one_bundle_in_declaration_order() {
        let mut fx = fixture(&["jquery.js", "underscore.js"]);
        fx.graph
            .register(
                "common",
                vec!["jquery.js".into(), "underscore.js".into()],
                None,
                &fx.paths,
            )
            .unwrap();

        let global = FilterTable::new();
        let builder = BundleBuilder::new(&fx.graph, &fx.mapping, &global);
        let bundles = builder.build("common", None).unwrap();

        assert_eq!(bundles.len(), 1);
        assert_eq!(bundles[0].output, "common.bundle.js");
        assert_eq!(bundles[0].category(), Some(OutputCategory::Script));
        assert_eq!(input_files(&bundles[0]), vec![
            fx.root.join("jquery.js"),
            fx.root.join("underscore.js"),
        ]);
    }

    #[test]
    fn impure_composite_flattens_to_one_bundle_per_leaf() {
        let mut fx = fixture(&["jquery.js", "extra.css"]);
        fx.graph
            .register(
                "common2",
                vec!["jquery.js".into(), "extra.css".into()],
                None,
                &fx.paths,
            )
            .unwrap();

        let global = FilterTable::new();
        let builder = BundleBuilder::new(&fx.graph, &fx.mapping, &global);
        let bundles = builder.build("common2", None).unwrap();

        assert_eq!(bundles.len(), 2);
        assert_eq!(bundles[0].output, "jquery.js.bundle.js");
        assert_eq!(input_files(&bundles[0]), vec![fx.root.join("jquery.js")]);
        assert_eq!(bundles[1].output, "extra.css.bundle.css");
        assert_eq!(input_files(&bundles[1]), vec![fx.root.join("extra.css")]);
    }

    #[test]
    fn flattening_is_depth_first_and_order_preserving() {
        let mut fx = fixture(&["a.js", "b.css", "c.js", "d.js"]);
        fx.graph
            .register("mixed", vec!["a.js".into(), "b.css".into()], None, &fx.paths)
            .unwrap();
        fx.graph
            .register("pure", vec!["c.js".into(), "d.js".into()], None, &fx.paths)
            .unwrap();
        fx.graph
            .register("page", vec!["mixed".into(), "pure".into()], None, &fx.paths)
            .unwrap();

        let global = FilterTable::new();
        let builder = BundleBuilder::new(&fx.graph, &fx.mapping, &global);
        let bundles = builder.build("page", None).unwrap();

        let outputs: Vec<&str> = bundles.iter().map(|b| b.output.as_str()).collect();
        assert_eq!(outputs, [
            "a.js.bundle.js",
            "b.css.bundle.css",
            "pure.bundle.js",
        ]);
    }

    #[test]
    fn mixed_raw_extensions_stay_pure_within_one_category() {
        let mut fx = fixture(&["app.coffee", "vendor.js"]);
        fx.graph
            .register(
                "scripts",
                vec!["app.coffee".into(), "vendor.js".into()],
                None,
                &fx.paths,
            )
            .unwrap();

        let global = FilterTable::new();
        let builder = BundleBuilder::new(&fx.graph, &fx.mapping, &global);
        let bundles = builder.build("scripts", None).unwrap();

        assert_eq!(bundles.len(), 1);
        assert_eq!(bundles[0].output, "scripts.bundle.js");
    }

    #[test]
    fn filters_are_keyed_by_raw_extension_of_first_input() {
        let mut fx = fixture(&["app.coffee", "vendor.js"]);
        fx.graph
            .register(
                "scripts",
                vec!["app.coffee".into(), "vendor.js".into()],
                None,
                &fx.paths,
            )
            .unwrap();

        let global = FilterTable::from([("coffee", Some("coffeescript")), ("js", Some("jsmin"))]);
        let builder = BundleBuilder::new(&fx.graph, &fx.mapping, &global);
        let bundles = builder.build("scripts", None).unwrap();

        assert_eq!(bundles[0].filter.as_deref(), Some("coffeescript"));
    }

    #[test]
    fn composite_filters_reach_flattened_leaf_bundles() {
        let mut fx = fixture(&["app.js", "theme.css"]);
        fx.graph
            .register(
                "page",
                vec!["app.js".into(), "theme.css".into()],
                Some(FilterTable::from([
                    ("js", Some("terser")),
                    ("css", Some("cssmin")),
                ])),
                &fx.paths,
            )
            .unwrap();

        let global = FilterTable::new();
        let builder = BundleBuilder::new(&fx.graph, &fx.mapping, &global);
        let bundles = builder.build("page", None).unwrap();

        assert_eq!(bundles.len(), 2);
        assert_eq!(bundles[0].output, "app.js.bundle.js");
        assert_eq!(bundles[0].filter.as_deref(), Some("terser"));
        assert_eq!(bundles[1].output, "theme.css.bundle.css");
        assert_eq!(bundles[1].filter.as_deref(), Some("cssmin"));
    }

    #[test]
    fn call_site_filters_override_asset_filters() {
        let mut fx = fixture(&["app.js"]);
        fx.graph
            .register(
                "scripts",
                vec!["app.js".into()],
                Some(FilterTable::from([("js", Some("jsmin"))])),
                &fx.paths,
            )
            .unwrap();

        let global = FilterTable::new();
        let builder = BundleBuilder::new(&fx.graph, &fx.mapping, &global);

        let defaulted = builder.build("scripts", None).unwrap();
        assert_eq!(defaulted[0].filter.as_deref(), Some("jsmin"));

        let suppressed = builder
            .build("scripts", Some(&FilterTable::from([("js", None)])))
            .unwrap();
        assert_eq!(suppressed[0].filter, None);
    }

    #[test]
    fn unmapped_categories_are_rejected() {
        let mut fx = fixture(&["logo.png"]);
        fx.graph
            .register("art", vec!["logo.png".into()], None, &fx.paths)
            .unwrap();

        let global = FilterTable::new();
        let builder = BundleBuilder::new(&fx.graph, &fx.mapping, &global);

        let err = builder.build("art", None).unwrap_err();
        assert!(matches!(
            err,
            RegistryError::InvalidCategory { name, category }
                if name == "art" && category == "png"
        ));
    }

    #[test]
    fn unknown_names_are_rejected() {
        let fx = fixture(&[]);
        let global = FilterTable::new();
        let builder = BundleBuilder::new(&fx.graph, &fx.mapping, &global);

        let err = builder.build("ghost", None).unwrap_err();
        assert!(matches!(err, RegistryError::UnknownAsset { name } if name == "ghost"));
    }

    #[test]
    fn nested_bundles_are_not_reported_as_files() {
        let inner = Bundle {
            inputs: vec![BundleInput::File(PathBuf::from("/srv/a.js"))],
            filter: None,
            output: "inner.bundle.js".into(),
        };
        let wrapper = Bundle {
            inputs: vec![BundleInput::Bundle(inner)],
            filter: None,
            output: "outer.bundle.js".into(),
        };

        assert_eq!(wrapper.files().count(), 0);
    }
}
