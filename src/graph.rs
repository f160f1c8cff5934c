//! The asset graph: named nodes referencing files or other named assets.

use std::collections::BTreeMap;

use log::debug;

use crate::error::{RegistryError, RegistryResult};
use crate::filters::FilterTable;
use crate::mapping::{CategoryMapping, basename, raw_extension};
use crate::paths::{PathSearchIndex, normalize};

/// A named, declared unit of front-end source.
///
/// Either a leaf (exactly one concrete file path) or a composite (an ordered
/// list of other asset names). Immutable once registered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Asset {
    /// Unique logical identifier. Bundle names are dot-free; dotted names are
    /// reserved for auto-derived leaves keyed by file basename.
    pub name: String,
    /// Ordered references: one file path for a leaf, asset names or file
    /// references for a composite.
    pub references: Vec<String>,
    /// Filters scoped to this asset, layered over the registry-wide table
    /// when bundles are built.
    pub filters: Option<FilterTable>,
}

impl Asset {
    /// Returns `true` when this asset denotes exactly one concrete file.
    pub fn is_single_file(&self) -> bool {
        match self.references.as_slice() {
            [only] => raw_extension(only).is_some(),
            _ => false,
        }
    }

    /// The file path of a single-file asset.
    pub fn path(&self) -> Option<&str> {
        if self.is_single_file() {
            self.references.first().map(String::as_str)
        } else {
            None
        }
    }
}

/// Mapping from logical name to [`Asset`] node.
///
/// Registration is two-phase: file references are resolved and upserted as
/// leaf entries first, then the composite itself is stored. This keeps every
/// name ever referenced independently queryable.
#[derive(Debug, Clone, Default)]
pub struct AssetGraph {
    nodes: BTreeMap<String, Asset>,
}

impl AssetGraph {
    /// Create an empty graph.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a composite asset under `name`.
    ///
    /// References whose basename carries an extension are treated as file
    /// references: they are resolved through `paths` and upserted as leaf
    /// entries keyed by basename. Extension-less references must already be
    /// registered names, so composites can only point backwards in
    /// declaration order.
    pub fn register(
        &mut self,
        name: &str,
        references: Vec<String>,
        filters: Option<FilterTable>,
        paths: &PathSearchIndex,
    ) -> RegistryResult<()> {
        if name.contains('.') {
            return Err(RegistryError::Configuration(format!(
                "asset names may not contain dots ({name})"
            )));
        }

        for reference in &references {
            let leaf_name = basename(reference);
            if raw_extension(reference).is_some() {
                let path = normalize(&paths.resolve(reference)?);
                self.nodes.insert(leaf_name.to_string(), Asset {
                    name: leaf_name.to_string(),
                    references: vec![path.to_string_lossy().into_owned()],
                    filters: filters.clone(),
                });
            } else if !self.nodes.contains_key(reference) {
                return Err(RegistryError::UnknownAsset {
                    name: reference.clone(),
                });
            }
        }

        debug!("registered asset {name} ({} references)", references.len());
        self.nodes.insert(name.to_string(), Asset {
            name: name.to_string(),
            references,
            filters,
        });

        Ok(())
    }

    /// Look up a node by name.
    pub fn get(&self, name: &str) -> Option<&Asset> {
        self.nodes.get(name)
    }

    /// Returns `true` when `name` has been registered.
    pub fn contains(&self, name: &str) -> bool {
        self.nodes.contains_key(name)
    }

    /// All registered names, leaves included, in sorted order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.nodes.keys().map(String::as_str)
    }

    /// The canonical category of a pure asset, or `None` when impure.
    ///
    /// Purity is computed over canonical categories: every direct reference
    /// must carry an extension and all extensions must map to the same
    /// category. A reference without an extension (i.e. a nested composite)
    /// always forces impurity.
    pub fn canonical_category<'a>(
        &self,
        asset: &'a Asset,
        mapping: &'a CategoryMapping,
    ) -> Option<&'a str> {
        let mut category = None;
        for reference in &asset.references {
            let canonical = mapping.canonical(raw_extension(reference)?);
            match category {
                None => category = Some(canonical),
                Some(existing) if existing == canonical => {}
                Some(_) => return None,
            }
        }
        category
    }

    /// Returns `true` when the asset can be emitted as one homogeneous bundle.
    pub fn is_pure(&self, asset: &Asset, mapping: &CategoryMapping) -> bool {
        self.canonical_category(asset, mapping).is_some()
    }
}
