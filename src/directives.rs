//! The boundary to the host configuration framework.
//!
//! The host framework discovers declarations, orders them along the
//! inheritance chain and deduplicates overrides by identity; this module only
//! consumes the result: a flat, ordered sequence of [`Directive`]s applied to
//! a registry one by one. Declaration files loaded from disk are assumed to
//! be in that same override-resolved order.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::error::{RegistryError, RegistryResult};
use crate::filters::{FilterSpec, FilterTable};
use crate::registry::WebassetRegistry;

/// One resolved declaration, ready to be applied to a registry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Directive {
    /// Register an absolute search path.
    Path(PathBuf),
    /// Assign the filter for a category, `None` suppressing it.
    Filter {
        /// Category the filter applies to.
        category: String,
        /// Filter specification, or `None` to suppress.
        spec: Option<FilterSpec>,
    },
    /// Map a raw file extension to a canonical category.
    Mapping {
        /// Raw file extension.
        extension: String,
        /// Canonical category it translates to.
        category: String,
    },
    /// Set the bundle output directory.
    Output(PathBuf),
    /// Set the base URL bundles are served under.
    Url(String),
    /// Register a named asset.
    Asset {
        /// Logical asset name, dot-free.
        name: String,
        /// Ordered file references and asset names.
        references: Vec<String>,
        /// Filters scoped to this asset.
        filters: Option<FilterTable>,
    },
}

/// Apply an ordered sequence of directives to a registry.
///
/// Directives execute strictly in the order given; the first failure aborts
/// the commit and leaves the registry unusable.
pub fn apply(
    registry: &mut WebassetRegistry,
    directives: impl IntoIterator<Item = Directive>,
) -> RegistryResult<()> {
    for directive in directives {
        match directive {
            Directive::Path(path) => registry.register_path(path)?,
            Directive::Filter { category, spec } => registry.register_filter(category, spec),
            Directive::Mapping {
                extension,
                category,
            } => registry.register_mapping(extension, category),
            Directive::Output(path) => registry.set_output_path(path),
            Directive::Url(url) => registry.set_url(url),
            Directive::Asset {
                name,
                references,
                filters,
            } => registry.register_asset(&name, &references, filters)?,
        }
    }
    Ok(())
}

/// One asset declaration inside a [`RegistryConfig`] file.
#[derive(Debug, Clone, Deserialize)]
pub struct AssetDeclaration {
    /// Logical asset name, dot-free.
    pub name: String,
    /// Ordered file references and asset names.
    pub references: Vec<String>,
    /// Filters scoped to this asset.
    #[serde(default)]
    pub filters: Option<FilterTable>,
}

/// A declaration file describing a registry, in override-resolved order.
///
/// Paths and assets are ordered lists because their order is significant;
/// filters and mappings are keyed maps because the host framework's override
/// rules make later declarations replace earlier ones per key anyway.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RegistryConfig {
    /// Search paths, base-most first.
    pub paths: Vec<PathBuf>,
    /// Category filters.
    pub filters: BTreeMap<String, Option<FilterSpec>>,
    /// Extension-to-category mappings.
    pub mapping: BTreeMap<String, String>,
    /// Bundle output directory.
    pub output: Option<PathBuf>,
    /// Base URL bundles are served under.
    pub url: Option<String>,
    /// Asset declarations, in declaration order.
    pub assets: Vec<AssetDeclaration>,
}

impl RegistryConfig {
    /// Read a declaration file from a JSON document on disk.
    pub fn load_from_path(path: impl AsRef<Path>) -> RegistryResult<Self> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path).map_err(|source| RegistryError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        serde_json::from_str(&contents).map_err(|source| RegistryError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Lower the declaration file into an ordered directive sequence.
    pub fn into_directives(self) -> Vec<Directive> {
        let mut directives = Vec::new();

        for path in self.paths {
            directives.push(Directive::Path(path));
        }
        for (category, spec) in self.filters {
            directives.push(Directive::Filter { category, spec });
        }
        for (extension, category) in self.mapping {
            directives.push(Directive::Mapping {
                extension,
                category,
            });
        }
        if let Some(path) = self.output {
            directives.push(Directive::Output(path));
        }
        if let Some(url) = self.url {
            directives.push(Directive::Url(url));
        }
        for asset in self.assets {
            directives.push(Directive::Asset {
                name: asset.name,
                references: asset.references,
                filters: asset.filters,
            });
        }

        directives
    }
}

impl WebassetRegistry {
    /// Build a registry by committing an ordered directive sequence.
    pub fn from_directives(
        directives: impl IntoIterator<Item = Directive>,
    ) -> RegistryResult<Self> {
        let mut registry = WebassetRegistry::new();
        apply(&mut registry, directives)?;
        Ok(registry)
    }

    /// Build a registry from a declaration file.
    pub fn from_config(config: RegistryConfig) -> RegistryResult<Self> {
        Self::from_directives(config.into_directives())
    }
}
