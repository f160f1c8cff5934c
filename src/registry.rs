//! The registry façade tying search paths, filters, mapping and assets
//! together.

use std::path::{Path, PathBuf};

use log::debug;

use crate::bundle::{Bundle, BundleBuilder};
use crate::environment::{self, Environment};
use crate::error::{RegistryError, RegistryResult};
use crate::filters::{FilterSpec, FilterTable};
use crate::graph::{Asset, AssetGraph};
use crate::mapping::CategoryMapping;
use crate::paths::PathSearchIndex;

/// Default base URL bundles are served under.
pub const DEFAULT_URL: &str = "assets";

/// Configuration-time registry resolving named asset declarations into
/// bundles.
///
/// One registry belongs to one application configuration. It is mutated
/// exclusively during a single commit pass, one call per resolved
/// declaration, and is read-only afterwards: [`WebassetRegistry::get_bundles`]
/// and [`WebassetRegistry::get_environment`] are pure over the committed
/// state and safe for concurrent readers.
#[derive(Debug, Clone)]
pub struct WebassetRegistry {
    paths: PathSearchIndex,
    filters: FilterTable,
    mapping: CategoryMapping,
    assets: AssetGraph,
    output_path: Option<PathBuf>,
    url: String,
}

impl Default for WebassetRegistry {
    fn default() -> Self {
        Self {
            paths: PathSearchIndex::new(),
            filters: FilterTable::new(),
            mapping: CategoryMapping::default(),
            assets: AssetGraph::new(),
            output_path: None,
            url: DEFAULT_URL.to_string(),
        }
    }
}

impl WebassetRegistry {
    /// Create an empty registry with the default category mapping and URL.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an absolute directory root at the front of the search order.
    pub fn register_path(&mut self, path: impl AsRef<Path>) -> RegistryResult<()> {
        debug!("registering search path {}", path.as_ref().display());
        self.paths.register(path)
    }

    /// Assign the filter for a category. Later declarations replace earlier
    /// ones for the same category.
    pub fn register_filter(&mut self, category: impl Into<String>, spec: Option<FilterSpec>) {
        self.filters.set(category, spec);
    }

    /// Map a raw file extension to a canonical category.
    pub fn register_mapping(
        &mut self,
        extension: impl Into<String>,
        category: impl Into<String>,
    ) {
        self.mapping.set(extension, category);
    }

    /// Set the directory bundles are written into. Required before queries.
    pub fn set_output_path(&mut self, path: impl Into<PathBuf>) {
        self.output_path = Some(path.into());
    }

    /// Set the base URL bundles are served under.
    pub fn set_url(&mut self, url: impl Into<String>) {
        self.url = url.into();
    }

    /// Register a named asset referencing files or previously declared
    /// assets. File references are resolved immediately and upserted as leaf
    /// entries keyed by basename.
    pub fn register_asset(
        &mut self,
        name: &str,
        references: &[String],
        filters: Option<FilterTable>,
    ) -> RegistryResult<()> {
        self.assets
            .register(name, references.to_vec(), filters, &self.paths)
    }

    /// Resolve a file reference against the registered search paths.
    pub fn find_file(&self, reference: &str) -> RegistryResult<PathBuf> {
        self.paths.resolve(reference)
    }

    /// The search path index.
    pub fn paths(&self) -> &PathSearchIndex {
        &self.paths
    }

    /// The registry-wide filter table.
    pub fn filters(&self) -> &FilterTable {
        &self.filters
    }

    /// The extension-to-category mapping.
    pub fn mapping(&self) -> &CategoryMapping {
        &self.mapping
    }

    /// Look up a registered asset node by name.
    pub fn asset(&self, name: &str) -> Option<&Asset> {
        self.assets.get(name)
    }

    /// All registered asset names, auto-derived leaves included.
    pub fn asset_names(&self) -> impl Iterator<Item = &str> {
        self.assets.names()
    }

    /// The base URL bundles are served under.
    pub fn url(&self) -> &str {
        &self.url
    }

    /// The configured output directory, or a configuration error when unset.
    pub fn output_path(&self) -> RegistryResult<&Path> {
        self.output_path
            .as_deref()
            .ok_or_else(|| RegistryError::Configuration("no output path configured".to_string()))
    }

    /// Derive the bundle sequence for a registered name.
    ///
    /// Pure assets yield exactly one bundle; impure assets flatten
    /// depth-first into one bundle per pure sub-tree, preserving declaration
    /// order. `filters` is the call-site override layer, winning over both
    /// the registry-wide and the asset-scoped tables.
    pub fn get_bundles(
        &self,
        name: &str,
        filters: Option<&FilterTable>,
    ) -> RegistryResult<Vec<Bundle>> {
        self.output_path()?;
        BundleBuilder::new(&self.assets, &self.mapping, &self.filters).build(name, filters)
    }

    /// Assemble the environment covering every registered name.
    pub fn get_environment(&self) -> RegistryResult<Environment> {
        environment::assemble(self)
    }
}
