#![doc = include_str!("../README.md")]
#![warn(missing_docs)]

pub mod bundle;
pub mod directives;
pub mod environment;
pub mod error;
pub mod filters;
pub mod graph;
pub mod mapping;
pub mod paths;
pub mod registry;

pub use bundle::{Bundle, BundleInput};
pub use directives::{AssetDeclaration, Directive, RegistryConfig};
pub use environment::{Environment, RegisteredBundle};
pub use error::{RegistryError, RegistryResult};
pub use filters::{FilterSpec, FilterTable};
pub use graph::{Asset, AssetGraph};
pub use mapping::{CategoryMapping, OutputCategory};
pub use paths::PathSearchIndex;
pub use registry::WebassetRegistry;
