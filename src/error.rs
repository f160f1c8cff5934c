//! Error types shared across the registry.

use std::path::PathBuf;

use thiserror::Error;

/// Generic result type used across the crate.
pub type RegistryResult<T> = Result<T, RegistryError>;

/// Errors produced while building or querying a [`crate::WebassetRegistry`].
///
/// Every variant is fatal to the operation that raised it: misconfiguration is
/// meant to surface during application startup, not at request time, so there
/// is deliberately no retry or partial-success mode.
#[derive(Debug, Error)]
pub enum RegistryError {
    /// The registry was configured in an unusable way, for example a relative
    /// search path, a dotted bundle name, or a query before an output path
    /// was set.
    #[error("invalid configuration: {0}")]
    Configuration(String),

    /// A file reference could not be resolved in any registered search path.
    #[error("could not find {reference} in any registered search path")]
    NotFound {
        /// The file reference that failed to resolve.
        reference: String,
    },

    /// A name was used that has never been registered, either as a composite
    /// sub-reference or as a query argument.
    #[error("unknown asset {name}")]
    UnknownAsset {
        /// The unregistered asset name.
        name: String,
    },

    /// A pure asset mapped to a category the bundle pipeline cannot emit.
    #[error("asset {name} resolved to unsupported category {category}")]
    InvalidCategory {
        /// Name of the offending asset.
        name: String,
        /// The canonical category it resolved to.
        category: String,
    },

    /// Failed to read a declaration file from disk.
    #[error("failed to read {}: {source}", path.display())]
    Io {
        /// Path that caused the error.
        path: PathBuf,
        /// Source I/O error.
        #[source]
        source: std::io::Error,
    },

    /// Failed to parse a JSON declaration file.
    #[error("failed to parse {}: {source}", path.display())]
    Parse {
        /// Path that caused the error.
        path: PathBuf,
        /// Source parse error.
        #[source]
        source: serde_json::Error,
    },
}
