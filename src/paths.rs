//! Ordered search paths used to resolve relative file references.

use std::collections::BTreeSet;
use std::path::{Component, Path, PathBuf};

use log::trace;

use crate::error::{RegistryError, RegistryResult};

/// Ordered list of absolute directory roots, most recently registered first.
///
/// Resolution scans front to back and returns the first root containing the
/// requested file, so later declarations shadow earlier ones without removing
/// them. Duplicate roots are kept in the list and skipped per search rather
/// than deduplicated at registration.
#[derive(Debug, Clone, Default)]
pub struct PathSearchIndex {
    roots: Vec<PathBuf>,
}

impl PathSearchIndex {
    /// Create an empty index.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a directory root at the front of the search order.
    ///
    /// Only absolute paths are accepted: relative roots would silently depend
    /// on the process working directory at query time.
    pub fn register(&mut self, path: impl AsRef<Path>) -> RegistryResult<()> {
        let path = path.as_ref();
        if !path.is_absolute() {
            return Err(RegistryError::Configuration(format!(
                "search paths must be absolute, got {}",
                path.display()
            )));
        }

        self.roots.insert(0, normalize(path));
        Ok(())
    }

    /// Resolve a file reference against the registered roots.
    ///
    /// Absolute references are returned unchanged. Relative references return
    /// the first `root/reference` that exists as a regular file, scanning the
    /// most recently registered root first.
    pub fn resolve(&self, reference: &str) -> RegistryResult<PathBuf> {
        let reference_path = Path::new(reference);
        if reference_path.is_absolute() {
            return Ok(reference_path.to_path_buf());
        }

        let mut searched = BTreeSet::new();
        for root in &self.roots {
            if !searched.insert(root) {
                continue;
            }

            let candidate = root.join(reference_path);
            trace!("probing {} for {}", root.display(), reference);
            if candidate.is_file() {
                return Ok(candidate);
            }
        }

        Err(RegistryError::NotFound {
            reference: reference.to_string(),
        })
    }

    /// The registered roots in search order.
    pub fn roots(&self) -> &[PathBuf] {
        &self.roots
    }
}

/// Lexically normalize a path, collapsing `.` segments and resolving `..`
/// against preceding components where possible. No filesystem access.
pub(crate) fn normalize(path: &Path) -> PathBuf {
    let mut result = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                let can_pop = matches!(
                    result.components().next_back(),
                    Some(Component::Normal(_))
                );
                if !(can_pop && result.pop()) {
                    result.push(Component::ParentDir);
                }
            }
            other => result.push(other),
        }
    }
    result
}
