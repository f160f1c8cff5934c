//! Assembly of the top-level environment handed to the output mechanism.

use std::collections::BTreeMap;
use std::path::PathBuf;

use crate::bundle::{Bundle, BundleInput};
use crate::error::RegistryResult;
use crate::mapping::OutputCategory;
use crate::registry::WebassetRegistry;

/// A bundle registered in an [`Environment`], optionally chained to a
/// companion bundle of the other category.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegisteredBundle {
    /// The bundle itself.
    pub bundle: Bundle,
    /// Name of the successor entry, set on a script bundle whose asset also
    /// produced styles.
    pub next: Option<String>,
}

/// Everything the output mechanism needs to emit the configured assets.
#[derive(Debug, Clone)]
pub struct Environment {
    /// Directory the output mechanism writes bundles into.
    pub output_path: PathBuf,
    /// Search roots the bundles were resolved against, in search order.
    pub search_paths: Vec<PathBuf>,
    /// Base URL bundles are served under.
    pub url: String,
    /// Registered name to bundle, in sorted name order.
    pub bundles: BTreeMap<String, RegisteredBundle>,
}

impl Environment {
    /// Look up a registered bundle by name.
    pub fn get(&self, name: &str) -> Option<&RegisteredBundle> {
        self.bundles.get(name)
    }
}

/// Build the environment for every top-level name in the registry.
///
/// Each name's bundles are partitioned into scripts and styles. A partition
/// with several bundles is wrapped in one synthesized parent bundle so that a
/// name always registers at most one bundle per category. When both
/// categories are present the script registers under the asset name, the
/// style under `{name}_1`, and the script entry points at the style entry.
pub(crate) fn assemble(registry: &WebassetRegistry) -> RegistryResult<Environment> {
    let mut bundles = BTreeMap::new();

    for name in registry.asset_names() {
        let derived = registry.get_bundles(name, None)?;

        let mut scripts = Vec::new();
        let mut styles = Vec::new();
        for bundle in derived {
            match bundle.category() {
                Some(OutputCategory::Style) => styles.push(bundle),
                // get_bundles only ever emits the two known categories.
                _ => scripts.push(bundle),
            }
        }

        let script = collapse(name, OutputCategory::Script, scripts);
        let style = collapse(name, OutputCategory::Style, styles);

        match (script, style) {
            (Some(script), Some(style)) => {
                let style_name = format!("{name}_1");
                bundles.insert(name.to_string(), RegisteredBundle {
                    bundle: script,
                    next: Some(style_name.clone()),
                });
                bundles.insert(style_name, RegisteredBundle {
                    bundle: style,
                    next: None,
                });
            }
            (Some(bundle), None) | (None, Some(bundle)) => {
                bundles.insert(name.to_string(), RegisteredBundle { bundle, next: None });
            }
            (None, None) => {}
        }
    }

    Ok(Environment {
        output_path: registry.output_path()?.to_path_buf(),
        search_paths: registry.paths().roots().to_vec(),
        url: registry.url().to_string(),
        bundles,
    })
}

/// Reduce one category's bundles to at most one bundle.
fn collapse(name: &str, category: OutputCategory, mut bundles: Vec<Bundle>) -> Option<Bundle> {
    match bundles.len() {
        0 => None,
        1 => bundles.pop(),
        _ => Some(Bundle {
            inputs: bundles.into_iter().map(BundleInput::Bundle).collect(),
            filter: None,
            output: format!("{name}.bundle.{}", category.as_str()),
        }),
    }
}
