//! Module identity: the `Namespace_Name` identifier and the manifest declaring it.

mod manifest;

use anyhow::{Result, anyhow};
use std::str::FromStr;

pub use manifest::{MANIFEST_DIR, MANIFEST_FILE, ModuleLayout, ModuleManifest, locate};

/// A module identifier in `Namespace_Name` form.
///
/// Both segments become directory names under the code directory, so each
/// must be a single, non-empty path component.
#[derive(Debug, PartialEq, Eq, Clone)]
pub struct ModuleName {
    namespace: String,
    name: String,
}

impl ModuleName {
    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

impl std::fmt::Display for ModuleName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}_{}", self.namespace, self.name)
    }
}

impl FromStr for ModuleName {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parts: Vec<&str> = s.split('_').collect();
        let [namespace, name] = parts.as_slice() else {
            return Err(anyhow!(
                "Invalid module name '{}'. Expected exactly one '_' as in 'Namespace_Name'.",
                s
            ));
        };

        for segment in [namespace, name] {
            if !is_path_component(segment) {
                return Err(anyhow!(
                    "Invalid module name '{}'. Segment '{}' is not a valid directory name.",
                    s,
                    segment
                ));
            }
        }

        Ok(ModuleName {
            namespace: namespace.to_string(),
            name: name.to_string(),
        })
    }
}

fn is_path_component(segment: &str) -> bool {
    !segment.is_empty()
        && segment != "."
        && segment != ".."
        && !segment.contains(['/', '\\', '\0'])
}
