//! Installation root: the application tree modules are installed into.

use log::{debug, info};
use std::fmt;
use std::path::{Path, PathBuf};

use crate::module::ModuleName;
use crate::runtime::Runtime;

/// Marker file that identifies an application installation, relative to its root.
pub const MARKER_FILE: [&str; 3] = ["app", "etc", "env.php"];

/// Code directory modules are installed under, relative to the root.
pub const CODE_DIR: [&str; 2] = ["app", "code"];

/// Raised when the candidate root does not contain the marker file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvalidBasePath {
    pub path: PathBuf,
}

impl fmt::Display for InvalidBasePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "The base path is invalid.")
    }
}

impl std::error::Error for InvalidBasePath {}

/// A directory verified to hold an application installation.
///
/// Construction is the only validation point; an `InstallationRoot` never
/// changes afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstallationRoot {
    path: PathBuf,
}

impl InstallationRoot {
    #[tracing::instrument(skip(runtime))]
    pub fn new<R: Runtime>(runtime: &R, path: &Path) -> Result<Self, InvalidBasePath> {
        let marker = Self::marker_path(path);
        debug!("Checking for installation marker at {:?}", marker);

        if !runtime.exists(&marker) {
            return Err(InvalidBasePath {
                path: path.to_path_buf(),
            });
        }

        info!("Using installation root: {}", path.display());
        Ok(Self {
            path: path.to_path_buf(),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn marker_path(root: &Path) -> PathBuf {
        MARKER_FILE.iter().fold(root.to_path_buf(), |p, c| p.join(c))
    }

    /// `<root>/app/code`
    pub fn code_dir(&self) -> PathBuf {
        CODE_DIR.iter().fold(self.path.clone(), |p, c| p.join(c))
    }

    /// `<root>/app/code/<Namespace>/<Name>`
    pub fn module_dir(&self, name: &ModuleName) -> PathBuf {
        self.code_dir().join(name.namespace()).join(name.name())
    }
}
