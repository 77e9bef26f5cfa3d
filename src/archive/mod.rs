mod zip;

use crate::runtime::Runtime;
use anyhow::Result;
use std::path::Path;

pub use zip::ZipExtractor;

/// Unpacks an archive file into a directory.
#[cfg_attr(test, mockall::automock)]
pub trait ArchiveExtractor: Send + Sync {
    /// Extract every entry of `archive_path` beneath `extract_to`, preserving
    /// the archive's own directory structure.
    fn extract<R: Runtime + 'static>(
        &self,
        runtime: &R,
        archive_path: &Path,
        extract_to: &Path,
    ) -> Result<()>;
}
