//! Moves an extracted module payload into its final directory.

use anyhow::{Context, Result};
use log::{debug, info};
use std::path::Path;

use crate::cleanup::ScratchGuard;
use crate::runtime::Runtime;

/// Copy `payload` into `destination` and then remove the work directory.
///
/// The destination is created if needed and existing files in it are
/// overwritten, so installing the same module twice succeeds. Returns the
/// number of files copied.
#[tracing::instrument(skip(runtime, work_dir))]
pub fn install<R: Runtime>(
    runtime: &R,
    work_dir: ScratchGuard<'_, R>,
    payload: &Path,
    destination: &Path,
) -> Result<u64> {
    runtime
        .create_dir_all(destination)
        .with_context(|| format!("Failed to create module directory {:?}", destination))?;

    let copied = copy_dir(runtime, payload, destination)?;
    info!("Copied {} files to {}", copied, destination.display());

    work_dir
        .remove()
        .context("Failed to remove work directory")?;

    Ok(copied)
}

/// Recursively copy the contents of `from` into the existing directory `to`.
pub fn copy_dir<R: Runtime>(runtime: &R, from: &Path, to: &Path) -> Result<u64> {
    let mut copied = 0;

    for entry in runtime.read_dir(from)? {
        let Some(file_name) = entry.file_name() else {
            continue;
        };
        let target = to.join(file_name);

        if runtime.is_dir(&entry) {
            runtime
                .create_dir_all(&target)
                .with_context(|| format!("Failed to create directory {:?}", target))?;
            copied += copy_dir(runtime, &entry, &target)?;
        } else {
            debug!("Installing {:?}", target);
            copy_file(runtime, &entry, &target)?;
            copied += 1;
        }
    }

    Ok(copied)
}

/// Copy one file, replacing an existing target that cannot be opened for
/// writing (e.g. read-only from a previous install).
fn copy_file<R: Runtime>(runtime: &R, from: &Path, to: &Path) -> Result<()> {
    let first = match runtime.copy(from, to) {
        Ok(_) => return Ok(()),
        Err(e) => e,
    };
    if !runtime.exists(to) || runtime.is_dir(to) {
        return Err(first).with_context(|| format!("Failed to copy {:?} to {:?}", from, to));
    }

    debug!("Replacing {:?} after failed copy: {:#}", to, first);
    runtime
        .remove_file(to)
        .with_context(|| format!("Failed to replace {:?}", to))?;
    runtime
        .copy(from, to)
        .with_context(|| format!("Failed to copy {:?} to {:?}", from, to))?;
    Ok(())
}
