//! Scratch space for one artifact: the downloaded archive file and the
//! directory it is unpacked into.

use anyhow::{Context, Result, anyhow};
use log::debug;
use std::path::Path;
use uuid::Uuid;

use crate::cleanup::{ScratchGuard, ScratchKind, SharedCleanupContext};
use crate::runtime::Runtime;

const ARTIFACT_PREFIX: &str = "artifact";
const WORK_DIR_PREFIX: &str = "module";

/// `<prefix>_<uuid>`, unique across runs and concurrent artifacts.
pub fn unique_name(prefix: &str) -> String {
    format!("{}_{}", prefix, Uuid::new_v4().simple())
}

/// Persist raw artifact bytes to a fresh file in the system temp directory.
#[tracing::instrument(skip(runtime, ctx, data), fields(len = data.len()))]
pub fn write_artifact<'a, R: Runtime>(
    runtime: &'a R,
    ctx: &SharedCleanupContext,
    data: &[u8],
) -> Result<ScratchGuard<'a, R>> {
    if data.is_empty() {
        return Err(anyhow!("Artifact is empty, nothing to write"));
    }

    let path = runtime.temp_dir().join(unique_name(ARTIFACT_PREFIX));
    debug!("Writing {} bytes to {:?}", data.len(), path);

    // guard first so a partial write is still removed
    let guard = ScratchGuard::new(runtime, ctx.clone(), path, ScratchKind::File);
    runtime
        .write(guard.path(), data)
        .with_context(|| format!("Failed to write artifact to {:?}", guard.path()))?;

    Ok(guard)
}

/// Create an empty working directory directly under `parent`.
#[tracing::instrument(skip(runtime, ctx))]
pub fn create_work_dir<'a, R: Runtime>(
    runtime: &'a R,
    ctx: &SharedCleanupContext,
    parent: &Path,
) -> Result<ScratchGuard<'a, R>> {
    let path = parent.join(unique_name(WORK_DIR_PREFIX));
    runtime
        .create_dir_all(&path)
        .with_context(|| format!("Failed to create work directory {:?}", path))?;
    debug!("Created work directory {:?}", path);

    Ok(ScratchGuard::new(runtime, ctx.clone(), path, ScratchKind::Dir))
}
