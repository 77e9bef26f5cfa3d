//! Batch orchestration: run every artifact through
//! load → write → unpack/resolve → install and collect one result each.

mod result;

use log::{info, warn};
use std::path::Path;
use std::sync::Arc;

use crate::archive::ArchiveExtractor;
use crate::cleanup::{ScratchGuard, SharedCleanupContext, new_shared};
use crate::installer;
use crate::loader::LoadArtifact;
use crate::module::{self, ModuleLayout, ModuleManifest, ModuleName};
use crate::root::InstallationRoot;
use crate::runtime::Runtime;
use crate::scratch;

pub use result::{ArtifactRef, ArtifactResult, Failure, Report, StageError};

/// An artifact unpacked into its work directory with its module resolved.
struct Unpacked<'a, R: Runtime> {
    work_dir: ScratchGuard<'a, R>,
    layout: ModuleLayout,
    name: ModuleName,
}

pub struct ModuleExtractor<R: Runtime, L: LoadArtifact, E: ArchiveExtractor> {
    runtime: Arc<R>,
    loader: L,
    extractor: E,
    root: InstallationRoot,
    cleanup_ctx: SharedCleanupContext,
}

impl<R: Runtime + 'static, L: LoadArtifact, E: ArchiveExtractor> ModuleExtractor<R, L, E> {
    pub fn new(runtime: Arc<R>, loader: L, extractor: E, root: InstallationRoot) -> Self {
        Self {
            runtime,
            loader,
            extractor,
            root,
            cleanup_ctx: new_shared(),
        }
    }

    /// Register scratch paths with `ctx` so an interrupt handler can remove them.
    pub fn with_cleanup_context(mut self, ctx: SharedCleanupContext) -> Self {
        self.cleanup_ctx = ctx;
        self
    }

    /// Install every artifact in order. Failures are recorded on the
    /// corresponding result and never stop the batch.
    #[tracing::instrument(skip(self, artifacts), fields(count = artifacts.len()))]
    pub async fn extract(&self, artifacts: &[ArtifactRef]) -> Report {
        let mut results = Vec::with_capacity(artifacts.len());

        for artifact in artifacts {
            let result = match self.run(&artifact.locator).await {
                Ok(name) => {
                    info!("Installed {} from {}", name, artifact.locator);
                    ArtifactResult::installed(artifact, &name)
                }
                Err(e) => {
                    warn!("Artifact {} ({}): {}", artifact.id, artifact.locator, e);
                    ArtifactResult::failed(artifact, e)
                }
            };
            results.push(result);
        }

        Report::new(results)
    }

    async fn run(&self, locator: &str) -> Result<ModuleName, StageError> {
        let runtime = self.runtime.as_ref();

        let data = self.loader.load(locator).await.map_err(StageError::read)?;

        // removed when this function returns, whatever the outcome
        let archive = scratch::write_artifact(runtime, &self.cleanup_ctx, &data)
            .map_err(StageError::write)?;
        drop(data);

        let Unpacked {
            work_dir,
            layout,
            name,
        } = self.unpack(archive.path())?;

        let destination = self.root.module_dir(&name);
        installer::install(runtime, work_dir, &layout.container, &destination)
            .map_err(|e| StageError::extract(e).with_module(name.to_string()))?;

        Ok(name)
    }

    /// Unpack the scratch archive under the installation root and resolve the
    /// module it contains.
    fn unpack(&self, archive: &Path) -> Result<Unpacked<'_, R>, StageError> {
        let runtime = self.runtime.as_ref();

        let work_dir = scratch::create_work_dir(runtime, &self.cleanup_ctx, self.root.path())
            .map_err(StageError::extract)?;

        self.extractor
            .extract(runtime, archive, work_dir.path())
            .map_err(StageError::extract)?;

        let layout = module::locate(runtime, work_dir.path()).map_err(StageError::extract)?;
        let manifest =
            ModuleManifest::load(runtime, &layout.manifest).map_err(StageError::extract)?;
        let name = manifest
            .module_name()
            .map_err(|e| StageError::extract(e).with_module(manifest.name.clone()))?;

        Ok(Unpacked {
            work_dir,
            layout,
            name,
        })
    }
}
