use anyhow::Result;
use log::debug;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use crate::runtime::Runtime;

/// Tracks scratch paths that need cleanup on interruption
#[derive(Default)]
pub struct CleanupContext {
    #[cfg(test)]
    pub paths: Vec<PathBuf>,
    #[cfg(not(test))]
    paths: Vec<PathBuf>,
}

impl CleanupContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a path to be cleaned up on interruption
    pub fn add(&mut self, path: PathBuf) {
        self.paths.push(path);
    }

    /// Remove a path from cleanup list (e.g., when it was already removed)
    pub fn remove(&mut self, path: &Path) {
        self.paths.retain(|p| p != path);
    }

    /// Clean up all registered paths
    pub fn cleanup(&self) {
        for path in &self.paths {
            debug!("Cleaning up: {:?}", path);
            if path.is_dir() {
                let _ = std::fs::remove_dir_all(path);
            } else {
                let _ = std::fs::remove_file(path);
            }
        }
    }
}

/// Type alias for shared cleanup context
pub type SharedCleanupContext = Arc<Mutex<CleanupContext>>;

/// Create a new shared cleanup context
pub fn new_shared() -> SharedCleanupContext {
    Arc::new(Mutex::new(CleanupContext::new()))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScratchKind {
    File,
    Dir,
}

/// Owns one scratch path for the duration of a pipeline stage.
///
/// The path is registered with the cleanup context while the guard lives and
/// removed when the guard is dropped. [`ScratchGuard::remove`] removes it
/// eagerly and reports failure; the drop-time removal is best effort.
pub struct ScratchGuard<'a, R: Runtime> {
    runtime: &'a R,
    ctx: SharedCleanupContext,
    path: PathBuf,
    kind: ScratchKind,
    removed: bool,
}

impl<'a, R: Runtime> ScratchGuard<'a, R> {
    /// Take ownership of `path`, which must already exist.
    pub fn new(runtime: &'a R, ctx: SharedCleanupContext, path: PathBuf, kind: ScratchKind) -> Self {
        if let Ok(mut guard) = ctx.lock() {
            guard.add(path.clone());
        }
        Self {
            runtime,
            ctx,
            path,
            kind,
            removed: false,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Remove the scratch path now.
    pub fn remove(mut self) -> Result<()> {
        self.removed = true;
        self.unregister();
        self.remove_path()
    }

    fn remove_path(&self) -> Result<()> {
        match self.kind {
            ScratchKind::File => self.runtime.remove_file(&self.path),
            ScratchKind::Dir => self.runtime.remove_dir_all(&self.path),
        }
    }

    fn unregister(&self) {
        if let Ok(mut guard) = self.ctx.lock() {
            guard.remove(&self.path);
        }
    }
}

impl<R: Runtime> Drop for ScratchGuard<'_, R> {
    fn drop(&mut self) {
        if self.removed {
            return;
        }
        self.unregister();
        if let Err(e) = self.remove_path() {
            debug!("Failed to remove scratch path {:?}: {}", self.path, e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runtime::{MockRuntime, RealRuntime};
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn test_cleanup_context_add_remove() {
        let mut ctx = CleanupContext::new();
        let path = PathBuf::from("/tmp/test");

        ctx.add(path.clone());
        assert_eq!(ctx.paths.len(), 1);

        ctx.remove(&path);
        assert_eq!(ctx.paths.len(), 0);
    }

    #[test]
    fn test_cleanup_context_cleanup_files_and_dirs() {
        let dir = tempdir().unwrap();
        let file_path = dir.path().join("artifact_1");
        fs::write(&file_path, "test").unwrap();
        let sub_dir = dir.path().join("module_1");
        fs::create_dir(&sub_dir).unwrap();
        fs::write(sub_dir.join("file.txt"), "test").unwrap();

        let mut ctx = CleanupContext::new();
        ctx.add(file_path.clone());
        ctx.add(sub_dir.clone());

        ctx.cleanup();
        assert!(!file_path.exists());
        assert!(!sub_dir.exists());
    }

    #[test]
    fn test_scratch_guard_removes_dir_on_drop() {
        let dir = tempdir().unwrap();
        let scratch = dir.path().join("module_x");
        fs::create_dir_all(scratch.join("nested")).unwrap();
        let ctx = new_shared();

        {
            let guard =
                ScratchGuard::new(&RealRuntime, Arc::clone(&ctx), scratch.clone(), ScratchKind::Dir);
            assert_eq!(guard.path(), scratch);
            assert_eq!(ctx.lock().unwrap().paths, vec![scratch.clone()]);
        }

        assert!(!scratch.exists());
        assert!(ctx.lock().unwrap().paths.is_empty());
    }

    #[test]
    fn test_scratch_guard_remove_reports_success() {
        let dir = tempdir().unwrap();
        let scratch = dir.path().join("artifact_x");
        fs::write(&scratch, b"data").unwrap();
        let ctx = new_shared();

        let guard =
            ScratchGuard::new(&RealRuntime, Arc::clone(&ctx), scratch.clone(), ScratchKind::File);
        guard.remove().unwrap();

        assert!(!scratch.exists());
        assert!(ctx.lock().unwrap().paths.is_empty());
    }

    #[test]
    fn test_scratch_guard_remove_reports_failure_once() {
        let mut runtime = MockRuntime::new();
        runtime
            .expect_remove_dir_all()
            .times(1)
            .returning(|_| Err(anyhow::anyhow!("permission denied")));

        let guard = ScratchGuard::new(
            &runtime,
            new_shared(),
            PathBuf::from("module_x"),
            ScratchKind::Dir,
        );
        assert!(guard.remove().is_err());
    }

    #[test]
    fn test_scratch_guard_drop_ignores_failure() {
        let mut runtime = MockRuntime::new();
        runtime
            .expect_remove_file()
            .times(1)
            .returning(|_| Err(anyhow::anyhow!("already gone")));

        let ctx = new_shared();
        {
            let _guard = ScratchGuard::new(
                &runtime,
                Arc::clone(&ctx),
                PathBuf::from("artifact_x"),
                ScratchKind::File,
            );
        }
        assert!(ctx.lock().unwrap().paths.is_empty());
    }
}
