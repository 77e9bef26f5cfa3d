use anyhow::{Context, Result};
use log::debug;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use crate::{
    cleanup,
    config::Config,
    extractor::{ArtifactRef, ModuleExtractor, Report},
    root::{InstallationRoot, InvalidBasePath},
    runtime::Runtime,
};

const UPGRADE_HINT: &str = "You may need to run the Magento upgrade process.";

#[derive(Debug, Clone)]
pub struct ExtractOptions {
    /// Installation root; the current directory when absent.
    pub base_path: Option<PathBuf>,
    /// Artifact locators, in processing order.
    pub artifacts: Vec<String>,
    pub timeout: Duration,
    pub json: bool,
}

/// Install the given artifacts. Returns `Ok(false)` if any artifact failed.
#[tracing::instrument(skip(runtime, options))]
pub async fn extract<R: Runtime + 'static>(runtime: R, options: ExtractOptions) -> Result<bool> {
    let config = Config::new(runtime, options.timeout)?;
    run(config, options).await
}

#[tracing::instrument(skip(config, options))]
pub async fn run<R: Runtime + 'static>(config: Config<R>, options: ExtractOptions) -> Result<bool> {
    let root = resolve_root(config.runtime.as_ref(), options.base_path.as_deref())?;
    let artifacts = ArtifactRef::indexed(options.artifacts);

    let cleanup_ctx = cleanup::new_shared();
    let cleanup_ctx_clone = Arc::clone(&cleanup_ctx);

    let ctrl_c_handler = tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            eprintln!("\nInterrupted, cleaning up...");
            if let Ok(ctx) = cleanup_ctx_clone.lock() {
                ctx.cleanup();
            }
            std::process::exit(130);
        }
    });

    let loader = config.loader();
    let extractor = ModuleExtractor::new(Arc::clone(&config.runtime), loader, config.extractor, root)
        .with_cleanup_context(cleanup_ctx);
    let report = extractor.extract(&artifacts).await;

    ctrl_c_handler.abort();

    let output = if options.json {
        render_json(&report)?
    } else {
        render_text(&report)
    };
    print!("{}", output);

    Ok(!report.has_failures())
}

/// Canonicalize `base_path` (or the current directory) and validate it.
pub fn resolve_root<R: Runtime>(runtime: &R, base_path: Option<&Path>) -> Result<InstallationRoot> {
    let candidate = match base_path {
        Some(path) => path.to_path_buf(),
        None => runtime.current_dir()?,
    };

    let path = runtime.canonicalize(&candidate).map_err(|e| {
        debug!("Cannot resolve {:?}: {:#}", candidate, e);
        InvalidBasePath {
            path: candidate.clone(),
        }
    })?;

    Ok(InstallationRoot::new(runtime, &path)?)
}

pub fn render_text(report: &Report) -> String {
    if report.is_empty() {
        return "No modules extracted.\n".to_string();
    }

    let mut out = String::new();
    for result in report {
        if result.state {
            out.push_str(&format!("→ Extracted module '{}'\n", result.name));
        } else {
            out.push_str(&format!("→ Failed to extract module: {}\n", result.message));
        }
    }
    out.push('\n');
    out.push_str(UPGRADE_HINT);
    out.push('\n');
    out
}

pub fn render_json(report: &Report) -> Result<String> {
    let mut json = serde_json::to_string_pretty(report).context("Failed to serialize report")?;
    json.push('\n');
    Ok(json)
}
