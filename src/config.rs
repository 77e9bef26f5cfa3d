use anyhow::{Context, Result};
use log::debug;
use reqwest::Client;
use std::sync::Arc;
use std::time::Duration;

use crate::{archive::ZipExtractor, http::HttpClient, loader::ArtifactLoader, runtime::Runtime};

/// Default bound on a single artifact download, in seconds.
pub const DEFAULT_TIMEOUT_SECS: u64 = 60;

const USER_AGENT: &str = concat!("module-extractor/", env!("MODULE_EXTRACTOR_VERSION"));

pub struct Config<R: Runtime> {
    pub runtime: Arc<R>,
    pub http_client: HttpClient,
    pub extractor: ZipExtractor,
}

impl<R: Runtime> Config<R> {
    pub fn new(runtime: R, timeout: Duration) -> Result<Self> {
        debug!("HTTP timeout: {:?}", timeout);
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .timeout(timeout)
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self {
            runtime: Arc::new(runtime),
            http_client: HttpClient::new(client),
            extractor: ZipExtractor,
        })
    }

    pub fn loader(&self) -> ArtifactLoader<R> {
        ArtifactLoader::new(Arc::clone(&self.runtime), self.http_client.clone())
    }
}
