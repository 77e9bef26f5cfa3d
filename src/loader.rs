//! Artifact loader: fetch raw artifact bytes from a local path or a URL.

use anyhow::{Context, Result, anyhow};
use async_trait::async_trait;
use log::{debug, info};
use reqwest::Url;
use std::path::PathBuf;
use std::sync::Arc;

use crate::http::HttpClient;
use crate::runtime::Runtime;

/// Where an artifact locator points.
#[derive(Debug, PartialEq, Eq, Clone)]
pub enum Source {
    Remote(Url),
    Local(PathBuf),
}

impl Source {
    /// `http(s)://` is remote, `file://` is mapped to a path, anything else is
    /// taken as a filesystem path as-is.
    pub fn classify(locator: &str) -> Result<Self> {
        match Url::parse(locator) {
            Ok(url) if matches!(url.scheme(), "http" | "https") => Ok(Source::Remote(url)),
            Ok(url) if url.scheme() == "file" => url
                .to_file_path()
                .map(Source::Local)
                .map_err(|_| anyhow!("Unsupported file URL: {}", locator)),
            _ => Ok(Source::Local(PathBuf::from(locator))),
        }
    }
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait LoadArtifact: Send + Sync {
    /// Read the full content behind `locator`.
    async fn load(&self, locator: &str) -> Result<Vec<u8>>;
}

pub struct ArtifactLoader<R: Runtime> {
    runtime: Arc<R>,
    http_client: HttpClient,
}

impl<R: Runtime> ArtifactLoader<R> {
    pub fn new(runtime: Arc<R>, http_client: HttpClient) -> Self {
        Self {
            runtime,
            http_client,
        }
    }
}

#[async_trait]
impl<R: Runtime> LoadArtifact for ArtifactLoader<R> {
    #[tracing::instrument(skip(self))]
    async fn load(&self, locator: &str) -> Result<Vec<u8>> {
        match Source::classify(locator)? {
            Source::Remote(url) => {
                info!("Downloading artifact from {}...", url);
                self.http_client.get_bytes(url.as_str()).await
            }
            Source::Local(path) => {
                debug!("Reading artifact from {:?}", path);
                self.runtime
                    .read(&path)
                    .with_context(|| format!("Failed to read artifact {:?}", path))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runtime::{MockRuntime, RealRuntime};
    use mockall::predicate::eq;
    use reqwest::Client;
    use std::path::Path;
    use tempfile::tempdir;

    fn loader<R: Runtime>(runtime: R) -> ArtifactLoader<R> {
        ArtifactLoader::new(Arc::new(runtime), HttpClient::new(Client::new()))
    }

    #[test]
    fn test_classify() {
        assert_eq!(
            Source::classify("https://example.com/a.zip").unwrap(),
            Source::Remote(Url::parse("https://example.com/a.zip").unwrap())
        );
        assert_eq!(
            Source::classify("/tmp/a.zip").unwrap(),
            Source::Local(PathBuf::from("/tmp/a.zip"))
        );
        assert_eq!(
            Source::classify("relative/a.zip").unwrap(),
            Source::Local(PathBuf::from("relative/a.zip"))
        );
        // unknown schemes are just odd paths
        assert_eq!(
            Source::classify("ftp://example.com/a.zip").unwrap(),
            Source::Local(PathBuf::from("ftp://example.com/a.zip"))
        );
    }

    #[test]
    #[cfg(unix)]
    fn test_classify_file_url() {
        assert_eq!(
            Source::classify("file:///tmp/a.zip").unwrap(),
            Source::Local(PathBuf::from("/tmp/a.zip"))
        );
        assert!(Source::classify("file://remote-host/a.zip").is_err());
    }

    #[tokio::test]
    async fn test_load_local_path() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("a.zip");
        std::fs::write(&path, b"zip bytes").unwrap();

        let data = loader(RealRuntime)
            .load(path.to_str().unwrap())
            .await
            .unwrap();
        assert_eq!(data, b"zip bytes");
    }

    #[tokio::test]
    async fn test_load_missing_path() {
        let mut runtime = MockRuntime::new();
        runtime
            .expect_read()
            .with(eq(Path::new("missing.zip").to_path_buf()))
            .returning(|_| Err(anyhow!("No such file or directory")));

        let err = loader(runtime).load("missing.zip").await.unwrap_err();
        assert!(err.to_string().contains("Failed to read artifact"));
    }

    #[tokio::test]
    async fn test_load_url() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/vendor/sample.zip")
            .with_status(200)
            .with_body("remote bytes")
            .create_async()
            .await;

        // no expectations: the runtime is not consulted for URLs
        let data = loader(MockRuntime::new())
            .load(&format!("{}/vendor/sample.zip", server.url()))
            .await
            .unwrap();

        mock.assert_async().await;
        assert_eq!(data, b"remote bytes");
    }

    #[tokio::test]
    async fn test_load_url_server_error() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/sample.zip")
            .with_status(500)
            .create_async()
            .await;

        let result = loader(MockRuntime::new())
            .load(&format!("{}/sample.zip", server.url()))
            .await;

        mock.assert_async().await;
        assert!(result.is_err());
    }
}
