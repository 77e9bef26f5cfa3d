//! Per-artifact outcome records and the batch report.

use serde::Serialize;
use std::fmt;

use crate::module::ModuleName;

/// Why an artifact could not be installed. One per failed artifact; the
/// first failing stage wins.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Failure {
    /// The locator could not be read.
    ReadFailure,
    /// The scratch archive file could not be written.
    WriteFailure,
    /// Unpacking, manifest resolution or the final copy failed.
    ExtractFailure,
}

impl Failure {
    pub fn message(&self) -> &'static str {
        match self {
            Failure::ReadFailure => "Failed to read path",
            Failure::WriteFailure => "Failed to write contents to path",
            Failure::ExtractFailure => "Failed to extract artifact to target path",
        }
    }
}

impl fmt::Display for Failure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.message())
    }
}

impl std::error::Error for Failure {}

/// A pipeline stage failure with the underlying cause kept for diagnostics.
#[derive(Debug)]
pub struct StageError {
    pub failure: Failure,
    /// Module name as declared in the manifest, if parsing got that far.
    pub module: Option<String>,
    pub source: anyhow::Error,
}

impl StageError {
    pub fn read(source: anyhow::Error) -> Self {
        Self::new(Failure::ReadFailure, source)
    }

    pub fn write(source: anyhow::Error) -> Self {
        Self::new(Failure::WriteFailure, source)
    }

    pub fn extract(source: anyhow::Error) -> Self {
        Self::new(Failure::ExtractFailure, source)
    }

    fn new(failure: Failure, source: anyhow::Error) -> Self {
        Self {
            failure,
            module: None,
            source,
        }
    }

    pub fn with_module(mut self, module: impl Into<String>) -> Self {
        self.module = Some(module.into());
        self
    }
}

impl fmt::Display for StageError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {:#}", self.failure, self.source)
    }
}

/// One artifact of a batch: the caller's key and its locator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactRef {
    pub id: String,
    pub locator: String,
}

impl ArtifactRef {
    pub fn new(id: impl Into<String>, locator: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            locator: locator.into(),
        }
    }

    /// Key each locator by its position, starting at 0.
    pub fn indexed<I, S>(locators: I) -> Vec<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        locators
            .into_iter()
            .enumerate()
            .map(|(i, locator)| Self::new(i.to_string(), locator))
            .collect()
    }
}

/// Outcome of installing one artifact.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ArtifactResult {
    pub id: String,
    pub path: String,
    pub state: bool,
    pub name: String,
    pub message: String,
    #[serde(skip)]
    pub failure: Option<Failure>,
    /// Full error chain behind `message`, for logs only.
    #[serde(skip)]
    pub cause: Option<String>,
}

impl ArtifactResult {
    pub fn installed(artifact: &ArtifactRef, name: &ModuleName) -> Self {
        Self {
            id: artifact.id.clone(),
            path: artifact.locator.clone(),
            state: true,
            name: name.to_string(),
            message: String::new(),
            failure: None,
            cause: None,
        }
    }

    pub fn failed(artifact: &ArtifactRef, error: StageError) -> Self {
        Self {
            id: artifact.id.clone(),
            path: artifact.locator.clone(),
            state: false,
            name: error.module.unwrap_or_default(),
            message: error.failure.message().to_string(),
            failure: Some(error.failure),
            cause: Some(format!("{:#}", error.source)),
        }
    }
}

/// Results of a batch, in input order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Report {
    results: Vec<ArtifactResult>,
}

impl Report {
    pub fn new(results: Vec<ArtifactResult>) -> Self {
        Self { results }
    }

    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, ArtifactResult> {
        self.results.iter()
    }

    pub fn get(&self, id: &str) -> Option<&ArtifactResult> {
        self.results.iter().find(|r| r.id == id)
    }

    pub fn has_failures(&self) -> bool {
        self.results.iter().any(|r| !r.state)
    }
}

impl<'a> IntoIterator for &'a Report {
    type Item = &'a ArtifactResult;
    type IntoIter = std::slice::Iter<'a, ArtifactResult>;

    fn into_iter(self) -> Self::IntoIter {
        self.results.iter()
    }
}
