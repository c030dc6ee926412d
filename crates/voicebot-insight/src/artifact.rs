//! Artifact sinks for reports and data exports.

use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::NaiveDate;
use tracing::info;

use crate::error::InsightError;

/// A downloadable file produced by the session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Artifact {
    pub file_name: String,
    pub media_type: String,
    pub bytes: Vec<u8>,
}

impl Artifact {
    /// `{prefix}-{kind}-YYYY-MM-DD.{extension}`
    pub fn dated_name(prefix: &str, kind: &str, date: NaiveDate, extension: &str) -> String {
        format!("{}-{}-{}.{}", prefix, kind, date.format("%Y-%m-%d"), extension)
    }
}

/// Where finished artifacts go.
#[async_trait]
pub trait ArtifactSink: Send + Sync {
    /// Store the artifact and return where it can be found.
    async fn store(&self, artifact: &Artifact) -> Result<String, InsightError>;
}

/// Writes artifacts into a directory, creating it if needed.
#[derive(Debug, Clone)]
pub struct FileArtifactSink {
    dir: PathBuf,
}

impl FileArtifactSink {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

#[async_trait]
impl ArtifactSink for FileArtifactSink {
    async fn store(&self, artifact: &Artifact) -> Result<String, InsightError> {
        if artifact.file_name.contains(['/', '\\']) || artifact.file_name.starts_with('.') {
            return Err(InsightError::Artifact(format!(
                "invalid file name: {}",
                artifact.file_name
            )));
        }
        tokio::fs::create_dir_all(&self.dir).await?;
        let path = self.dir.join(&artifact.file_name);

        // Stage next to the target and rename into place, so the final name
        // only ever holds a complete artifact. A failed write drops the
        // staged file, which removes it.
        let dir = self.dir.clone();
        let target = path.clone();
        let bytes = artifact.bytes.clone();
        tokio::task::spawn_blocking(move || -> Result<(), InsightError> {
            let mut staged = tempfile::NamedTempFile::new_in(&dir)?;
            staged.write_all(&bytes)?;
            staged.as_file().sync_all()?;
            staged.persist(&target).map_err(|e| InsightError::Io(e.error))?;
            Ok(())
        })
        .await
        .map_err(|e| InsightError::Artifact(format!("write task failed: {}", e)))??;

        info!(path = %path.display(), bytes = artifact.bytes.len(), "Artifact written");
        Ok(path.display().to_string())
    }
}

/// Keeps artifacts in memory. Useful when no output directory is wanted.
#[derive(Debug, Default)]
pub struct MemoryArtifactSink {
    stored: Mutex<Vec<Artifact>>,
}

impl MemoryArtifactSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn artifacts(&self) -> Vec<Artifact> {
        self.stored.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }
}

#[async_trait]
impl ArtifactSink for MemoryArtifactSink {
    async fn store(&self, artifact: &Artifact) -> Result<String, InsightError> {
        self.stored
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(artifact.clone());
        Ok(format!("memory://{}", artifact.file_name))
    }
}
