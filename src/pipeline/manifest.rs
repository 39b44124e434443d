//! Run manifest: the ordered list of files that were uploaded, and the sink
//! that persists it.

use std::ffi::OsString;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::fs;

use crate::transfer::TransferOutcome;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ManifestEntry {
    pub file_name: String,
    pub source_url: String,
}

/// Serialized as a bare JSON array of [`ManifestEntry`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Manifest {
    entries: Vec<ManifestEntry>,
}

impl Manifest {
    /// Keep only successful uploads, in the order given.
    pub fn from_outcomes<'a>(outcomes: impl IntoIterator<Item = &'a TransferOutcome>) -> Self {
        let entries = outcomes
            .into_iter()
            .filter(|o| o.succeeded())
            .map(|o| ManifestEntry {
                file_name: o.file_name.clone(),
                source_url: o.source_url.clone(),
            })
            .collect();
        Self { entries }
    }

    pub fn entries(&self) -> &[ManifestEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Pretty JSON with 4-space indentation. Non-ASCII text is written as-is.
    pub fn to_json(&self) -> Result<Vec<u8>, serde_json::Error> {
        let mut buf = Vec::new();
        let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
        let mut ser = serde_json::Serializer::with_formatter(&mut buf, formatter);
        self.serialize(&mut ser)?;
        Ok(buf)
    }
}

#[derive(Debug, Error)]
pub enum ManifestError {
    #[error("Failed to write manifest {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

/// Destination for the manifest of a finished run.
#[async_trait]
pub trait ManifestSink: Send + Sync {
    /// Persist the whole manifest, or nothing.
    async fn persist(&self, manifest: &Manifest) -> Result<(), ManifestError>;
}

/// Writes the manifest as a JSON file via a `.part` sibling and a rename,
/// so readers never observe a half-written file.
#[derive(Debug, Clone)]
pub struct JsonFileSink {
    path: PathBuf,
}

impl JsonFileSink {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn part_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(OsString::from)
            .unwrap_or_else(|| OsString::from("manifest"));
        name.push(".part");
        self.path.with_file_name(name)
    }
}

#[async_trait]
impl ManifestSink for JsonFileSink {
    async fn persist(&self, manifest: &Manifest) -> Result<(), ManifestError> {
        let json = manifest.to_json()?;
        let io_err = |source: std::io::Error| ManifestError::Io {
            path: self.path.clone(),
            source,
        };

        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).await.map_err(io_err)?;
            }
        }

        let part_path = self.part_path();
        fs::write(&part_path, &json).await.map_err(io_err)?;
        if let Err(e) = fs::rename(&part_path, &self.path).await {
            let _ = fs::remove_file(&part_path).await;
            return Err(io_err(e));
        }

        tracing::debug!(entries = manifest.len(), "Wrote manifest {}", self.path.display());
        Ok(())
    }
}
