use thiserror::Error;

use super::manifest::ManifestError;
use crate::disk::DiskError;
use crate::vk::VkError;

/// Failures that end a backup run. Per-photo problems are never reported
/// here; they are collected as [`super::PhotoResult`]s instead.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("Failed to fetch photo metadata: {0}")]
    Metadata(#[from] VkError),

    #[error("Could not create folder \"{name}\": {source}")]
    Container { name: String, source: DiskError },

    #[error(transparent)]
    Manifest(#[from] ManifestError),
}
