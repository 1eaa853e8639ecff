use std::path::PathBuf;

use thiserror::Error;

/// Failure of a single annotation run. None of these are fatal to the process.
#[derive(Error, Debug)]
pub enum AnnotateError {
    #[error("failed to decode image {path}: {source}")]
    Decode {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },
    #[error("failed to decode bundled image: {0}")]
    DecodeAsset(#[source] image::ImageError),
    #[error("image has no pixels ({width}x{height})")]
    EmptyImage { width: u32, height: u32 },
    #[error("face detector is not available")]
    DetectorUnavailable,
    #[error("face detection failed: {0}")]
    Detection(String),
    #[error("failed to write image to {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
    #[error("failed to read detections from {path}: {source}")]
    Detections {
        path: PathBuf,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
}

impl AnnotateError {
    /// Whether the failure happened while loading the image, before any
    /// detector was involved.
    pub fn is_decode(&self) -> bool {
        matches!(
            self,
            AnnotateError::Decode { .. }
                | AnnotateError::DecodeAsset(_)
                | AnnotateError::EmptyImage { .. }
        )
    }
}
