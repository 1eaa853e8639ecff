use std::path::Path;

use crate::detection::domain::detected_face::DetectedFace;
use crate::detection::domain::face_detector::{DetectorError, FaceDetector};
use crate::error::AnnotateError;
use crate::shared::raster_image::RasterImage;

/// Replays a fixed set of faces regardless of the image.
///
/// Used to re-annotate with detections saved from an earlier run, and as a
/// stand-in for the model in tests.
pub struct FixedFaceDetector {
    faces: Vec<DetectedFace>,
    operational: bool,
}

impl FixedFaceDetector {
    pub fn new(faces: Vec<DetectedFace>) -> Self {
        Self {
            faces,
            operational: true,
        }
    }

    /// A detector that always reports itself as not set up.
    pub fn unavailable() -> Self {
        Self {
            faces: Vec::new(),
            operational: false,
        }
    }

    /// Loads faces from a JSON array of `{"box": {...}, "landmarks": [...]}`.
    pub fn from_json_file(path: &Path) -> Result<Self, AnnotateError> {
        let detections_err = |source: Box<dyn std::error::Error + Send + Sync>| {
            AnnotateError::Detections {
                path: path.to_path_buf(),
                source,
            }
        };
        let json = std::fs::read_to_string(path).map_err(|e| detections_err(Box::new(e)))?;
        let faces: Vec<DetectedFace> =
            serde_json::from_str(&json).map_err(|e| detections_err(Box::new(e)))?;
        log::debug!("Loaded {} faces from {}", faces.len(), path.display());
        Ok(Self::new(faces))
    }
}

impl FaceDetector for FixedFaceDetector {
    fn is_operational(&mut self) -> bool {
        self.operational
    }

    fn detect(&mut self, _image: &RasterImage) -> Result<Vec<DetectedFace>, DetectorError> {
        Ok(self.faces.clone())
    }

    fn release(&mut self) {}
}
