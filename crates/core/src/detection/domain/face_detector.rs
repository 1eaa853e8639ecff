use crate::detection::domain::detected_face::DetectedFace;
use crate::shared::raster_image::RasterImage;

pub type DetectorError = Box<dyn std::error::Error>;

/// The external face/landmark detection capability.
///
/// `is_operational` may lazily acquire resources (load a model, open a
/// session); `release` gives them back. Callers go through
/// [`DetectionAdapter`](super::detection_adapter::DetectionAdapter), which
/// pairs every acquisition with a release.
pub trait FaceDetector: Send {
    fn is_operational(&mut self) -> bool;

    /// Blocks until detection finishes. Face order is detector-defined.
    fn detect(&mut self, image: &RasterImage) -> Result<Vec<DetectedFace>, DetectorError>;

    fn release(&mut self);
}
