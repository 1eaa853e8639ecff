use std::path::Path;

use crate::error::AnnotateError;
use crate::shared::raster_image::RasterImage;

/// Produces freshly decoded images for a pipeline run.
///
/// Implementations must not cache: each call returns a new buffer.
pub trait ImageSource: Send {
    /// Decodes the bundled default image.
    fn load_default(&self) -> Result<RasterImage, AnnotateError>;

    /// Decodes an arbitrary file into full-resolution RGB.
    fn load_from_path(&self, path: &Path) -> Result<RasterImage, AnnotateError>;
}
