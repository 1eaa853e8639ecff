use std::path::Path;

use crate::error::AnnotateError;
use crate::shared::raster_image::RasterImage;

/// Encodes an image to a file; the format follows the path's extension.
pub trait ImageWriter: Send {
    fn write(&self, path: &Path, image: &RasterImage) -> Result<(), AnnotateError>;
}
