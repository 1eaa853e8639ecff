use std::path::Path;

use crate::error::AnnotateError;
use crate::imaging::domain::image_writer::ImageWriter;
use crate::shared::raster_image::RasterImage;

/// Writes an image to disk using the `image` crate.
pub struct ImageFileWriter;

impl ImageFileWriter {
    pub fn new() -> Self {
        Self
    }
}

impl Default for ImageFileWriter {
    fn default() -> Self {
        Self::new()
    }
}

impl ImageWriter for ImageFileWriter {
    fn write(&self, path: &Path, image: &RasterImage) -> Result<(), AnnotateError> {
        let write_err = |source: Box<dyn std::error::Error + Send + Sync>| AnnotateError::Write {
            path: path.to_path_buf(),
            source,
        };

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|e| write_err(Box::new(e)))?;
        }

        image
            .clone()
            .into_rgb_image()
            .save(path)
            .map_err(|e| write_err(Box::new(e)))
    }
}
