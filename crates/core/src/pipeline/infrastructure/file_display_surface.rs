use std::path::PathBuf;

use crate::error::AnnotateError;
use crate::imaging::domain::image_writer::ImageWriter;
use crate::imaging::infrastructure::image_file_writer::ImageFileWriter;
use crate::pipeline::display_surface::DisplaySurface;
use crate::shared::raster_image::RasterImage;

/// Presents by writing the annotated image to a file.
///
/// `DisplaySurface::present` cannot fail, so a write error is kept and
/// handed back through [`FileDisplaySurface::take_error`].
pub struct FileDisplaySurface {
    path: PathBuf,
    writer: Box<dyn ImageWriter>,
    last_error: Option<AnnotateError>,
    notices: Vec<String>,
}

impl FileDisplaySurface {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self::with_writer(path, Box::new(ImageFileWriter::new()))
    }

    pub fn with_writer(path: impl Into<PathBuf>, writer: Box<dyn ImageWriter>) -> Self {
        Self {
            path: path.into(),
            writer,
            last_error: None,
            notices: Vec::new(),
        }
    }

    pub fn notices(&self) -> &[String] {
        &self.notices
    }

    pub fn take_error(&mut self) -> Option<AnnotateError> {
        self.last_error.take()
    }
}

impl DisplaySurface for FileDisplaySurface {
    fn present(&mut self, image: RasterImage) {
        match self.writer.write(&self.path, &image) {
            Ok(()) => {
                log::info!("Wrote {}", self.path.display());
                self.last_error = None;
            }
            Err(e) => {
                log::error!("{e}");
                self.last_error = Some(e);
            }
        }
    }

    fn show_notice(&mut self, message: &str) {
        log::warn!("{message}");
        self.notices.push(message.to_string());
    }
}
