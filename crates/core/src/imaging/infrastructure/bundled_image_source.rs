use std::path::Path;

use crate::error::AnnotateError;
use crate::imaging::domain::image_source::ImageSource;
use crate::shared::raster_image::RasterImage;

/// Default portrait compiled into the binary.
pub static DEFAULT_ASSET: &[u8] = include_bytes!("../../../assets/default_portrait.png");

/// Decodes the embedded default asset or files on disk with the `image` crate.
///
/// Everything is converted to 8-bit RGB so the renderer can draw in place
/// regardless of the source's color type.
pub struct BundledImageSource {
    default_asset: &'static [u8],
}

impl BundledImageSource {
    pub fn new() -> Self {
        Self::with_default_asset(DEFAULT_ASSET)
    }

    pub fn with_default_asset(default_asset: &'static [u8]) -> Self {
        Self { default_asset }
    }
}

impl Default for BundledImageSource {
    fn default() -> Self {
        Self::new()
    }
}

impl ImageSource for BundledImageSource {
    fn load_default(&self) -> Result<RasterImage, AnnotateError> {
        let img = image::load_from_memory(self.default_asset)
            .map_err(AnnotateError::DecodeAsset)?
            .into_rgb8();
        non_empty(img.into())
    }

    fn load_from_path(&self, path: &Path) -> Result<RasterImage, AnnotateError> {
        let img = image::open(path)
            .map_err(|source| AnnotateError::Decode {
                path: path.to_path_buf(),
                source,
            })?
            .into_rgb8();
        log::debug!(
            "Decoded {} ({}x{})",
            path.display(),
            img.width(),
            img.height()
        );
        non_empty(img.into())
    }
}

fn non_empty(image: RasterImage) -> Result<RasterImage, AnnotateError> {
    if image.width() == 0 || image.height() == 0 {
        return Err(AnnotateError::EmptyImage {
            width: image.width(),
            height: image.height(),
        });
    }
    Ok(image)
}
