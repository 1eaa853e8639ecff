use crate::shared::raster_image::RasterImage;

/// Where finished annotations go and where the user is told about failures.
pub trait DisplaySurface {
    /// Replace whatever is currently shown with `image`.
    fn present(&mut self, image: RasterImage);

    /// Show a blocking message the user has to acknowledge.
    fn show_notice(&mut self, message: &str);
}
