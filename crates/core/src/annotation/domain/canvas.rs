use crate::annotation::domain::annotation_style::Color;
use crate::shared::geometry::{BoundingBox, Point};
use crate::shared::raster_image::RasterImage;

/// Drawing primitives the overlay is built from.
///
/// Coordinates are image pixels; anything outside the surface is clipped.
pub trait Canvas {
    /// Stroked rectangle with rounded corners, stroke centered on the edge.
    fn draw_round_rect(
        &mut self,
        rect: &BoundingBox,
        corner_radius: f32,
        stroke_width: f32,
        color: Color,
    );

    fn draw_circle(&mut self, center: Point, radius: f32, color: Color);

    /// Text whose left end of the baseline sits at `origin`.
    fn draw_text(&mut self, text: &str, origin: Point, size: f32, color: Color);

    /// Scales `image` to `size` and pastes it with its top-left at `top_left`.
    fn draw_image(&mut self, image: &RasterImage, top_left: Point, size: (u32, u32));
}
