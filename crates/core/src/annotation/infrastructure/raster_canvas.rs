use image::{Rgb, RgbImage};

use crate::annotation::domain::annotation_style::Color;
use crate::annotation::domain::canvas::Canvas;
use crate::shared::geometry::{BoundingBox, Point};
use crate::shared::raster_image::RasterImage;

use super::glyphs::{self, GLYPH_ADVANCE, GLYPH_HEIGHT, GLYPH_WIDTH};

/// [`Canvas`] that rasterizes directly into an owned RGB buffer.
pub struct RasterCanvas {
    image: RgbImage,
}

impl RasterCanvas {
    pub fn new(image: RasterImage) -> Self {
        Self {
            image: image.into_rgb_image(),
        }
    }

    pub fn into_image(self) -> RasterImage {
        self.image.into()
    }

    fn put(&mut self, x: i64, y: i64, color: Color) {
        if x >= 0 && y >= 0 && x < self.image.width() as i64 && y < self.image.height() as i64 {
            self.image.put_pixel(x as u32, y as u32, Rgb(color));
        }
    }

    /// Pixel index range `[from, to)` covering `[lo, hi]`, clipped to `0..limit`.
    fn span(lo: f32, hi: f32, limit: u32) -> std::ops::Range<i64> {
        let from = (lo.floor() as i64).max(0);
        let to = (hi.ceil() as i64 + 1).min(limit as i64);
        from..to.max(from)
    }
}

/// Signed distance from `(px, py)` to the outline of a rounded rectangle;
/// negative inside.
fn round_rect_distance(rect: &BoundingBox, radius: f32, px: f32, py: f32) -> f32 {
    let half_w = rect.width.abs() / 2.0;
    let half_h = rect.height.abs() / 2.0;
    let r = radius.max(0.0).min(half_w).min(half_h);
    let center = rect.center();

    let qx = (px - center.x).abs() - (half_w - r);
    let qy = (py - center.y).abs() - (half_h - r);
    let outside = qx.max(0.0).hypot(qy.max(0.0));
    let inside = qx.max(qy).min(0.0);
    outside + inside - r
}

impl Canvas for RasterCanvas {
    fn draw_round_rect(
        &mut self,
        rect: &BoundingBox,
        corner_radius: f32,
        stroke_width: f32,
        color: Color,
    ) {
        let half_stroke = stroke_width.max(1.0) / 2.0;
        let xs = Self::span(
            rect.left - half_stroke,
            rect.right() + half_stroke,
            self.image.width(),
        );
        let ys = Self::span(
            rect.top - half_stroke,
            rect.bottom() + half_stroke,
            self.image.height(),
        );

        for y in ys {
            for x in xs.clone() {
                let d = round_rect_distance(rect, corner_radius, x as f32, y as f32);
                if d.abs() <= half_stroke {
                    self.put(x, y, color);
                }
            }
        }
    }

    fn draw_circle(&mut self, center: Point, radius: f32, color: Color) {
        imageproc::drawing::draw_filled_circle_mut(
            &mut self.image,
            (center.x.round() as i32, center.y.round() as i32),
            radius.round().max(0.0) as i32,
            Rgb(color),
        );
    }

    fn draw_text(&mut self, text: &str, origin: Point, size: f32, color: Color) {
        // Cap height is roughly 70% of the text size.
        let scale = ((size * 0.7) / GLYPH_HEIGHT as f32).round().max(1.0) as i64;
        let left = origin.x.round() as i64;
        let top = origin.y.round() as i64 - GLYPH_HEIGHT as i64 * scale;

        for (i, c) in text.chars().enumerate() {
            let Some(rows) = glyphs::glyph(c) else {
                continue;
            };
            let glyph_left = left + i as i64 * GLYPH_ADVANCE as i64 * scale;
            for row in 0..GLYPH_HEIGHT {
                for col in 0..GLYPH_WIDTH {
                    if !glyphs::is_set(rows, col, row) {
                        continue;
                    }
                    let x0 = glyph_left + col as i64 * scale;
                    let y0 = top + row as i64 * scale;
                    for dy in 0..scale {
                        for dx in 0..scale {
                            self.put(x0 + dx, y0 + dy, color);
                        }
                    }
                }
            }
        }
    }

    fn draw_image(&mut self, image: &RasterImage, top_left: Point, size: (u32, u32)) {
        let (w, h) = size;
        if w == 0 || h == 0 {
            return;
        }
        let overlay = image.clone().into_rgb_image();
        let overlay = if overlay.dimensions() == size {
            overlay
        } else {
            image::imageops::resize(&overlay, w, h, image::imageops::FilterType::Triangle)
        };
        image::imageops::overlay(
            &mut self.image,
            &overlay,
            top_left.x.round() as i64,
            top_left.y.round() as i64,
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    const BG: Color = [0, 0, 0];
    const INK: Color = [0, 255, 255];

    fn canvas(w: u32, h: u32) -> RasterCanvas {
        RasterCanvas::new(RasterImage::filled(w, h, BG))
    }

    fn inked(image: &RasterImage) -> usize {
        image
            .data()
            .chunks_exact(3)
            .filter(|px| *px == INK.as_slice())
            .count()
    }

    #[test]
    fn test_round_rect_distance_sign() {
        let rect = BoundingBox::new(10.0, 10.0, 50.0, 50.0);
        assert_relative_eq!(round_rect_distance(&rect, 2.0, 10.0, 35.0), 0.0);
        assert!(round_rect_distance(&rect, 2.0, 35.0, 35.0) < 0.0);
        assert!(round_rect_distance(&rect, 2.0, 0.0, 35.0) > 0.0);
    }

    #[test]
    fn test_round_rect_strokes_edges_not_interior() {
        let mut c = canvas(80, 80);
        c.draw_round_rect(&BoundingBox::new(10.0, 10.0, 50.0, 50.0), 2.0, 5.0, INK);
        let img = c.into_image();

        assert_eq!(img.pixel(10, 35), INK); // left edge
        assert_eq!(img.pixel(60, 35), INK); // right edge
        assert_eq!(img.pixel(35, 10), INK); // top edge
        assert_eq!(img.pixel(35, 60), INK); // bottom edge
        assert_eq!(img.pixel(35, 35), BG);
        assert_eq!(img.pixel(2, 2), BG);
    }

    #[test]
    fn test_round_rect_rounds_corners() {
        let mut c = canvas(200, 200);
        c.draw_round_rect(&BoundingBox::new(50.0, 50.0, 100.0, 100.0), 30.0, 2.0, INK);
        let img = c.into_image();
        assert_eq!(img.pixel(50, 50), BG);
        assert_eq!(img.pixel(50, 100), INK);
    }

    #[test]
    fn test_round_rect_is_clipped() {
        let mut c = canvas(20, 20);
        c.draw_round_rect(&BoundingBox::new(-10.0, -10.0, 100.0, 100.0), 2.0, 5.0, INK);
        let img = c.into_image();
        assert_eq!(inked(&img), 0);
    }

    #[test]
    fn test_circle_is_filled_around_center() {
        let mut c = canvas(60, 60);
        c.draw_circle(Point::new(20.0, 20.0), 10.0, INK);
        let img = c.into_image();
        assert_eq!(img.pixel(20, 20), INK);
        assert_eq!(img.pixel(27, 20), INK);
        assert_eq!(img.pixel(35, 20), BG);
    }

    #[test]
    fn test_text_sits_on_baseline() {
        let mut c = canvas(100, 100);
        c.draw_text("1", Point::new(20.0, 60.0), 50.0, INK);
        let img = c.into_image();

        // scale 5: glyph spans y 25..60, the "1" stem is column 2 → x 30..35
        assert_eq!(img.pixel(32, 40), INK);
        assert_eq!(img.pixel(32, 59), INK);
        assert_eq!(img.pixel(32, 61), BG);
        assert_eq!(img.pixel(32, 20), BG);
    }

    #[test]
    fn test_multi_digit_text_advances() {
        let mut one = canvas(200, 100);
        one.draw_text("1", Point::new(10.0, 60.0), 50.0, INK);
        let mut eleven = canvas(200, 100);
        eleven.draw_text("11", Point::new(10.0, 60.0), 50.0, INK);
        assert_eq!(inked(&eleven.into_image()), 2 * inked(&one.into_image()));
    }

    #[test]
    fn test_draw_image_scales_and_places() {
        let mut c = canvas(40, 40);
        let patch = RasterImage::filled(2, 2, INK);
        c.draw_image(&patch, Point::new(10.0, 10.0), (8, 8));
        let img = c.into_image();
        assert_eq!(img.pixel(10, 10), INK);
        assert_eq!(img.pixel(17, 17), INK);
        assert_eq!(img.pixel(18, 18), BG);
        assert_eq!(inked(&img), 64);
    }

    #[test]
    fn test_draw_image_zero_size_is_noop() {
        let mut c = canvas(10, 10);
        c.draw_image(&RasterImage::filled(2, 2, INK), Point::new(0.0, 0.0), (0, 4));
        assert_eq!(inked(&c.into_image()), 0);
    }
}
