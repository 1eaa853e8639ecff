use crate::annotation::domain::annotation_style::AnnotationStyle;
use crate::annotation::domain::canvas::Canvas;
use crate::annotation::domain::landmark_decorator::LandmarkDecorator;
use crate::detection::domain::detected_face::{DetectedFace, Landmark};
use crate::shared::geometry::Point;
use crate::shared::raster_image::RasterImage;

/// Fraction of the face width the overlay spans by default.
pub const DEFAULT_OVERLAY_SCALE: f32 = 0.3;

/// Pastes an image centered on the landmark, sized relative to the face.
pub struct CenteredImageDecorator {
    overlay: RasterImage,
    scale: f32,
}

impl CenteredImageDecorator {
    pub fn new(overlay: RasterImage) -> Self {
        Self::with_scale(overlay, DEFAULT_OVERLAY_SCALE)
    }

    pub fn with_scale(overlay: RasterImage, scale: f32) -> Self {
        Self { overlay, scale }
    }

    /// Overlay size for a face of the given width; aspect ratio is kept.
    fn target_size(&self, face_width: f32) -> Option<(u32, u32)> {
        if self.overlay.width() == 0 || self.overlay.height() == 0 {
            return None;
        }
        let width = (face_width.abs() * self.scale).round();
        let height =
            (width * self.overlay.height() as f32 / self.overlay.width() as f32).round();
        (width >= 1.0 && height >= 1.0).then_some((width as u32, height as u32))
    }
}

impl LandmarkDecorator for CenteredImageDecorator {
    fn decorate(
        &self,
        canvas: &mut dyn Canvas,
        face: &DetectedFace,
        landmark: &Landmark,
        _style: &AnnotationStyle,
    ) {
        let Some((w, h)) = self.target_size(face.bounding_box.width) else {
            log::trace!("Overlay too small for face, skipping");
            return;
        };
        let top_left = Point::new(landmark.x - w as f32 / 2.0, landmark.y - h as f32 / 2.0);
        canvas.draw_image(&self.overlay, top_left, (w, h));
    }
}
