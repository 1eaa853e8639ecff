use crate::annotation::domain::annotation_style::AnnotationStyle;
use crate::annotation::domain::canvas::Canvas;
use crate::annotation::domain::landmark_decorator::{LandmarkDecorator, LandmarkDecorators};
use crate::annotation::infrastructure::raster_canvas::RasterCanvas;
use crate::detection::domain::detected_face::{DetectedFace, LandmarkType};
use crate::shared::raster_image::RasterImage;

/// Burns face boxes, landmark markers and landmark type labels into images.
pub struct OverlayRenderer {
    style: AnnotationStyle,
    decorators: LandmarkDecorators,
}

impl OverlayRenderer {
    pub fn new(style: AnnotationStyle) -> Self {
        Self {
            style,
            decorators: LandmarkDecorators::new(),
        }
    }

    pub fn with_decorator(
        mut self,
        landmark_type: LandmarkType,
        decorator: Box<dyn LandmarkDecorator>,
    ) -> Self {
        self.decorators.insert(landmark_type, decorator);
        self
    }

    /// Returns an annotated copy of `source`; `source` itself is untouched.
    pub fn render(&self, source: &RasterImage, faces: &[DetectedFace]) -> RasterImage {
        let mut canvas = RasterCanvas::new(source.clone());
        self.annotate(&mut canvas, faces);
        canvas.into_image()
    }

    /// Draws every face, then its landmarks, in input order.
    pub fn annotate(&self, canvas: &mut dyn Canvas, faces: &[DetectedFace]) {
        let style = &self.style;
        for face in faces {
            canvas.draw_round_rect(
                &face.bounding_box,
                style.corner_radius,
                style.stroke_width,
                style.stroke_color,
            );

            for landmark in &face.landmarks {
                let position = landmark.position();
                canvas.draw_circle(position, style.circle_radius, style.stroke_color);
                canvas.draw_text(
                    &landmark.landmark_type.to_string(),
                    position,
                    style.text_size,
                    style.stroke_color,
                );
                if let Some(decorator) = self.decorators.get(landmark.landmark_type) {
                    decorator.decorate(canvas, face, landmark, style);
                }
            }
        }
    }
}

impl Default for OverlayRenderer {
    fn default() -> Self {
        Self::new(AnnotationStyle::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::annotation::domain::annotation_style::Color;
    use crate::detection::domain::detected_face::Landmark;
    use crate::shared::geometry::{BoundingBox, Point};
    use rstest::rstest;

    #[derive(Debug, Clone, PartialEq)]
    enum Op {
        RoundRect(BoundingBox),
        Circle(Point),
        Text(String, Point),
        Image(Point, (u32, u32)),
    }

    #[derive(Default)]
    struct RecordingCanvas {
        ops: Vec<Op>,
    }

    impl RecordingCanvas {
        fn count(&self, pred: fn(&Op) -> bool) -> usize {
            self.ops.iter().filter(|op| pred(op)).count()
        }
    }

    impl Canvas for RecordingCanvas {
        fn draw_round_rect(&mut self, rect: &BoundingBox, _r: f32, _w: f32, _c: Color) {
            self.ops.push(Op::RoundRect(*rect));
        }

        fn draw_circle(&mut self, center: Point, _radius: f32, _color: Color) {
            self.ops.push(Op::Circle(center));
        }

        fn draw_text(&mut self, text: &str, origin: Point, _size: f32, _color: Color) {
            self.ops.push(Op::Text(text.to_string(), origin));
        }

        fn draw_image(&mut self, _image: &RasterImage, top_left: Point, size: (u32, u32)) {
            self.ops.push(Op::Image(top_left, size));
        }
    }

    struct MarkerDecorator;

    impl LandmarkDecorator for MarkerDecorator {
        fn decorate(
            &self,
            canvas: &mut dyn Canvas,
            _face: &DetectedFace,
            landmark: &Landmark,
            _style: &AnnotationStyle,
        ) {
            canvas.draw_image(&RasterImage::filled(1, 1, [0, 0, 0]), landmark.position(), (2, 2));
        }
    }

    const TYPES: [LandmarkType; 4] = [
        LandmarkType::LEFT_EYE,
        LandmarkType::RIGHT_EYE,
        LandmarkType::NOSE_BASE,
        LandmarkType::BOTTOM_MOUTH,
    ];

    fn faces(n: usize, m: usize) -> Vec<DetectedFace> {
        (0..n)
            .map(|i| {
                let left = 10.0 + i as f32 * 60.0;
                let landmarks = (0..m)
                    .map(|j| Landmark::new(TYPES[j % TYPES.len()], left + 5.0 + j as f32, 20.0))
                    .collect();
                DetectedFace::new(BoundingBox::new(left, 10.0, 50.0, 50.0), landmarks)
            })
            .collect()
    }

    #[rstest]
    #[case(0, 0)]
    #[case(1, 0)]
    #[case(1, 1)]
    #[case(2, 3)]
    #[case(3, 4)]
    fn test_primitive_counts(#[case] n: usize, #[case] m: usize) {
        let mut canvas = RecordingCanvas::default();
        OverlayRenderer::default().annotate(&mut canvas, &faces(n, m));

        assert_eq!(canvas.count(|op| matches!(op, Op::RoundRect(_))), n);
        assert_eq!(canvas.count(|op| matches!(op, Op::Circle(_))), n * m);
        assert_eq!(canvas.count(|op| matches!(op, Op::Text(..))), n * m);
        assert_eq!(canvas.count(|op| matches!(op, Op::Image(..))), 0);
    }

    #[test]
    fn test_draw_order_follows_input_order() {
        let mut canvas = RecordingCanvas::default();
        let faces = faces(2, 1);
        OverlayRenderer::default().annotate(&mut canvas, &faces);

        let first = Point::new(15.0, 20.0);
        let second = Point::new(75.0, 20.0);
        assert_eq!(
            canvas.ops,
            vec![
                Op::RoundRect(faces[0].bounding_box),
                Op::Circle(first),
                Op::Text("4".into(), first),
                Op::RoundRect(faces[1].bounding_box),
                Op::Circle(second),
                Op::Text("4".into(), second),
            ]
        );
    }

    #[test]
    fn test_decorator_runs_only_for_its_type() {
        let renderer = OverlayRenderer::default()
            .with_decorator(LandmarkType::NOSE_BASE, Box::new(MarkerDecorator));
        let mut canvas = RecordingCanvas::default();
        renderer.annotate(&mut canvas, &faces(2, 4));

        let images: Vec<&Op> = canvas
            .ops
            .iter()
            .filter(|op| matches!(op, Op::Image(..)))
            .collect();
        assert_eq!(
            images,
            vec![
                &Op::Image(Point::new(17.0, 20.0), (2, 2)),
                &Op::Image(Point::new(77.0, 20.0), (2, 2)),
            ]
        );
    }

    #[test]
    fn test_decorator_follows_label() {
        let renderer = OverlayRenderer::default()
            .with_decorator(LandmarkType::LEFT_EYE, Box::new(MarkerDecorator));
        let mut canvas = RecordingCanvas::default();
        renderer.annotate(&mut canvas, &faces(1, 1));

        assert!(matches!(canvas.ops[2], Op::Text(..)));
        assert!(matches!(canvas.ops[3], Op::Image(..)));
    }

    #[test]
    fn test_render_does_not_mutate_source() {
        let source = RasterImage::filled(200, 100, [30, 60, 90]);
        let before = source.checksum();
        let out = OverlayRenderer::default().render(&source, &faces(2, 3));

        assert_eq!(source.checksum(), before);
        assert_ne!(out.checksum(), before);
        assert_eq!((out.width(), out.height()), (200, 100));
    }

    #[test]
    fn test_render_is_deterministic() {
        let source = RasterImage::filled(200, 100, [30, 60, 90]);
        let renderer = OverlayRenderer::default();
        let a = renderer.render(&source, &faces(2, 3));
        let b = renderer.render(&source, &faces(2, 3));
        assert_eq!(a, b);
    }

    #[test]
    fn test_render_without_faces_is_identity() {
        let source = RasterImage::filled(64, 48, [1, 2, 3]);
        let out = OverlayRenderer::default().render(&source, &[]);
        assert_eq!(out, source);
    }
}
