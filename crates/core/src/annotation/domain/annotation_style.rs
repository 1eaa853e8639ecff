pub type Color = [u8; 3];

pub const CYAN: Color = [0, 255, 255];

pub const STROKE_WIDTH: f32 = 5.0;
pub const CORNER_RADIUS: f32 = 2.0;
pub const CIRCLE_RADIUS: f32 = 10.0;
pub const TEXT_SIZE: f32 = 50.0;

/// How faces and landmarks are drawn. Fixed for the life of the program.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct AnnotationStyle {
    pub stroke_width: f32,
    pub stroke_color: Color,
    pub corner_radius: f32,
    pub circle_radius: f32,
    pub text_size: f32,
}

impl Default for AnnotationStyle {
    fn default() -> Self {
        Self {
            stroke_width: STROKE_WIDTH,
            stroke_color: CYAN,
            corner_radius: CORNER_RADIUS,
            circle_radius: CIRCLE_RADIUS,
            text_size: TEXT_SIZE,
        }
    }
}
