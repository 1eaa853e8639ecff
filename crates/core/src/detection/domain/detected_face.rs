//! Faces and typed landmarks as reported by a detector.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::shared::geometry::{BoundingBox, Point};

/// Numeric landmark kind, using the classic mobile-vision numbering.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LandmarkType(pub u8);

impl LandmarkType {
    pub const BOTTOM_MOUTH: Self = Self(0);
    pub const LEFT_CHEEK: Self = Self(1);
    pub const LEFT_EAR_TIP: Self = Self(2);
    pub const LEFT_EAR: Self = Self(3);
    pub const LEFT_EYE: Self = Self(4);
    pub const LEFT_MOUTH: Self = Self(5);
    pub const NOSE_BASE: Self = Self(6);
    pub const RIGHT_CHEEK: Self = Self(7);
    pub const RIGHT_EAR_TIP: Self = Self(8);
    pub const RIGHT_EAR: Self = Self(9);
    pub const RIGHT_EYE: Self = Self(10);
    pub const RIGHT_MOUTH: Self = Self(11);

    pub fn code(self) -> u8 {
        self.0
    }
}

impl fmt::Display for LandmarkType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Landmark {
    #[serde(rename = "type")]
    pub landmark_type: LandmarkType,
    pub x: f32,
    pub y: f32,
}

impl Landmark {
    pub fn new(landmark_type: LandmarkType, x: f32, y: f32) -> Self {
        Self { landmark_type, x, y }
    }

    pub fn position(&self) -> Point {
        Point::new(self.x, self.y)
    }
}

/// One detected face. Positions are trusted to lie within the image.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DetectedFace {
    #[serde(rename = "box")]
    pub bounding_box: BoundingBox,
    #[serde(default)]
    pub landmarks: Vec<Landmark>,
}

impl DetectedFace {
    pub fn new(bounding_box: BoundingBox, landmarks: Vec<Landmark>) -> Self {
        Self {
            bounding_box,
            landmarks,
        }
    }

    pub fn landmark(&self, landmark_type: LandmarkType) -> Option<&Landmark> {
        self.landmarks
            .iter()
            .find(|l| l.landmark_type == landmark_type)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn face() -> DetectedFace {
        DetectedFace::new(
            BoundingBox::new(10.0, 10.0, 50.0, 50.0),
            vec![
                Landmark::new(LandmarkType::LEFT_EYE, 20.0, 20.0),
                Landmark::new(LandmarkType::NOSE_BASE, 35.0, 40.0),
            ],
        )
    }

    #[test]
    fn test_landmark_type_displays_code() {
        assert_eq!(LandmarkType::LEFT_EYE.to_string(), "4");
        assert_eq!(LandmarkType::RIGHT_MOUTH.to_string(), "11");
    }

    #[test]
    fn test_landmark_lookup_by_type() {
        let f = face();
        assert_eq!(f.landmark(LandmarkType::NOSE_BASE).unwrap().x, 35.0);
        assert!(f.landmark(LandmarkType::RIGHT_EYE).is_none());
    }

    #[test]
    fn test_json_shape() {
        let json = r#"{"box":{"left":10,"top":10,"width":50,"height":50},
                       "landmarks":[{"type":4,"x":20,"y":20}]}"#;
        let parsed: DetectedFace = serde_json::from_str(json).unwrap();
        assert_eq!(parsed.bounding_box, BoundingBox::new(10.0, 10.0, 50.0, 50.0));
        assert_eq!(
            parsed.landmarks,
            vec![Landmark::new(LandmarkType::LEFT_EYE, 20.0, 20.0)]
        );
    }

    #[test]
    fn test_json_landmarks_default_to_empty() {
        let json = r#"{"box":{"left":0,"top":0,"width":5,"height":5}}"#;
        let parsed: DetectedFace = serde_json::from_str(json).unwrap();
        assert!(parsed.landmarks.is_empty());
    }
}
