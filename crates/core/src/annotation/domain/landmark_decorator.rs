//! Extra drawing keyed by landmark type.
//!
//! The render loop looks up each landmark's type here after drawing the
//! marker and label, so new decorations never touch the loop itself.

use std::collections::BTreeMap;

use crate::annotation::domain::annotation_style::AnnotationStyle;
use crate::annotation::domain::canvas::Canvas;
use crate::detection::domain::detected_face::{DetectedFace, Landmark, LandmarkType};

pub trait LandmarkDecorator: Send + Sync {
    fn decorate(
        &self,
        canvas: &mut dyn Canvas,
        face: &DetectedFace,
        landmark: &Landmark,
        style: &AnnotationStyle,
    );
}

#[derive(Default)]
pub struct LandmarkDecorators {
    by_type: BTreeMap<LandmarkType, Box<dyn LandmarkDecorator>>,
}

impl LandmarkDecorators {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `decorator` for `landmark_type`, replacing any previous one.
    pub fn insert(&mut self, landmark_type: LandmarkType, decorator: Box<dyn LandmarkDecorator>) {
        self.by_type.insert(landmark_type, decorator);
    }

    pub fn get(&self, landmark_type: LandmarkType) -> Option<&dyn LandmarkDecorator> {
        self.by_type.get(&landmark_type).map(|d| d.as_ref())
    }
}
