use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use face_annotate_core::detection::infrastructure::onnx_landmark_detector::{
    LandmarkMode, OnnxDetectorOptions, DEFAULT_CONFIDENCE, DEFAULT_MIN_FACE_SIZE,
};
use face_annotate_core::shared::constants::APP_DIR_NAME;

/// Detector options the user can change from the window. Persisted as JSON.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub confidence: f64,
    pub min_face_size: f64,
    pub landmarks: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            confidence: DEFAULT_CONFIDENCE,
            min_face_size: DEFAULT_MIN_FACE_SIZE,
            landmarks: true,
        }
    }
}

impl Settings {
    fn config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|d| d.join(APP_DIR_NAME).join("settings.json"))
    }

    pub fn load() -> Self {
        Self::config_path()
            .map(|path| Self::load_from(&path))
            .unwrap_or_default()
    }

    pub fn save(&self) {
        if let Some(path) = Self::config_path() {
            self.save_to(&path);
        }
    }

    /// Missing or malformed files fall back to defaults.
    pub fn load_from(path: &Path) -> Self {
        fs::read_to_string(path)
            .ok()
            .and_then(|json| serde_json::from_str(&json).ok())
            .map(Self::clamped)
            .unwrap_or_default()
    }

    pub fn save_to(&self, path: &Path) {
        if let Some(parent) = path.parent() {
            let _ = fs::create_dir_all(parent);
        }
        match serde_json::to_string_pretty(self) {
            Ok(json) => {
                if let Err(e) = fs::write(path, json) {
                    log::warn!("Could not save settings to {}: {e}", path.display());
                }
            }
            Err(e) => log::warn!("Could not serialize settings: {e}"),
        }
    }

    pub fn detector_options(&self) -> OnnxDetectorOptions {
        OnnxDetectorOptions {
            confidence: self.confidence,
            min_face_size: self.min_face_size,
            landmarks: if self.landmarks {
                LandmarkMode::All
            } else {
                LandmarkMode::None
            },
            ..OnnxDetectorOptions::default()
        }
    }

    fn clamped(mut self) -> Self {
        self.confidence = self.confidence.clamp(0.0, 1.0);
        self.min_face_size = self.min_face_size.clamp(0.0, 1.0);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_trips_through_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("settings.json");
        let settings = Settings {
            confidence: 0.6,
            min_face_size: 0.1,
            landmarks: false,
        };
        settings.save_to(&path);
        assert_eq!(Settings::load_from(&path), settings);
    }

    #[test]
    fn test_missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        assert_eq!(
            Settings::load_from(&dir.path().join("absent.json")),
            Settings::default()
        );
    }

    #[test]
    fn test_partial_file_fills_in_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        fs::write(&path, r#"{"landmarks": false}"#).unwrap();

        let settings = Settings::load_from(&path);
        assert!(!settings.landmarks);
        assert_eq!(settings.confidence, DEFAULT_CONFIDENCE);
    }

    #[test]
    fn test_out_of_range_values_are_clamped() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        fs::write(&path, r#"{"confidence": 3.0, "min_face_size": -1.0}"#).unwrap();

        let settings = Settings::load_from(&path);
        assert_eq!(settings.confidence, 1.0);
        assert_eq!(settings.min_face_size, 0.0);
    }

    #[test]
    fn test_detector_options_follow_landmark_toggle() {
        let settings = Settings {
            landmarks: false,
            ..Settings::default()
        };
        assert_eq!(settings.detector_options().landmarks, LandmarkMode::None);
        assert_eq!(
            Settings::default().detector_options().landmarks,
            LandmarkMode::All
        );
    }
}
