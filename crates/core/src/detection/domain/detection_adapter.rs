use crate::detection::domain::detected_face::DetectedFace;
use crate::detection::domain::face_detector::FaceDetector;
use crate::error::AnnotateError;
use crate::shared::raster_image::RasterImage;

/// Narrow wrapper around a [`FaceDetector`] that scopes its resources to a
/// single run.
pub struct DetectionAdapter {
    detector: Box<dyn FaceDetector>,
}

impl DetectionAdapter {
    pub fn new(detector: Box<dyn FaceDetector>) -> Self {
        Self { detector }
    }

    /// Starts a detection scope. The detector is released when the lease
    /// drops, whether or not it turned out to be ready.
    pub fn acquire(&mut self) -> DetectorLease<'_> {
        DetectorLease {
            detector: &mut self.detector,
        }
    }
}

/// Borrowed access to the detector for one run.
pub struct DetectorLease<'a> {
    detector: &'a mut Box<dyn FaceDetector>,
}

impl DetectorLease<'_> {
    pub fn is_ready(&mut self) -> bool {
        self.detector.is_operational()
    }

    /// Only call after `is_ready` returned true.
    pub fn detect(&mut self, image: &RasterImage) -> Result<Vec<DetectedFace>, AnnotateError> {
        self.detector
            .detect(image)
            .map_err(|e| AnnotateError::Detection(e.to_string()))
    }
}

impl Drop for DetectorLease<'_> {
    fn drop(&mut self) {
        self.detector.release();
        log::trace!("Face detector released");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::detection::domain::face_detector::DetectorError;
    use crate::shared::geometry::BoundingBox;
    use std::sync::{Arc, Mutex};

    #[derive(Default)]
    struct Calls {
        operational: usize,
        detect: usize,
        release: usize,
    }

    struct SpyDetector {
        ready: bool,
        fail: bool,
        calls: Arc<Mutex<Calls>>,
    }

    impl FaceDetector for SpyDetector {
        fn is_operational(&mut self) -> bool {
            self.calls.lock().unwrap().operational += 1;
            self.ready
        }

        fn detect(&mut self, _image: &RasterImage) -> Result<Vec<DetectedFace>, DetectorError> {
            self.calls.lock().unwrap().detect += 1;
            if self.fail {
                return Err("inference crashed".into());
            }
            Ok(vec![DetectedFace::new(
                BoundingBox::new(1.0, 2.0, 3.0, 4.0),
                vec![],
            )])
        }

        fn release(&mut self) {
            self.calls.lock().unwrap().release += 1;
        }
    }

    fn adapter(ready: bool, fail: bool) -> (DetectionAdapter, Arc<Mutex<Calls>>) {
        let calls = Arc::new(Mutex::new(Calls::default()));
        let detector = SpyDetector {
            ready,
            fail,
            calls: calls.clone(),
        };
        (DetectionAdapter::new(Box::new(detector)), calls)
    }

    #[test]
    fn test_detect_returns_faces_and_releases() {
        let (mut adapter, calls) = adapter(true, false);
        let image = RasterImage::filled(8, 8, [0, 0, 0]);
        {
            let mut lease = adapter.acquire();
            assert!(lease.is_ready());
            let faces = lease.detect(&image).unwrap();
            assert_eq!(faces.len(), 1);
            assert_eq!(calls.lock().unwrap().release, 0);
        }
        let calls = calls.lock().unwrap();
        assert_eq!(calls.detect, 1);
        assert_eq!(calls.release, 1);
    }

    #[test]
    fn test_not_ready_still_releases() {
        let (mut adapter, calls) = adapter(false, false);
        {
            let mut lease = adapter.acquire();
            assert!(!lease.is_ready());
        }
        let calls = calls.lock().unwrap();
        assert_eq!(calls.detect, 0);
        assert_eq!(calls.release, 1);
    }

    #[test]
    fn test_detection_error_is_mapped_and_released() {
        let (mut adapter, calls) = adapter(true, true);
        let image = RasterImage::filled(8, 8, [0, 0, 0]);
        let mut lease = adapter.acquire();
        assert!(lease.is_ready());
        let result = lease.detect(&image);
        drop(lease);

        match result {
            Err(AnnotateError::Detection(msg)) => assert_eq!(msg, "inference crashed"),
            other => panic!("unexpected result: {other:?}"),
        }
        assert_eq!(calls.lock().unwrap().release, 1);
    }

    #[test]
    fn test_each_lease_rechecks_readiness() {
        let (mut adapter, calls) = adapter(true, false);
        for _ in 0..3 {
            let mut lease = adapter.acquire();
            lease.is_ready();
        }
        let calls = calls.lock().unwrap();
        assert_eq!(calls.operational, 3);
        assert_eq!(calls.release, 3);
    }
}
