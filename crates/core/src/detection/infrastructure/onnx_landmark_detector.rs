/// Face and landmark detector running a YOLO face-pose model through `ort`.
///
/// The session is opened lazily by `is_operational` and dropped by `release`,
/// so each annotation run pays for its own model load.
use std::path::PathBuf;
use std::sync::Arc;

use crate::detection::domain::detected_face::{DetectedFace, Landmark, LandmarkType};
use crate::detection::domain::face_detector::{DetectorError, FaceDetector};
use crate::shared::constants::{FACE_MODEL_NAME, FACE_MODEL_URL};
use crate::shared::geometry::BoundingBox;
use crate::shared::raster_image::RasterImage;

use super::math::nms;
use super::model_resolver;

/// Fallback model input resolution when the model doesn't specify dimensions.
const DEFAULT_INPUT_SIZE: u32 = 640;

pub const DEFAULT_CONFIDENCE: f64 = 0.25;

/// Smallest face kept, as a fraction of image width.
pub const DEFAULT_MIN_FACE_SIZE: f64 = 0.01;

const NMS_IOU_THRESH: f64 = 0.45;

/// 5 keypoints × (x, y, conf).
const NUM_KEYPOINT_VALUES: usize = 15;

const KEYPOINT_CONF_THRESH: f64 = 0.5;

/// Landmark type for each model keypoint, in output order.
///
/// The model orders keypoints by image position (viewer's left first), while
/// landmark types name the subject's side, so left and right swap.
const KEYPOINT_TYPES: [LandmarkType; 5] = [
    LandmarkType::RIGHT_EYE,
    LandmarkType::LEFT_EYE,
    LandmarkType::NOSE_BASE,
    LandmarkType::RIGHT_MOUTH,
    LandmarkType::LEFT_MOUTH,
];

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LandmarkMode {
    All,
    None,
}

pub type DownloadProgress = Arc<dyn Fn(u64, u64) + Send + Sync>;

#[derive(Clone)]
pub struct OnnxDetectorOptions {
    pub confidence: f64,
    pub min_face_size: f64,
    pub landmarks: LandmarkMode,
    /// Explicit model file; resolved from cache or downloaded when unset.
    pub model_path: Option<PathBuf>,
    pub download_progress: Option<DownloadProgress>,
}

impl Default for OnnxDetectorOptions {
    fn default() -> Self {
        Self {
            confidence: DEFAULT_CONFIDENCE,
            min_face_size: DEFAULT_MIN_FACE_SIZE,
            landmarks: LandmarkMode::All,
            model_path: None,
            download_progress: None,
        }
    }
}

pub struct OnnxLandmarkDetector {
    options: OnnxDetectorOptions,
    session: Option<ort::session::Session>,
    input_size: u32,
}

impl OnnxLandmarkDetector {
    pub fn new(options: OnnxDetectorOptions) -> Self {
        Self {
            options,
            session: None,
            input_size: DEFAULT_INPUT_SIZE,
        }
    }

    fn open_session(&mut self) -> Result<(), Box<dyn std::error::Error>> {
        let model_path = match &self.options.model_path {
            Some(path) => path.clone(),
            None => {
                let progress = self.options.download_progress.clone().map(|cb| {
                    Box::new(move |done: u64, total: u64| cb(done, total))
                        as model_resolver::ProgressFn
                });
                model_resolver::resolve(FACE_MODEL_NAME, FACE_MODEL_URL, None, progress)?
            }
        };

        let session = ort::session::Session::builder()?
            .with_execution_providers(preferred_execution_providers())?
            .commit_from_file(&model_path)?;

        // NCHW: [1, 3, H, W]
        self.input_size = session
            .inputs()
            .first()
            .and_then(|input| {
                if let ort::value::ValueType::Tensor { ref shape, .. } = input.dtype() {
                    if shape.len() >= 4 && shape[2] > 0 {
                        Some(shape[2] as u32)
                    } else {
                        None
                    }
                } else {
                    None
                }
            })
            .unwrap_or(DEFAULT_INPUT_SIZE);
        self.session = Some(session);
        log::debug!(
            "Opened face model {} (input {}px)",
            model_path.display(),
            self.input_size
        );
        Ok(())
    }
}

impl FaceDetector for OnnxLandmarkDetector {
    fn is_operational(&mut self) -> bool {
        if self.session.is_some() {
            return true;
        }
        match self.open_session() {
            Ok(()) => true,
            Err(e) => {
                log::warn!("Face detector could not be initialised: {e}");
                false
            }
        }
    }

    fn detect(&mut self, image: &RasterImage) -> Result<Vec<DetectedFace>, DetectorError> {
        let input_size = self.input_size;
        let session = self
            .session
            .as_mut()
            .ok_or("face detector used before initialisation")?;

        let (input_tensor, letterbox) = letterbox(image, input_size);
        let input_value = ort::value::Tensor::from_array(input_tensor)?;
        let outputs = session.run(ort::inputs![input_value])?;
        if outputs.len() == 0 {
            return Err("face model produced no outputs".into());
        }
        let tensor = outputs[0].try_extract_array::<f32>()?;
        let shape = tensor.shape().to_vec();
        let data = tensor.as_slice().ok_or("cannot get tensor slice")?;

        parse_output(data, &shape, &letterbox, &self.options, image)
    }

    fn release(&mut self) {
        self.session = None;
    }
}

/// Platform accelerator, if any; ONNX Runtime falls back to CPU on its own.
fn preferred_execution_providers() -> Vec<ort::execution_providers::ExecutionProviderDispatch> {
    #[cfg(target_os = "macos")]
    {
        vec![ort::execution_providers::CoreMLExecutionProvider::default().build()]
    }
    #[cfg(target_os = "windows")]
    {
        vec![ort::execution_providers::DirectMLExecutionProvider::default().build()]
    }
    #[cfg(not(any(target_os = "macos", target_os = "windows")))]
    {
        vec![]
    }
}

// ---------------------------------------------------------------------------
// Preprocessing
// ---------------------------------------------------------------------------

/// Mapping from letterboxed model coordinates back to image pixels.
#[derive(Clone, Copy, Debug, PartialEq)]
struct Letterbox {
    scale: f64,
    pad_x: u32,
    pad_y: u32,
}

impl Letterbox {
    fn to_image(self, x: f64, y: f64) -> (f64, f64) {
        (
            (x - self.pad_x as f64) / self.scale,
            (y - self.pad_y as f64) / self.scale,
        )
    }
}

/// Letterbox-resize to `target_size` × `target_size` as an NCHW float tensor.
fn letterbox(image: &RasterImage, target_size: u32) -> (ndarray::Array4<f32>, Letterbox) {
    let fw = image.width() as f64;
    let fh = image.height() as f64;
    let target = target_size as f64;

    let scale = (target / fw).min(target / fh);
    let new_w = (fw * scale).round() as u32;
    let new_h = (fh * scale).round() as u32;
    let pad_x = (target_size - new_w) / 2;
    let pad_y = (target_size - new_h) / 2;

    // 114/255 gray padding, YOLO convention
    let gray = 114.0f32 / 255.0;
    let mut tensor =
        ndarray::Array4::<f32>::from_elem((1, 3, target_size as usize, target_size as usize), gray);

    let src = image.as_ndarray();
    let src_h = image.height() as usize;
    let src_w = image.width() as usize;

    for y in 0..new_h as usize {
        let src_y = ((y as f64 / scale) as usize).min(src_h - 1);
        for x in 0..new_w as usize {
            let src_x = ((x as f64 / scale) as usize).min(src_w - 1);
            let ty = pad_y as usize + y;
            let tx = pad_x as usize + x;
            for c in 0..3 {
                tensor[[0, c, ty, tx]] = src[[src_y, src_x, c]] as f32 / 255.0;
            }
        }
    }

    (
        tensor,
        Letterbox {
            scale,
            pad_x,
            pad_y,
        },
    )
}

// ---------------------------------------------------------------------------
// Postprocessing
// ---------------------------------------------------------------------------

struct Candidate {
    corners: [f64; 4],
    confidence: f64,
    landmarks: Vec<Landmark>,
}

/// Turns raw model output into faces in image coordinates.
///
/// Accepts both `[1, features, detections]` and `[1, detections, features]`.
fn parse_output(
    data: &[f32],
    shape: &[usize],
    letterbox: &Letterbox,
    options: &OnnxDetectorOptions,
    image: &RasterImage,
) -> Result<Vec<DetectedFace>, DetectorError> {
    if shape.len() != 3 {
        return Err(format!("unexpected face model output shape: {shape:?}").into());
    }
    let transposed = shape[1] < shape[2];
    let (num_dets, num_feats) = if transposed {
        (shape[2], shape[1])
    } else {
        (shape[1], shape[2])
    };
    if data.len() < num_dets * num_feats {
        return Err("face model output is shorter than its shape".into());
    }

    let max_x = image.width().saturating_sub(1) as f32;
    let max_y = image.height().saturating_sub(1) as f32;
    let min_width = options.min_face_size * image.width() as f64;

    let mut candidates = Vec::new();
    for i in 0..num_dets {
        let value = |f: usize| -> f64 {
            if transposed {
                data[f * num_dets + i] as f64
            } else {
                data[i * num_feats + f] as f64
            }
        };

        // [cx, cy, w, h, conf, kp0_x, kp0_y, kp0_conf, ...]
        if num_feats < 5 {
            continue;
        }
        let confidence = value(4);
        if confidence < options.confidence {
            continue;
        }

        let (cx, cy, w, h) = (value(0), value(1), value(2), value(3));
        let (x1, y1) = letterbox.to_image(cx - w / 2.0, cy - h / 2.0);
        let (x2, y2) = letterbox.to_image(cx + w / 2.0, cy + h / 2.0);
        if x2 - x1 < min_width {
            continue;
        }

        let mut landmarks = Vec::new();
        if options.landmarks == LandmarkMode::All && num_feats >= 5 + NUM_KEYPOINT_VALUES {
            for (k, landmark_type) in KEYPOINT_TYPES.iter().enumerate() {
                let base = 5 + k * 3;
                if value(base + 2) < KEYPOINT_CONF_THRESH {
                    continue;
                }
                let (kx, ky) = letterbox.to_image(value(base), value(base + 1));
                landmarks.push(Landmark::new(
                    *landmark_type,
                    (kx as f32).clamp(0.0, max_x),
                    (ky as f32).clamp(0.0, max_y),
                ));
            }
        }

        candidates.push(Candidate {
            corners: [x1, y1, x2, y2],
            confidence,
            landmarks,
        });
    }

    let scored: Vec<([f64; 4], f64)> = candidates
        .iter()
        .map(|c| (c.corners, c.confidence))
        .collect();
    let faces = nms(&scored, NMS_IOU_THRESH)
        .into_iter()
        .map(|i| {
            let c = &candidates[i];
            DetectedFace::new(
                BoundingBox::from_corners(
                    c.corners[0] as f32,
                    c.corners[1] as f32,
                    c.corners[2] as f32,
                    c.corners[3] as f32,
                ),
                c.landmarks.clone(),
            )
        })
        .collect();
    Ok(faces)
}
