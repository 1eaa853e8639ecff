pub mod fixed_face_detector;
pub mod math;
pub mod model_resolver;
pub mod onnx_landmark_detector;
