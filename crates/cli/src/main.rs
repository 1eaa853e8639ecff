use std::path::PathBuf;
use std::process;
use std::sync::Arc;

use clap::Parser;

use face_annotate_core::annotation::infrastructure::centered_image_decorator::CenteredImageDecorator;
use face_annotate_core::annotation::overlay_renderer::OverlayRenderer;
use face_annotate_core::detection::domain::detected_face::LandmarkType;
use face_annotate_core::detection::domain::detection_adapter::DetectionAdapter;
use face_annotate_core::detection::domain::face_detector::FaceDetector;
use face_annotate_core::detection::infrastructure::fixed_face_detector::FixedFaceDetector;
use face_annotate_core::detection::infrastructure::onnx_landmark_detector::{
    LandmarkMode, OnnxDetectorOptions, OnnxLandmarkDetector, DEFAULT_CONFIDENCE,
    DEFAULT_MIN_FACE_SIZE,
};
use face_annotate_core::imaging::domain::image_source::ImageSource;
use face_annotate_core::imaging::infrastructure::bundled_image_source::BundledImageSource;
use face_annotate_core::pipeline::annotation_pipeline::{AnnotationPipeline, ImageRequest};
use face_annotate_core::pipeline::infrastructure::file_display_surface::FileDisplaySurface;
use face_annotate_core::pipeline::pipeline_logger::{
    NullPipelineLogger, PipelineLogger, StdoutPipelineLogger,
};
use face_annotate_core::shared::constants::IMAGE_EXTENSIONS;

/// Draw face boxes and landmark markers onto an image.
#[derive(Parser, Debug)]
#[command(name = "face-annotate")]
struct Cli {
    /// Input image. The bundled sample portrait is used when omitted.
    input: Option<PathBuf>,

    /// Where to write the annotated image (PNG or JPEG by extension).
    #[arg(short, long)]
    output: PathBuf,

    /// Face detection confidence threshold (0.0-1.0).
    #[arg(long, default_value_t = DEFAULT_CONFIDENCE)]
    confidence: f64,

    /// Smallest face to report, as a fraction of the image width (0.0-1.0).
    #[arg(long, default_value_t = DEFAULT_MIN_FACE_SIZE)]
    min_face_size: f64,

    /// Detect faces only, without landmarks.
    #[arg(long)]
    no_landmarks: bool,

    /// Use this ONNX model instead of the cached or downloaded one.
    #[arg(long)]
    model: Option<PathBuf>,

    /// Replay detections from a JSON file instead of running the model.
    #[arg(long, conflicts_with = "model")]
    detections: Option<PathBuf>,

    /// Image to paste over every left eye.
    #[arg(long)]
    eye_patch: Option<PathBuf>,

    /// Print the detected faces as JSON on stdout.
    #[arg(long)]
    print_json: bool,

    /// Print a per-stage timing summary.
    #[arg(long)]
    timings: bool,
}

fn main() {
    env_logger::init();

    if let Err(e) = run() {
        eprintln!("Error: {e}");
        process::exit(1);
    }
}

fn run() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    validate(&cli)?;

    let detector = build_detector(&cli)?;
    let renderer = build_renderer(&cli)?;
    let logger: Box<dyn PipelineLogger> = if cli.timings {
        Box::new(StdoutPipelineLogger::new())
    } else {
        Box::new(NullPipelineLogger)
    };

    let mut pipeline = AnnotationPipeline::new(
        Box::new(BundledImageSource::new()),
        DetectionAdapter::new(detector),
        renderer,
    )
    .with_logger(logger);

    let request = match cli.input {
        Some(path) => ImageRequest::Path(path),
        None => ImageRequest::Default,
    };
    let mut surface = FileDisplaySurface::new(&cli.output);
    let summary = pipeline.run(request, &mut surface)?;
    if let Some(e) = surface.take_error() {
        return Err(e.into());
    }

    if cli.print_json {
        println!("{}", serde_json::to_string_pretty(&summary.faces)?);
    }
    pipeline.logger().summary();
    log::info!(
        "{} face(s) annotated, output written to {}",
        summary.face_count,
        cli.output.display()
    );
    Ok(())
}

fn build_detector(cli: &Cli) -> Result<Box<dyn FaceDetector>, Box<dyn std::error::Error>> {
    if let Some(path) = &cli.detections {
        return Ok(Box::new(FixedFaceDetector::from_json_file(path)?));
    }

    let options = OnnxDetectorOptions {
        confidence: cli.confidence,
        min_face_size: cli.min_face_size,
        landmarks: if cli.no_landmarks {
            LandmarkMode::None
        } else {
            LandmarkMode::All
        },
        model_path: cli.model.clone(),
        download_progress: Some(Arc::new(download_progress)),
    };
    Ok(Box::new(OnnxLandmarkDetector::new(options)))
}

fn build_renderer(cli: &Cli) -> Result<OverlayRenderer, Box<dyn std::error::Error>> {
    let renderer = OverlayRenderer::default();
    match &cli.eye_patch {
        Some(path) => {
            let patch = BundledImageSource::new().load_from_path(path)?;
            Ok(renderer.with_decorator(
                LandmarkType::LEFT_EYE,
                Box::new(CenteredImageDecorator::new(patch)),
            ))
        }
        None => Ok(renderer),
    }
}

fn validate(cli: &Cli) -> Result<(), Box<dyn std::error::Error>> {
    if let Some(input) = &cli.input {
        if !input.exists() {
            return Err(format!("Input file not found: {}", input.display()).into());
        }
    }
    if !(0.0..=1.0).contains(&cli.confidence) {
        return Err(format!(
            "Confidence must be between 0.0 and 1.0, got {}",
            cli.confidence
        )
        .into());
    }
    if !(0.0..=1.0).contains(&cli.min_face_size) {
        return Err(format!(
            "Minimum face size must be between 0.0 and 1.0, got {}",
            cli.min_face_size
        )
        .into());
    }
    if !has_image_extension(&cli.output) {
        return Err(format!(
            "Output must end in one of: {}",
            IMAGE_EXTENSIONS.join(", ")
        )
        .into());
    }
    for (flag, path) in [
        ("--model", &cli.model),
        ("--detections", &cli.detections),
        ("--eye-patch", &cli.eye_patch),
    ] {
        if let Some(path) = path {
            if !path.exists() {
                return Err(format!("{flag} file not found: {}", path.display()).into());
            }
        }
    }
    Ok(())
}

fn has_image_extension(path: &std::path::Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| IMAGE_EXTENSIONS.contains(&ext.to_lowercase().as_str()))
        .unwrap_or(false)
}

fn download_progress(downloaded: u64, total: u64) {
    if total > 0 {
        let pct = (downloaded as f64 / total as f64 * 100.0) as u32;
        eprint!("\rDownloading face detection model... {pct}%");
        if downloaded >= total {
            eprintln!();
        }
    } else {
        eprint!("\rDownloading face detection model... {downloaded} bytes");
    }
}
