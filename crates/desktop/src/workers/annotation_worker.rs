use std::sync::Arc;
use std::thread;

use iced::futures::channel::mpsc;

use face_annotate_core::annotation::overlay_renderer::OverlayRenderer;
use face_annotate_core::detection::domain::detection_adapter::DetectionAdapter;
use face_annotate_core::detection::infrastructure::onnx_landmark_detector::{
    DownloadProgress, OnnxDetectorOptions, OnnxLandmarkDetector,
};
use face_annotate_core::imaging::infrastructure::bundled_image_source::BundledImageSource;
use face_annotate_core::pipeline::annotation_pipeline::{
    AnnotationPipeline, ImageRequest, PickerOutcome, RunSummary,
};
use face_annotate_core::pipeline::display_surface::DisplaySurface;
use face_annotate_core::shared::raster_image::RasterImage;

use crate::settings::Settings;

/// Messages sent from the worker thread to the UI.
#[derive(Debug, Clone)]
pub enum WorkerMessage {
    DownloadProgress(u64, u64),
    Finished(RunReport),
}

#[derive(Debug, Clone)]
pub enum RunInput {
    Default,
    Picked(PickerOutcome),
}

/// Everything one run produced, handed back to the UI thread.
#[derive(Debug, Clone)]
pub struct RunReport {
    /// Annotated image to show; `None` keeps the current one.
    pub image: Option<RasterImage>,
    pub notice: Option<String>,
    /// `Ok(None)` when the run was skipped (cancelled pick).
    pub outcome: Result<Option<RunSummary>, String>,
}

/// Collects what the pipeline presents so it can cross back to the UI.
#[derive(Default)]
struct WindowSurface {
    image: Option<RasterImage>,
    notice: Option<String>,
}

impl DisplaySurface for WindowSurface {
    fn present(&mut self, image: RasterImage) {
        self.image = Some(image);
    }

    fn show_notice(&mut self, message: &str) {
        self.notice = Some(message.to_string());
    }
}

/// Spawns one annotation on a background thread.
///
/// Detection and model download block, so they stay off the UI executor.
/// The stream yields download progress, then exactly one `Finished`, then ends.
pub fn spawn(input: RunInput, settings: Settings) -> mpsc::UnboundedReceiver<WorkerMessage> {
    let (tx, rx) = mpsc::unbounded();
    thread::spawn(move || {
        let report = run_blocking(input, &settings, Some(progress_forwarder(tx.clone())));
        let _ = tx.unbounded_send(WorkerMessage::Finished(report));
    });
    rx
}

fn progress_forwarder(tx: mpsc::UnboundedSender<WorkerMessage>) -> DownloadProgress {
    Arc::new(move |downloaded, total| {
        let _ = tx.unbounded_send(WorkerMessage::DownloadProgress(downloaded, total));
    })
}

fn run_blocking(
    input: RunInput,
    settings: &Settings,
    download_progress: Option<DownloadProgress>,
) -> RunReport {
    let detector = OnnxLandmarkDetector::new(OnnxDetectorOptions {
        download_progress,
        ..settings.detector_options()
    });
    let mut pipeline = AnnotationPipeline::new(
        Box::new(BundledImageSource::new()),
        DetectionAdapter::new(Box::new(detector)),
        OverlayRenderer::default(),
    );
    let mut surface = WindowSurface::default();

    let outcome = match input {
        RunInput::Default => pipeline.run(ImageRequest::Default, &mut surface).map(Some),
        RunInput::Picked(outcome) => pipeline.run_picked(outcome, &mut surface),
    };
    log::debug!("Run finished in state {:?}", pipeline.state());

    RunReport {
        image: surface.image,
        notice: surface.notice,
        outcome: outcome.map_err(|e| e.to_string()),
    }
}
