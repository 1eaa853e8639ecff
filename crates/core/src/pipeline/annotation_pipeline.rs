use std::path::PathBuf;
use std::time::Instant;

use crate::annotation::overlay_renderer::OverlayRenderer;
use crate::detection::domain::detected_face::DetectedFace;
use crate::detection::domain::detection_adapter::DetectionAdapter;
use crate::error::AnnotateError;
use crate::imaging::domain::image_source::ImageSource;
use crate::pipeline::display_surface::DisplaySurface;
use crate::pipeline::pipeline_logger::{NullPipelineLogger, PipelineLogger};
use crate::shared::constants::DETECTOR_UNAVAILABLE_MESSAGE;
use crate::shared::raster_image::RasterImage;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PipelineState {
    Idle,
    ImageLoaded,
    Detected,
    Rendered,
    Failed,
}

/// Which image a run should annotate.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ImageRequest {
    Default,
    Path(PathBuf),
}

/// What came back from a file picker.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum PickerOutcome {
    Selected(PathBuf),
    Cancelled,
}

#[derive(Clone, Debug, PartialEq)]
pub struct RunSummary {
    pub faces: Vec<DetectedFace>,
    pub face_count: usize,
    pub landmark_count: usize,
}

impl RunSummary {
    fn new(faces: Vec<DetectedFace>) -> Self {
        let landmark_count = faces.iter().map(|f| f.landmarks.len()).sum();
        Self {
            face_count: faces.len(),
            landmark_count,
            faces,
        }
    }
}

/// Load → detect → render → present, one image per run.
pub struct AnnotationPipeline {
    source: Box<dyn ImageSource>,
    adapter: DetectionAdapter,
    renderer: OverlayRenderer,
    logger: Box<dyn PipelineLogger>,
    state: PipelineState,
}

impl AnnotationPipeline {
    pub fn new(
        source: Box<dyn ImageSource>,
        adapter: DetectionAdapter,
        renderer: OverlayRenderer,
    ) -> Self {
        Self {
            source,
            adapter,
            renderer,
            logger: Box::new(NullPipelineLogger),
            state: PipelineState::Idle,
        }
    }

    pub fn with_logger(mut self, logger: Box<dyn PipelineLogger>) -> Self {
        self.logger = logger;
        self
    }

    /// State reached by the most recent run.
    pub fn state(&self) -> PipelineState {
        self.state
    }

    pub fn logger(&self) -> &dyn PipelineLogger {
        self.logger.as_ref()
    }

    /// Annotates one image and hands it to `surface`.
    ///
    /// On failure the surface keeps showing whatever it showed before; only
    /// an unavailable detector produces a notice.
    pub fn run(
        &mut self,
        request: ImageRequest,
        surface: &mut dyn DisplaySurface,
    ) -> Result<RunSummary, AnnotateError> {
        self.state = PipelineState::Idle;
        let result = self.execute(&request, surface);
        if let Err(e) = &result {
            self.state = PipelineState::Failed;
            if e.is_decode() {
                log::warn!("Could not load image: {e}");
            } else {
                log::error!("Annotation run failed: {e}");
            }
        }
        result
    }

    /// Runs on a picked file. A cancelled pick does nothing.
    pub fn run_picked(
        &mut self,
        outcome: PickerOutcome,
        surface: &mut dyn DisplaySurface,
    ) -> Result<Option<RunSummary>, AnnotateError> {
        match outcome {
            PickerOutcome::Selected(path) => self.run(ImageRequest::Path(path), surface).map(Some),
            PickerOutcome::Cancelled => {
                log::debug!("Image pick cancelled");
                Ok(None)
            }
        }
    }

    fn execute(
        &mut self,
        request: &ImageRequest,
        surface: &mut dyn DisplaySurface,
    ) -> Result<RunSummary, AnnotateError> {
        let started = Instant::now();
        let image = self.load(request)?;
        self.record_timing("decode", started);
        self.state = PipelineState::ImageLoaded;

        let started = Instant::now();
        let faces = {
            let mut lease = self.adapter.acquire();
            if !lease.is_ready() {
                surface.show_notice(DETECTOR_UNAVAILABLE_MESSAGE);
                return Err(AnnotateError::DetectorUnavailable);
            }
            lease.detect(&image)?
        };
        self.record_timing("detect", started);
        self.state = PipelineState::Detected;

        let started = Instant::now();
        let annotated = self.renderer.render(&image, &faces);
        self.record_timing("render", started);
        self.state = PipelineState::Rendered;

        let summary = RunSummary::new(faces);
        self.logger.metric("faces", summary.face_count as f64);
        self.logger.metric("landmarks", summary.landmark_count as f64);
        self.logger.info(&format!(
            "Annotated {} face(s), {} landmark(s)",
            summary.face_count, summary.landmark_count
        ));
        log::info!(
            "Annotated {} face(s) with {} landmark(s) on {}x{} image",
            summary.face_count,
            summary.landmark_count,
            annotated.width(),
            annotated.height()
        );

        surface.present(annotated);
        Ok(summary)
    }

    fn load(&self, request: &ImageRequest) -> Result<RasterImage, AnnotateError> {
        match request {
            ImageRequest::Default => self.source.load_default(),
            ImageRequest::Path(path) => self.source.load_from_path(path),
        }
    }

    fn record_timing(&mut self, stage: &str, started: Instant) {
        let ms = started.elapsed().as_secs_f64() * 1000.0;
        log::debug!("{stage} took {ms:.1}ms");
        self.logger.timing(stage, ms);
    }
}
