//! Face landmark annotation: decode an image, run a pluggable face detector,
//! and burn bounding boxes, landmark markers and type labels into a copy.

pub mod error;

pub mod shared {
    pub mod constants;
    pub mod geometry;
    pub mod raster_image;
}

pub mod imaging {
    pub mod domain {
        pub mod image_source;
        pub mod image_writer;
    }
    pub mod infrastructure;
}

pub mod detection {
    pub mod domain {
        pub mod detected_face;
        pub mod detection_adapter;
        pub mod face_detector;
    }
    pub mod infrastructure;
}

pub mod annotation {
    pub mod domain {
        pub mod annotation_style;
        pub mod canvas;
        pub mod landmark_decorator;
    }
    pub mod infrastructure;
    pub mod overlay_renderer;
}

pub mod pipeline {
    pub mod annotation_pipeline;
    pub mod display_surface;
    pub mod pipeline_logger;
    pub mod infrastructure;
}
