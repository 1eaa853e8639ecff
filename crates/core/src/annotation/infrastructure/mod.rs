pub mod centered_image_decorator;
pub mod glyphs;
pub mod raster_canvas;
