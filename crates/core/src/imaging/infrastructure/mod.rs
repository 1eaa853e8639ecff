pub mod bundled_image_source;
pub mod image_file_writer;
