pub mod image_upload;
pub mod video_upload;
pub mod videos;
