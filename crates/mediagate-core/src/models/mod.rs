//! Domain models shared by the API and database layers.

pub mod upload;
pub mod video;

pub use upload::{ImageUploadResponse, VideoUploadFields};
pub use video::{NewVideo, Video};
