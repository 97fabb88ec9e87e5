//! Mediagate media host library
//!
//! This crate provides the `MediaHost` abstraction and its Cloudinary
//! implementation. Uploads are signed with the account's API secret; the
//! secret itself never leaves the process.

pub mod cloudinary;
pub mod factory;
pub(crate) mod signature;
pub mod traits;

// Re-export commonly used types
pub use cloudinary::CloudinaryClient;
pub use factory::create_media_host;
pub use traits::{
    MediaHost, MediaHostError, MediaHostResult, ResourceType, Transformation, UploadOptions,
    UploadResult,
};
