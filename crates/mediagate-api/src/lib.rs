//! Mediagate API Library
//!
//! HTTP handlers, the access gate, and application setup.

mod api_doc;
mod handlers;
pub mod setup;
mod utils;

pub mod auth;
pub mod error;
pub mod state;

pub use api_doc::ApiDoc;
pub use error::HttpAppError;
