//! Mediagate Database Layer
//!
//! Repository for the `videos` table plus the trait handlers depend on, so the
//! HTTP layer can be exercised without a database.

pub mod db;
pub mod store_traits;

pub use db::video::VideoRepository;
pub use store_traits::VideoStore;
