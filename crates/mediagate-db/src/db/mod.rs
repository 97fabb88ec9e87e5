//! Database repositories for data access layer

pub mod video;
