//! Fixed values shared across crates.

/// Prefix under which every API route lives.
pub const API_PREFIX: &str = "/api";

/// Media host folder for image uploads.
pub const IMAGE_UPLOAD_FOLDER: &str = "next-cloudinary-uploads";

/// Media host folder for video uploads.
pub const VIDEO_UPLOAD_FOLDER: &str = "video-uploads";

/// Cookie that carries the session token when no Authorization header is sent.
pub const SESSION_COOKIE: &str = "__session";

pub const DEFAULT_PUBLIC_ROUTES: &[&str] = &["/sign-in", "/sign-up", "/", "/home"];
pub const DEFAULT_PUBLIC_API_ROUTES: &[&str] = &["/api/videos"];
pub const DEFAULT_SIGN_IN_PATH: &str = "/sign-in";
pub const DEFAULT_LANDING_PATH: &str = "/home";

pub const DEFAULT_CLOUDINARY_API_BASE_URL: &str = "https://api.cloudinary.com";
