use mediagate_core::models::{ImageUploadResponse, Video};
use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Mediagate API",
        description = "Image and video uploads forwarded to Cloudinary"
    ),
    paths(
        crate::handlers::image_upload::upload_image,
        crate::handlers::video_upload::upload_video,
        crate::handlers::videos::list_videos,
    ),
    components(schemas(ImageUploadResponse, Video)),
    tags(
        (name = "uploads", description = "Media uploads"),
        (name = "videos", description = "Recorded videos")
    )
)]
pub struct ApiDoc;
