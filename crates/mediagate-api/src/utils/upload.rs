//! Multipart form extraction for the upload handlers

use axum::extract::multipart::MultipartRejection;
use axum::extract::Multipart;
use mediagate_core::models::VideoUploadFields;
use mediagate_core::AppError;

pub const FILE_FIELD: &str = "file";
pub const NO_FILE_MESSAGE: &str = "No file found uploaded";

/// File bytes plus the optional text fields of an upload form.
#[derive(Debug)]
pub struct UploadForm {
    pub data: Vec<u8>,
    pub file_name: Option<String>,
    pub content_type: Option<String>,
    pub fields: VideoUploadFields,
}

fn no_file() -> AppError {
    AppError::BadRequest(NO_FILE_MESSAGE.to_string())
}

/// Read the whole form. The `file` field is required; `title`, `description`
/// and `originalSize` default to empty strings. Other fields are ignored.
/// When a field is repeated, its first occurrence wins.
pub async fn extract_upload_form(
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<UploadForm, AppError> {
    // A body that is not a multipart form cannot carry a file
    let mut multipart = multipart.map_err(|rejection| {
        tracing::debug!(rejection = %rejection, "Upload body is not a multipart form");
        no_file()
    })?;

    let mut file: Option<(Vec<u8>, Option<String>, Option<String>)> = None;
    let mut title: Option<String> = None;
    let mut description: Option<String> = None;
    let mut original_size: Option<String> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::Internal(format!("Failed to read multipart: {}", e)))?
    {
        let field_name = field.name().map(|s| s.to_string()).unwrap_or_default();

        match field_name.as_str() {
            FILE_FIELD => {
                if file.is_some() {
                    continue;
                }
                let file_name = field.file_name().map(|s| s.to_string());
                let content_type = field.content_type().map(|s| s.to_string());
                let data = field
                    .bytes()
                    .await
                    .map_err(|e| AppError::Internal(format!("Failed to read file data: {}", e)))?;
                file = Some((data.to_vec(), file_name, content_type));
            }
            "title" | "description" | "originalSize" => {
                let slot = match field_name.as_str() {
                    "title" => &mut title,
                    "description" => &mut description,
                    _ => &mut original_size,
                };
                if slot.is_some() {
                    continue;
                }
                let value = field
                    .text()
                    .await
                    .map_err(|e| AppError::Internal(format!("Failed to read form field: {}", e)))?;
                *slot = Some(value);
            }
            _ => {}
        }
    }

    let (data, file_name, content_type) = file.ok_or_else(no_file)?;
    let fields = VideoUploadFields {
        title: title.unwrap_or_default(),
        description: description.unwrap_or_default(),
        original_size: original_size.unwrap_or_default(),
    };

    Ok(UploadForm {
        data,
        file_name,
        content_type,
        fields,
    })
}
