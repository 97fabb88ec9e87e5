//! Cloudinary media host client
//!
//! Uploads go to `{api_base_url}/v1_1/{cloud_name}/{resource_type}/upload` as a
//! signed multipart form.

use crate::signature;
use crate::traits::{MediaHost, MediaHostError, MediaHostResult, UploadOptions, UploadResult};
use async_trait::async_trait;
use mediagate_core::MediaHostCredentials;
use reqwest::multipart::{Form, Part};
use reqwest::Client;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::time::Duration;

#[derive(Debug, Deserialize)]
struct CloudinaryErrorBody {
    error: CloudinaryErrorDetail,
}

#[derive(Debug, Deserialize)]
struct CloudinaryErrorDetail {
    message: String,
}

#[derive(Clone)]
pub struct CloudinaryClient {
    http_client: Client,
    credentials: MediaHostCredentials,
    api_base_url: String,
}

impl CloudinaryClient {
    pub fn new(
        credentials: MediaHostCredentials,
        api_base_url: impl Into<String>,
        timeout: Duration,
    ) -> MediaHostResult<Self> {
        let http_client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| MediaHostError::ConfigError(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            http_client,
            credentials,
            api_base_url: api_base_url.into().trim_end_matches('/').to_string(),
        })
    }

    fn upload_url(&self, options: &UploadOptions) -> String {
        format!(
            "{}/v1_1/{}/{}/upload",
            self.api_base_url, self.credentials.cloud_name, options.resource_type
        )
    }

    /// Parameters covered by the signature, keyed for sorted iteration.
    fn signed_params(&self, options: &UploadOptions, timestamp: i64) -> BTreeMap<&'static str, String> {
        let mut params = BTreeMap::new();
        params.insert("timestamp", timestamp.to_string());
        params.insert("folder", options.folder.clone());
        if let Some(transformation) = options.transformation.as_ref().and_then(|t| t.to_param()) {
            params.insert("transformation", transformation);
        }
        params
    }

    fn build_form(&self, data: Vec<u8>, options: &UploadOptions, timestamp: i64) -> Form {
        let params = self.signed_params(options, timestamp);
        let signature = signature::sign(&params, &self.credentials.api_secret);

        let mut form = Form::new()
            .part("file", Part::bytes(data).file_name("file"))
            .text("api_key", self.credentials.api_key.clone())
            .text("signature", signature);
        for (key, value) in params {
            form = form.text(key, value);
        }
        form
    }
}

#[async_trait]
impl MediaHost for CloudinaryClient {
    #[tracing::instrument(skip(self, data), fields(size = data.len(), resource_type = %options.resource_type, folder = %options.folder))]
    async fn upload(
        &self,
        data: Vec<u8>,
        options: &UploadOptions,
    ) -> MediaHostResult<UploadResult> {
        let timestamp = chrono::Utc::now().timestamp();
        let form = self.build_form(data, options, timestamp);

        let response = self
            .http_client
            .post(self.upload_url(options))
            .multipart(form)
            .send()
            .await
            .map_err(|e| {
                tracing::error!(error = %e, "Upload request to Cloudinary failed");
                MediaHostError::RequestFailed(e.to_string())
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<CloudinaryErrorBody>(&body)
                .map(|b| b.error.message)
                .unwrap_or(body);
            tracing::warn!(status = status.as_u16(), message = %message, "Cloudinary rejected upload");
            return Err(MediaHostError::Rejected {
                status: status.as_u16(),
                message,
            });
        }

        let result = response
            .json::<UploadResult>()
            .await
            .map_err(|e| MediaHostError::InvalidResponse(e.to_string()))?;

        tracing::info!(
            public_id = %result.public_id,
            bytes = result.bytes,
            secure_url = ?result.secure_url,
            resource_type = ?result.resource_type,
            format = ?result.format,
            "Asset uploaded to Cloudinary"
        );

        Ok(result)
    }

    fn name(&self) -> &'static str {
        "cloudinary"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::traits::Transformation;
    use mockito::Matcher;

    fn credentials() -> MediaHostCredentials {
        MediaHostCredentials {
            cloud_name: "demo".to_string(),
            api_key: "123456".to_string(),
            api_secret: "abcd".to_string(),
        }
    }

    fn client(base_url: &str) -> CloudinaryClient {
        CloudinaryClient::new(credentials(), base_url, Duration::from_secs(5)).unwrap()
    }

    #[test]
    fn test_upload_url_per_resource_type() {
        let client = client("https://api.cloudinary.com/");
        assert_eq!(
            client.upload_url(&UploadOptions::image("next-cloudinary-uploads")),
            "https://api.cloudinary.com/v1_1/demo/image/upload"
        );
        assert_eq!(
            client.upload_url(&UploadOptions::video(
                "video-uploads",
                Transformation::compressed_mp4()
            )),
            "https://api.cloudinary.com/v1_1/demo/video/upload"
        );
    }

    #[test]
    fn test_signed_params_include_transformation_only_for_video() {
        let client = client("https://api.cloudinary.com");

        let image = client.signed_params(&UploadOptions::image("next-cloudinary-uploads"), 1);
        assert!(!image.contains_key("transformation"));
        assert_eq!(image.get("folder").map(String::as_str), Some("next-cloudinary-uploads"));

        let video = client.signed_params(
            &UploadOptions::video("video-uploads", Transformation::compressed_mp4()),
            1,
        );
        assert_eq!(
            video.get("transformation").map(String::as_str),
            Some("f_mp4,q_auto")
        );
    }

    #[tokio::test]
    async fn test_image_upload_success() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/v1_1/demo/image/upload")
            .match_body(Matcher::AllOf(vec![
                Matcher::Regex(r#"name="folder"\s+next-cloudinary-uploads"#.to_string()),
                Matcher::Regex(r#"name="api_key"\s+123456"#.to_string()),
                Matcher::Regex(r#"name="signature"\s+[0-9a-f]{40}"#.to_string()),
            ]))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"public_id":"next-cloudinary-uploads/abc","bytes":5,"format":"png","resource_type":"image"}"#)
            .create_async()
            .await;

        let result = client(&server.url())
            .upload(b"hello".to_vec(), &UploadOptions::image("next-cloudinary-uploads"))
            .await
            .unwrap();

        mock.assert_async().await;
        assert_eq!(result.public_id, "next-cloudinary-uploads/abc");
        assert_eq!(result.bytes, 5);
        assert_eq!(result.duration, None);
    }

    #[tokio::test]
    async fn test_video_upload_sends_transformation() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/v1_1/demo/video/upload")
            .match_body(Matcher::Regex(
                r#"name="transformation"\s+f_mp4,q_auto"#.to_string(),
            ))
            .with_status(200)
            .with_body(r#"{"public_id":"video-uploads/clip","bytes":1048576,"duration":12.5}"#)
            .create_async()
            .await;

        let result = client(&server.url())
            .upload(
                b"video".to_vec(),
                &UploadOptions::video("video-uploads", Transformation::compressed_mp4()),
            )
            .await
            .unwrap();

        mock.assert_async().await;
        assert_eq!(result.bytes, 1_048_576);
        assert_eq!(result.duration, Some(12.5));
    }

    #[tokio::test]
    async fn test_rejected_upload_surfaces_message() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("POST", "/v1_1/demo/image/upload")
            .with_status(401)
            .with_body(r#"{"error":{"message":"Invalid Signature"}}"#)
            .create_async()
            .await;

        let err = client(&server.url())
            .upload(b"x".to_vec(), &UploadOptions::image("next-cloudinary-uploads"))
            .await
            .unwrap_err();

        match err {
            MediaHostError::Rejected { status, message } => {
                assert_eq!(status, 401);
                assert_eq!(message, "Invalid Signature");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_malformed_success_body() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("POST", "/v1_1/demo/image/upload")
            .with_status(200)
            .with_body("not json")
            .create_async()
            .await;

        let err = client(&server.url())
            .upload(b"x".to_vec(), &UploadOptions::image("next-cloudinary-uploads"))
            .await
            .unwrap_err();

        assert!(matches!(err, MediaHostError::InvalidResponse(_)));
    }
}
