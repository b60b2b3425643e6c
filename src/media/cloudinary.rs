/// Cloudinary media host backend
use crate::{
    config::MediaConfig,
    error::{ApiError, ApiResult},
    media::{ImageUpload, MediaAsset, MediaStore},
    metrics,
};
use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use serde::Deserialize;
use sha2::{Digest, Sha256};
use std::time::Duration;
use tracing::{debug, error, info};

/// Cloudinary image storage
///
/// Uses the signed upload API: every request carries `api_key`, `timestamp`
/// and a SHA-256 signature over the remaining parameters and the API secret.
#[derive(Clone)]
pub struct CloudinaryMediaStore {
    http_client: reqwest::Client,
    config: MediaConfig,
}

#[derive(Debug, Deserialize)]
struct UploadResponse {
    secure_url: String,
    public_id: String,
}

#[derive(Debug, Deserialize)]
struct DestroyResponse {
    result: String,
}

#[derive(Debug, Deserialize)]
struct ErrorResponse {
    error: ErrorMessage,
}

#[derive(Debug, Deserialize)]
struct ErrorMessage {
    message: String,
}

impl CloudinaryMediaStore {
    /// Create a new Cloudinary backend
    pub fn new(config: MediaConfig) -> ApiResult<Self> {
        info!(
            "Initializing Cloudinary media storage (cloud: {})",
            config.cloud_name
        );

        let http_client = reqwest::Client::builder()
            .timeout(Duration::from_secs(60))
            .build()
            .map_err(|e| ApiError::Internal(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            http_client,
            config,
        })
    }

    fn endpoint(&self, action: &str) -> String {
        format!(
            "{}/v1_1/{}/image/{}",
            self.config.api_base_url.trim_end_matches('/'),
            self.config.cloud_name,
            action
        )
    }

    async fn send_upload(&self, image: ImageUpload) -> ApiResult<MediaAsset> {
        let timestamp = chrono::Utc::now().timestamp().to_string();

        let mut signed = vec![("timestamp", timestamp.clone())];
        if let Some(folder) = &self.config.folder {
            signed.push(("folder", folder.clone()));
        }
        let signature = sign_params(&signed, &self.config.api_secret);

        let size = image.bytes.len();
        let mut file = Part::bytes(image.bytes)
            .file_name(image.file_name.unwrap_or_else(|| "upload".to_string()));
        if let Some(content_type) = &image.content_type {
            file = file
                .mime_str(content_type)
                .map_err(|e| ApiError::Validation(format!("Invalid image content type: {}", e)))?;
        }

        let mut form = Form::new()
            .part("file", file)
            .text("api_key", self.config.api_key.clone())
            .text("timestamp", timestamp)
            .text("signature_algorithm", "sha256")
            .text("signature", signature);
        if let Some(folder) = &self.config.folder {
            form = form.text("folder", folder.clone());
        }

        debug!("Uploading image to Cloudinary ({} bytes)", size);

        let response = self
            .http_client
            .post(self.endpoint("upload"))
            .multipart(form)
            .send()
            .await
            .map_err(|e| ApiError::MediaStorage(format!("Upload request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            return Err(ApiError::MediaStorage(format!(
                "Upload rejected ({}): {}",
                status,
                error_message(response).await
            )));
        }

        let uploaded: UploadResponse = response
            .json()
            .await
            .map_err(|e| ApiError::MediaStorage(format!("Invalid upload response: {}", e)))?;

        debug!("✓ Image uploaded to Cloudinary: {}", uploaded.public_id);
        Ok(MediaAsset {
            url: uploaded.secure_url,
            public_id: uploaded.public_id,
        })
    }

    async fn send_destroy(&self, public_id: &str) -> ApiResult<()> {
        let timestamp = chrono::Utc::now().timestamp().to_string();
        let signature = sign_params(
            &[
                ("public_id", public_id.to_string()),
                ("timestamp", timestamp.clone()),
            ],
            &self.config.api_secret,
        );

        let form = [
            ("public_id", public_id.to_string()),
            ("api_key", self.config.api_key.clone()),
            ("timestamp", timestamp),
            ("signature_algorithm", "sha256".to_string()),
            ("signature", signature),
        ];

        debug!("Deleting image from Cloudinary: {}", public_id);

        let response = self
            .http_client
            .post(self.endpoint("destroy"))
            .form(&form)
            .send()
            .await
            .map_err(|e| ApiError::MediaStorage(format!("Destroy request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            return Err(ApiError::MediaStorage(format!(
                "Destroy rejected ({}): {}",
                status,
                error_message(response).await
            )));
        }

        let destroyed: DestroyResponse = response
            .json()
            .await
            .map_err(|e| ApiError::MediaStorage(format!("Invalid destroy response: {}", e)))?;

        // "not found" means the asset is already gone
        match destroyed.result.as_str() {
            "ok" | "not found" => {
                debug!("✓ Image deleted from Cloudinary: {}", public_id);
                Ok(())
            }
            other => Err(ApiError::MediaStorage(format!(
                "Unexpected destroy result for {}: {}",
                public_id, other
            ))),
        }
    }
}

#[async_trait]
impl MediaStore for CloudinaryMediaStore {
    async fn upload(&self, image: ImageUpload) -> ApiResult<MediaAsset> {
        let result = self.send_upload(image).await;
        metrics::record_media_operation("upload", result.is_ok());
        if let Err(e) = &result {
            error!("Failed to upload image to Cloudinary: {}", e);
        }
        result
    }

    async fn destroy(&self, public_id: &str) -> ApiResult<()> {
        let result = self.send_destroy(public_id).await;
        metrics::record_media_operation("destroy", result.is_ok());
        if let Err(e) = &result {
            error!("Failed to delete image {} from Cloudinary: {}", public_id, e);
        }
        result
    }
}

/// Build the string Cloudinary signs: params sorted by key, `k=v` joined by `&`
fn string_to_sign(params: &[(&str, String)]) -> String {
    let mut sorted: Vec<_> = params.iter().filter(|(_, v)| !v.is_empty()).collect();
    sorted.sort_by(|a, b| a.0.cmp(b.0));
    sorted
        .iter()
        .map(|(k, v)| format!("{}={}", k, v))
        .collect::<Vec<_>>()
        .join("&")
}

/// Hex SHA-256 of the parameter string followed by the API secret
fn sign_params(params: &[(&str, String)], api_secret: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(string_to_sign(params).as_bytes());
    hasher.update(api_secret.as_bytes());
    hex::encode(hasher.finalize())
}

async fn error_message(response: reqwest::Response) -> String {
    let body = response.text().await.unwrap_or_default();
    serde_json::from_str::<ErrorResponse>(&body)
        .map(|e| e.error.message)
        .unwrap_or(body)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_string_to_sign_sorts_keys() {
        let params = [
            ("timestamp", "1315060510".to_string()),
            ("public_id", "sample_image".to_string()),
            ("folder", String::new()),
        ];
        assert_eq!(
            string_to_sign(&params),
            "public_id=sample_image&timestamp=1315060510"
        );
    }

    #[test]
    fn test_sign_params_known_values() {
        let signature = sign_params(
            &[
                ("public_id", "sample_image".to_string()),
                ("timestamp", "1315060510".to_string()),
            ],
            "abcd",
        );
        assert_eq!(
            signature,
            "e3c44b54e67a3ecc918f5d7236ca5faa36250ea8a8cd6cbabfd2d6bb2453acac"
        );

        let signature = sign_params(
            &[
                ("timestamp", "1700000000".to_string()),
                ("folder", "favorites".to_string()),
            ],
            "s3cr3t",
        );
        assert_eq!(
            signature,
            "61a1136e2dc79434d29f50e7ed10d15a1afcdf5e02496161e9bef386d5a7664c"
        );
    }

    #[test]
    fn test_endpoint() {
        let store = CloudinaryMediaStore::new(MediaConfig {
            cloud_name: "demo".to_string(),
            api_key: "key".to_string(),
            api_secret: "secret".to_string(),
            folder: None,
            api_base_url: "https://api.cloudinary.com/".to_string(),
        })
        .unwrap();

        assert_eq!(
            store.endpoint("upload"),
            "https://api.cloudinary.com/v1_1/demo/image/upload"
        );
        assert_eq!(
            store.endpoint("destroy"),
            "https://api.cloudinary.com/v1_1/demo/image/destroy"
        );
    }
}
