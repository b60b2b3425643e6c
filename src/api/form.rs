/// Multipart form parsing for favorite create/update
use crate::{
    error::{ApiError, ApiResult},
    media::ImageUpload,
};
use axum::{
    extract::{
        multipart::{MultipartError, MultipartRejection},
        Multipart,
    },
    http::StatusCode,
};

/// Field names accepted for the picture upload
const IMAGE_FIELDS: [&str; 2] = ["favorite_picture", "image"];

/// Fields of a favorite form; `None` means the part was not sent
#[derive(Debug, Default)]
pub struct FavoriteForm {
    pub name: Option<String>,
    pub user_notes: Option<String>,
    pub image: Option<ImageUpload>,
}

impl FavoriteForm {
    /// Read every part of a multipart body
    ///
    /// Unknown parts are ignored. An empty `user_notes` counts as absent, as does
    /// a file part with no file name and no bytes (an empty file input).
    pub async fn parse(multipart: Result<Multipart, MultipartRejection>) -> ApiResult<Self> {
        let mut multipart = multipart
            .map_err(|e| ApiError::Validation(format!("Expected multipart form data: {}", e)))?;
        let mut form = Self::default();

        while let Some(field) = multipart.next_field().await.map_err(malformed)? {
            let Some(field_name) = field.name().map(str::to_string) else {
                continue;
            };

            match field_name.as_str() {
                "name" => form.name = Some(field.text().await.map_err(malformed)?),
                "user_notes" => {
                    let notes = field.text().await.map_err(malformed)?;
                    form.user_notes = Some(notes).filter(|n| !n.is_empty());
                }
                n if IMAGE_FIELDS.contains(&n) => {
                    let file_name = field
                        .file_name()
                        .map(str::to_string)
                        .filter(|s| !s.is_empty());
                    let content_type = field.content_type().map(str::to_string);
                    let bytes = field.bytes().await.map_err(malformed)?;

                    if bytes.is_empty() && file_name.is_none() {
                        continue;
                    }
                    if bytes.is_empty() {
                        return Err(ApiError::Validation("Uploaded image is empty".to_string()));
                    }
                    if let Some(ct) = &content_type {
                        if !is_acceptable_image_type(ct) {
                            return Err(ApiError::Validation(format!(
                                "Uploaded file must be an image, got {}",
                                ct
                            )));
                        }
                    }

                    form.image = Some(ImageUpload {
                        bytes: bytes.to_vec(),
                        file_name,
                        content_type,
                    });
                }
                _ => {}
            }
        }

        Ok(form)
    }
}

fn malformed(e: MultipartError) -> ApiError {
    if e.status() == StatusCode::PAYLOAD_TOO_LARGE {
        return ApiError::PayloadTooLarge;
    }
    ApiError::Validation(format!("Malformed multipart body: {}", e.body_text()))
}

fn is_acceptable_image_type(content_type: &str) -> bool {
    content_type.starts_with("image/") || content_type == "application/octet-stream"
}
