/// Media Storage
///
/// Uploads favorite pictures to a remote image host and deletes them again.
/// The host hands back a public URL and an opaque id used for later deletion.

pub mod cloudinary;

pub use cloudinary::CloudinaryMediaStore;

use crate::error::{ApiError, ApiResult};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// A hosted image: public URL plus the host-side handle used for deletion
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MediaAsset {
    pub url: String,
    pub public_id: String,
}

/// Image bytes received from a client
#[derive(Debug, Clone)]
pub struct ImageUpload {
    pub bytes: Vec<u8>,
    pub file_name: Option<String>,
    pub content_type: Option<String>,
}

/// Remote media host
#[async_trait]
pub trait MediaStore: Send + Sync {
    /// Upload an image and return where it lives
    async fn upload(&self, image: ImageUpload) -> ApiResult<MediaAsset>;

    /// Delete a previously uploaded image
    async fn destroy(&self, public_id: &str) -> ApiResult<()>;
}

/// Stand-in used when no media host credentials are configured
#[derive(Debug, Clone, Default)]
pub struct UnconfiguredMediaStore;

#[async_trait]
impl MediaStore for UnconfiguredMediaStore {
    async fn upload(&self, _image: ImageUpload) -> ApiResult<MediaAsset> {
        Err(ApiError::MediaUnavailable)
    }

    async fn destroy(&self, _public_id: &str) -> ApiResult<()> {
        Err(ApiError::MediaUnavailable)
    }
}
