//! CDN integration for direct signed uploads
//!
//! Files go straight from the client to the media provider; the provider
//! checks the server-issued signature before accepting them.

pub mod client;
pub mod mock;

pub use client::CloudinaryClient;
pub use mock::MockCdnClient;

use crate::models::{UploadFile, UploadSignature, UploadedAsset};
use crate::Result;
use async_trait::async_trait;

#[async_trait]
pub trait CdnService: Send + Sync {
    /// Upload `file` into `folder` using a signature obtained for that folder.
    async fn upload_file(
        &self,
        file: &UploadFile,
        folder: &str,
        signature: &UploadSignature,
    ) -> Result<UploadedAsset>;
}
