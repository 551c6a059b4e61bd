//! Sources of upload signatures
//!
//! The upload client asks a [`SignatureService`] for a fresh signature before
//! every provider upload. In production that is the site's own signature
//! endpoint; the issuer itself and a mock also implement the trait.

pub mod client;
pub mod mock;

pub use client::SignatureClient;
pub use mock::MockSignatureClient;

use crate::models::UploadSignature;
use crate::Result;
use async_trait::async_trait;

#[async_trait]
pub trait SignatureService: Send + Sync {
    async fn fetch_signature(&self, folder: &str) -> Result<UploadSignature>;
}
