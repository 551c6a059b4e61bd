//! Upload client orchestration: obtain a signature, then upload directly to
//! the provider.

use crate::cdn::{CdnService, CloudinaryClient};
use crate::config::ClientConfig;
use crate::models::UploadFile;
use crate::signature::{SignatureClient, SignatureService};
use crate::{Error, Result};
use futures::future::join_all;
use tracing::{error, info};

/// Drives signed uploads for one or many files.
pub struct Uploader {
    signatures: Box<dyn SignatureService>,
    cdn: Box<dyn CdnService>,
}

/// Injectable service bundle used to construct [`Uploader`] in tests/harnesses.
pub struct UploaderServices {
    pub signatures: Box<dyn SignatureService>,
    pub cdn: Box<dyn CdnService>,
}

impl Uploader {
    pub fn with_services(services: UploaderServices) -> Self {
        Self {
            signatures: services.signatures,
            cdn: services.cdn,
        }
    }

    /// Build an uploader that talks to the signature endpoint and provider
    /// named in `config`.
    pub fn from_config(config: &ClientConfig) -> Result<Self> {
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = config.timeout {
            builder = builder.timeout(timeout);
        }
        // Reuse one HTTP connection pool across both clients.
        let http_client = builder.build()?;

        info!(
            "Signature endpoint: {}, provider API: {}",
            config.signature_endpoint, config.api_base
        );

        Ok(Self::with_services(UploaderServices {
            signatures: Box::new(SignatureClient::new_with_client(
                config.signature_endpoint.clone(),
                http_client.clone(),
            )),
            cdn: Box::new(CloudinaryClient::new_with_client(
                config.api_base.clone(),
                http_client,
            )),
        }))
    }

    /// Upload one file into `folder` and return its permanent URL.
    pub async fn upload(&self, file: &UploadFile, folder: &str) -> Result<String> {
        let signature = self
            .signatures
            .fetch_signature(folder)
            .await
            .map_err(|e| {
                error!(
                    stage = "signature",
                    file = %file.file_name,
                    folder,
                    "Could not obtain upload signature: {}",
                    e
                );
                e
            })?;

        let asset = self
            .cdn
            .upload_file(file, folder, &signature)
            .await
            .map_err(|e| {
                error!(
                    stage = "provider",
                    file = %file.file_name,
                    folder,
                    "Provider upload failed: {}",
                    e
                );
                e
            })?;

        info!(
            file = %file.file_name,
            folder,
            "Uploaded to {}",
            asset.secure_url
        );
        Ok(asset.secure_url)
    }

    /// Upload all `files` concurrently.
    ///
    /// Every upload runs to completion even when a sibling fails. The result
    /// is either every URL, in input order, or one aggregate error.
    pub async fn upload_many(&self, files: &[UploadFile], folder: &str) -> Result<Vec<String>> {
        let results = join_all(files.iter().map(|file| self.upload(file, folder))).await;

        let total = results.len();
        let mut urls = Vec::with_capacity(total);
        let mut failures = Vec::new();
        for result in results {
            match result {
                Ok(url) => urls.push(url),
                Err(e) => failures.push(e),
            }
        }

        let failed = failures.len();
        if let Some(first) = failures.into_iter().next() {
            error!(failed, total, folder, "Batch upload failed");
            return Err(Error::BatchUpload {
                failed,
                total,
                first: Box::new(first),
            });
        }

        info!("Uploaded {} file(s) to '{}'", total, folder);
        Ok(urls)
    }
}
