use super::CdnService;
use crate::config::DEFAULT_API_BASE;
use crate::models::{ProviderErrorBody, UploadFile, UploadSignature, UploadedAsset};
use crate::signing::UploadParams;
use crate::{Error, Result};
use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use reqwest::Client;

/// Uploads directly to a Cloudinary-compatible upload API.
pub struct CloudinaryClient {
    client: Client,
    api_base: String,
}

impl CloudinaryClient {
    pub fn new() -> Self {
        Self::new_with_client(DEFAULT_API_BASE.to_string(), Client::new())
    }

    pub fn new_with_client(api_base: String, client: Client) -> Self {
        Self {
            client,
            api_base: api_base.trim_end_matches('/').to_string(),
        }
    }

    fn upload_url(&self, cloud_name: &str) -> String {
        format!("{}/v1_1/{}/image/upload", self.api_base, cloud_name)
    }

    fn build_form(
        file: &UploadFile,
        folder: &str,
        signature: &UploadSignature,
    ) -> Result<Form> {
        let part = Part::bytes(file.bytes.clone())
            .file_name(file.file_name.clone())
            .mime_str(&file.content_type)
            .map_err(|e| Error::Provider {
                status: None,
                message: format!("Invalid content type '{}': {}", file.content_type, e),
            })?;

        // Send exactly the pairs that were signed, nothing more.
        let params = UploadParams::for_upload(folder, signature);
        let form = params.signed_pairs().into_iter().fold(
            Form::new()
                .part("file", part)
                .text("api_key", signature.api_key.clone())
                .text("signature", signature.signature.clone()),
            |form, (name, value)| form.text(name, value),
        );

        Ok(form)
    }
}

impl Default for CloudinaryClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl CdnService for CloudinaryClient {
    async fn upload_file(
        &self,
        file: &UploadFile,
        folder: &str,
        signature: &UploadSignature,
    ) -> Result<UploadedAsset> {
        let form = Self::build_form(file, folder, signature)?;

        let response = self
            .client
            .post(self.upload_url(&signature.cloud_name))
            .multipart(form)
            .send()
            .await
            .map_err(|e| {
                tracing::error!("Failed to send upload to provider: {}", e);
                Error::Provider {
                    status: None,
                    message: e.to_string(),
                }
            })?;

        let status = response.status();
        let body = response.text().await.map_err(|e| Error::Provider {
            status: Some(status.as_u16()),
            message: format!("Failed to read provider response: {}", e),
        })?;

        if !status.is_success() {
            let message = serde_json::from_str::<ProviderErrorBody>(&body)
                .map(|b| b.error.message)
                .unwrap_or_default();
            tracing::error!("Provider rejected upload (status {}): {}", status, body);
            return Err(Error::Provider {
                status: Some(status.as_u16()),
                message,
            });
        }

        serde_json::from_str(&body).map_err(|e| {
            tracing::error!("Failed to parse provider response: {}\nBody: {}", e, body);
            Error::Provider {
                status: Some(status.as_u16()),
                message: format!("Malformed provider response: {}", e),
            }
        })
    }
}
