use super::CdnService;
use crate::config::ApiSecret;
use crate::models::{UploadFile, UploadSignature, UploadedAsset};
use crate::signing::{self, SignatureAlgorithm, UploadParams};
use crate::{Error, Result};
use async_trait::async_trait;
use chrono::Utc;
use std::collections::HashSet;
use std::sync::{Arc, Mutex};
use uuid::Uuid;

#[derive(Debug, Clone)]
pub struct RecordedUpload {
    pub file_name: String,
    pub folder: String,
    pub content_type: String,
    pub size: usize,
    pub url: String,
}

/// In-memory provider. With a secret configured it checks signatures the
/// way the real provider does.
#[derive(Clone)]
pub struct MockCdnClient {
    uploads: Arc<Mutex<Vec<RecordedUpload>>>,
    base_url: String,
    secret: Option<ApiSecret>,
    failing_files: Arc<Mutex<HashSet<String>>>,
}

impl MockCdnClient {
    pub fn new() -> Self {
        Self {
            uploads: Arc::new(Mutex::new(Vec::new())),
            base_url: "https://mock-cdn.example.com".to_string(),
            secret: None,
            failing_files: Arc::new(Mutex::new(HashSet::new())),
        }
    }

    pub fn with_base_url(mut self, base_url: String) -> Self {
        self.base_url = base_url;
        self
    }

    pub fn with_secret(mut self, secret: ApiSecret) -> Self {
        self.secret = Some(secret);
        self
    }

    /// Reject any upload of a file with this name.
    pub fn with_failure_for(self, file_name: &str) -> Self {
        self.failing_files
            .lock()
            .unwrap()
            .insert(file_name.to_string());
        self
    }

    pub fn get_upload_count(&self) -> usize {
        self.uploads.lock().unwrap().len()
    }

    pub fn get_uploads(&self) -> Vec<RecordedUpload> {
        self.uploads.lock().unwrap().clone()
    }
}

impl Default for MockCdnClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl CdnService for MockCdnClient {
    async fn upload_file(
        &self,
        file: &UploadFile,
        folder: &str,
        signature: &UploadSignature,
    ) -> Result<UploadedAsset> {
        if self.failing_files.lock().unwrap().contains(&file.file_name) {
            return Err(Error::Provider {
                status: Some(400),
                message: format!("Mock rejection for {}", file.file_name),
            });
        }

        if let Some(secret) = &self.secret {
            let params = UploadParams::for_upload(folder, signature);
            signing::verify(
                &params,
                &signature.signature,
                secret,
                SignatureAlgorithm::default(),
                Utc::now().timestamp(),
            )
            .map_err(|rejection| Error::Provider {
                status: Some(401),
                message: rejection.to_string(),
            })?;
        }

        let extension = file
            .file_name
            .rsplit_once('.')
            .map(|(_, ext)| ext)
            .unwrap_or("bin");
        let public_id = if folder.is_empty() {
            Uuid::new_v4().to_string()
        } else {
            format!("{}/{}", folder, Uuid::new_v4())
        };
        let url = format!(
            "{}/{}/image/upload/{}.{}",
            self.base_url, signature.cloud_name, public_id, extension
        );

        self.uploads.lock().unwrap().push(RecordedUpload {
            file_name: file.file_name.clone(),
            folder: folder.to_string(),
            content_type: file.content_type.clone(),
            size: file.bytes.len(),
            url: url.clone(),
        });

        Ok(UploadedAsset {
            secure_url: url,
            public_id: Some(public_id),
            format: Some(extension.to_string()),
            bytes: Some(file.bytes.len() as u64),
            width: None,
            height: None,
        })
    }
}
