use super::SignatureService;
use crate::models::{UploadRequest, UploadSignature};
use crate::signing::SignatureIssuer;
use crate::{Error, Result};
use async_trait::async_trait;
use std::sync::{Arc, Mutex};

#[derive(Clone)]
pub struct MockSignatureClient {
    issuer: Option<SignatureIssuer>,
    should_fail: Arc<Mutex<bool>>,
    requested_folders: Arc<Mutex<Vec<String>>>,
}

impl MockSignatureClient {
    pub fn new() -> Self {
        Self {
            issuer: None,
            should_fail: Arc::new(Mutex::new(false)),
            requested_folders: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Produce real signatures from `issuer` instead of a fixed placeholder.
    pub fn with_issuer(mut self, issuer: SignatureIssuer) -> Self {
        self.issuer = Some(issuer);
        self
    }

    pub fn with_failure(self, should_fail: bool) -> Self {
        *self.should_fail.lock().unwrap() = should_fail;
        self
    }

    pub fn get_call_count(&self) -> usize {
        self.requested_folders.lock().unwrap().len()
    }

    pub fn get_requested_folders(&self) -> Vec<String> {
        self.requested_folders.lock().unwrap().clone()
    }
}

impl Default for MockSignatureClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SignatureService for MockSignatureClient {
    async fn fetch_signature(&self, folder: &str) -> Result<UploadSignature> {
        self.requested_folders
            .lock()
            .unwrap()
            .push(folder.to_string());

        if *self.should_fail.lock().unwrap() {
            return Err(Error::SignatureFetch(
                "Mock signature endpoint unavailable".to_string(),
            ));
        }

        match &self.issuer {
            Some(issuer) => issuer.issue(&UploadRequest::new(folder)),
            None => Ok(UploadSignature {
                signature: "mock-signature".to_string(),
                timestamp: 0,
                cloud_name: "mock-cloud".to_string(),
                api_key: "mock-key".to_string(),
                upload_preset: String::new(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_mock_signature_records_folders() {
        let client = MockSignatureClient::new();

        client.fetch_signature("blog").await.unwrap();
        client.fetch_signature("destinations").await.unwrap();

        assert_eq!(client.get_call_count(), 2);
        assert_eq!(
            client.get_requested_folders(),
            vec!["blog".to_string(), "destinations".to_string()]
        );
    }

    #[tokio::test]
    async fn test_mock_signature_failure() {
        let client = MockSignatureClient::new().with_failure(true);
        let err = client.fetch_signature("blog").await.unwrap_err();

        assert!(matches!(err, Error::SignatureFetch(_)));
        assert_eq!(client.get_call_count(), 1);
    }
}
