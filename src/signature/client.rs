use super::SignatureService;
use crate::models::{UploadRequest, UploadSignature};
use crate::{Error, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;

pub const SIGNATURE_PATH: &str = "/api/cloudinary/signature";

/// Fetches signatures from the site's signature endpoint over HTTP.
pub struct SignatureClient {
    client: Client,
    endpoint: String,
}

#[derive(Debug, Deserialize)]
struct EndpointError {
    error: String,
}

impl SignatureClient {
    pub fn new(endpoint: String) -> Self {
        Self::new_with_client(endpoint, Client::new())
    }

    pub fn new_with_client(endpoint: String, client: Client) -> Self {
        Self {
            client,
            endpoint: endpoint.trim_end_matches('/').to_string(),
        }
    }

    fn url(&self) -> String {
        format!("{}{}", self.endpoint, SIGNATURE_PATH)
    }
}

#[async_trait]
impl SignatureService for SignatureClient {
    async fn fetch_signature(&self, folder: &str) -> Result<UploadSignature> {
        let response = self
            .client
            .post(self.url())
            .json(&UploadRequest::new(folder))
            .send()
            .await
            .map_err(|e| Error::SignatureFetch(format!("request failed: {}", e)))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| Error::SignatureFetch(format!("failed to read response: {}", e)))?;

        if !status.is_success() {
            let message = serde_json::from_str::<EndpointError>(&body)
                .map(|e| e.error)
                .unwrap_or(body);
            return Err(Error::SignatureFetch(format!(
                "endpoint returned status {}: {}",
                status, message
            )));
        }

        serde_json::from_str(&body)
            .map_err(|e| Error::SignatureFetch(format!("malformed signature response: {}", e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn test_fetch_signature_posts_folder_and_parses_response() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path(SIGNATURE_PATH))
            .and(body_json(serde_json::json!({ "folder": "destinations" })))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "signature": "deadbeef",
                "timestamp": 1760000000,
                "cloudName": "wayfarer",
                "apiKey": "123",
                "uploadPreset": "site_uploads"
            })))
            .expect(1)
            .mount(&server)
            .await;

        let client = SignatureClient::new(format!("{}/", server.uri()));
        let signature = client.fetch_signature("destinations").await.unwrap();

        assert_eq!(signature.signature, "deadbeef");
        assert_eq!(signature.timestamp, 1760000000);
        assert_eq!(signature.cloud_name, "wayfarer");
        assert_eq!(signature.upload_preset, "site_uploads");
    }

    #[tokio::test]
    async fn test_endpoint_error_becomes_signature_fetch_error() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path(SIGNATURE_PATH))
            .respond_with(
                ResponseTemplate::new(400)
                    .set_body_json(serde_json::json!({ "error": "Invalid folder" })),
            )
            .mount(&server)
            .await;

        let client = SignatureClient::new(server.uri());
        let err = client.fetch_signature("../x").await.unwrap_err();

        assert!(matches!(err, Error::SignatureFetch(_)));
        assert!(err.to_string().contains("Invalid folder"));
    }

    #[tokio::test]
    async fn test_malformed_response_is_rejected() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path(SIGNATURE_PATH))
            .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
            .mount(&server)
            .await;

        let client = SignatureClient::new(server.uri());
        let err = client.fetch_signature("blog").await.unwrap_err();
        assert!(matches!(err, Error::SignatureFetch(_)));
    }

    #[tokio::test]
    async fn test_unreachable_endpoint_is_signature_fetch_error() {
        let server = MockServer::start().await;
        let uri = server.uri();
        drop(server);

        let client = SignatureClient::new(uri);
        let err = client.fetch_signature("blog").await.unwrap_err();
        assert!(matches!(err, Error::SignatureFetch(_)));
    }
}
