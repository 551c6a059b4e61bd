//! Data models for the signed upload flow
//!
//! Wire types exchanged with the signature endpoint and the media provider,
//! plus the in-memory representation of a file awaiting upload.

use crate::mime::detect_content_type;
use crate::Result;
use serde::{Deserialize, Serialize};
use std::path::Path;
use validator::{Validate, ValidationError};

pub const MAX_FOLDER_LEN: usize = 255;

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct UploadRequest {
    #[serde(default)]
    #[validate(length(max = 255), custom(function = "validate_folder"))]
    pub folder: String,
}

impl UploadRequest {
    pub fn new(folder: impl Into<String>) -> Self {
        Self {
            folder: folder.into(),
        }
    }
}

fn validate_folder(folder: &str) -> std::result::Result<(), ValidationError> {
    if folder.starts_with('/') {
        return Err(ValidationError::new("leading_slash"));
    }
    if folder.contains('\\') || folder.chars().any(char::is_control) {
        return Err(ValidationError::new("invalid_character"));
    }
    if folder.split('/').any(|segment| segment == "..") {
        return Err(ValidationError::new("parent_segment"));
    }
    Ok(())
}

/// Time-limited upload credential handed to the client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadSignature {
    pub signature: String,
    pub timestamp: i64,
    pub cloud_name: String,
    pub api_key: String,
    pub upload_preset: String,
}

/// A file ready to be sent to the provider.
#[derive(Debug, Clone)]
pub struct UploadFile {
    pub file_name: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

impl UploadFile {
    pub fn new(file_name: impl Into<String>, bytes: Vec<u8>) -> Self {
        let file_name = file_name.into();
        let content_type = detect_content_type(&bytes, &file_name).to_string();
        Self {
            file_name,
            content_type,
            bytes,
        }
    }

    pub async fn from_path(path: &Path) -> Result<Self> {
        let bytes = tokio::fs::read(path).await?;
        let file_name = path
            .file_name()
            .and_then(|name| name.to_str())
            .unwrap_or("upload")
            .to_string();
        Ok(Self::new(file_name, bytes))
    }
}

/// Successful provider response. Only `secure_url` is required.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UploadedAsset {
    pub secure_url: String,
    #[serde(default)]
    pub public_id: Option<String>,
    #[serde(default)]
    pub format: Option<String>,
    #[serde(default)]
    pub bytes: Option<u64>,
    #[serde(default)]
    pub width: Option<u32>,
    #[serde(default)]
    pub height: Option<u32>,
}

#[derive(Debug, Deserialize)]
pub struct ProviderErrorBody {
    pub error: ProviderErrorDetail,
}

#[derive(Debug, Deserialize)]
pub struct ProviderErrorDetail {
    pub message: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub timestamp: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_signature_serializes_camel_case() {
        let signature = UploadSignature {
            signature: "abc".to_string(),
            timestamp: 1_700_000_000,
            cloud_name: "wayfarer".to_string(),
            api_key: "123".to_string(),
            upload_preset: "site".to_string(),
        };

        let json = serde_json::to_value(&signature).unwrap();
        assert_eq!(json["cloudName"], "wayfarer");
        assert_eq!(json["apiKey"], "123");
        assert_eq!(json["uploadPreset"], "site");
        assert_eq!(json["timestamp"], 1_700_000_000);
    }

    #[test]
    fn test_folder_validation() {
        assert!(UploadRequest::new("accommodations/bali").validate().is_ok());
        assert!(UploadRequest::new("").validate().is_ok());
        assert!(UploadRequest::new("/etc").validate().is_err());
        assert!(UploadRequest::new("blog/../admin").validate().is_err());
        assert!(UploadRequest::new("blog\\posts").validate().is_err());
        assert!(UploadRequest::new("a".repeat(MAX_FOLDER_LEN + 1))
            .validate()
            .is_err());
    }

    #[test]
    fn test_missing_folder_defaults_to_empty() {
        let request: UploadRequest = serde_json::from_str("{}").unwrap();
        assert_eq!(request.folder, "");
    }

    #[test]
    fn test_uploaded_asset_tolerates_extra_fields() {
        let asset: UploadedAsset = serde_json::from_str(
            r#"{"secure_url":"https://res.example.com/x.jpg","asset_id":"q","version":3}"#,
        )
        .unwrap();
        assert_eq!(asset.secure_url, "https://res.example.com/x.jpg");
        assert!(asset.public_id.is_none());
    }
}
