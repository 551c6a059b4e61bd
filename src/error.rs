//! Error handling and custom error types
//!
//! Provides unified error handling across the crate using thiserror, plus
//! the mapping from [`Error`] to HTTP responses used by the server routes.

use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Signature request failed: {0}")]
    SignatureFetch(String),

    #[error("Provider upload failed{}: {message}", status_suffix(.status))]
    Provider {
        status: Option<u16>,
        message: String,
    },

    #[error("{failed} of {total} uploads failed: {first}")]
    BatchUpload {
        failed: usize,
        total: usize,
        #[source]
        first: Box<Error>,
    },

    #[error("Catalog error: {0}")]
    Catalog(String),

    #[error("Not found: {0}")]
    NotFound(String),
}

pub type Result<T> = std::result::Result<T, Error>;

fn status_suffix(status: &Option<u16>) -> String {
    status
        .map(|code| format!(" (status {})", code))
        .unwrap_or_default()
}

impl Error {
    /// Message suitable for showing to an end user.
    ///
    /// Signature and provider failures both read as "Upload failed"; the
    /// provider's own message is appended when it sent one. A failed batch
    /// reads like its first failure.
    pub fn client_message(&self) -> String {
        match self {
            Error::SignatureFetch(_) => "Upload failed".to_string(),
            Error::Provider {
                status: Some(_),
                message,
            } if !message.is_empty() => format!("Upload failed: {}", message),
            Error::Provider { .. } => "Upload failed".to_string(),
            Error::BatchUpload { first, .. } => first.client_message(),
            Error::Validation(msg) => msg.clone(),
            Error::NotFound(what) => format!("{} not found", what),
            Error::Config(_) => "Server is not configured for this request".to_string(),
            _ => "Internal server error".to_string(),
        }
    }

    fn status_code(&self) -> StatusCode {
        match self {
            Error::Validation(_) => StatusCode::BAD_REQUEST,
            Error::NotFound(_) => StatusCode::NOT_FOUND,
            Error::Provider { .. } | Error::SignatureFetch(_) | Error::BatchUpload { .. } => {
                StatusCode::BAD_GATEWAY
            }
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<JsonRejection> for Error {
    fn from(rejection: JsonRejection) -> Self {
        Error::Validation(format!("Invalid request body: {}", rejection.body_text()))
    }
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!(error = %self, "Request failed");
        } else {
            tracing::debug!(error = %self, "Request rejected");
        }

        let body = Json(ErrorResponse {
            error: self.client_message(),
        });
        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_signature_and_provider_failures_read_the_same() {
        let fetch = Error::SignatureFetch("connection refused".to_string());
        let provider = Error::Provider {
            status: None,
            message: "connection reset".to_string(),
        };

        assert_eq!(fetch.client_message(), "Upload failed");
        assert_eq!(provider.client_message(), "Upload failed");
    }

    #[test]
    fn test_provider_message_is_surfaced_when_present() {
        let err = Error::Provider {
            status: Some(400),
            message: "Invalid Signature abc".to_string(),
        };

        assert_eq!(err.client_message(), "Upload failed: Invalid Signature abc");
        assert!(err.to_string().contains("status 400"));
    }

    #[test]
    fn test_config_error_hides_details() {
        let err = Error::Config("CLOUDINARY_API_SECRET not set".to_string());
        assert!(!err.client_message().contains("SECRET"));
        assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_batch_failure_reads_like_its_first_failure() {
        let rejected = Error::BatchUpload {
            failed: 1,
            total: 2,
            first: Box::new(Error::Provider {
                status: Some(400),
                message: "File size too large.".to_string(),
            }),
        };
        assert_eq!(rejected.client_message(), "Upload failed: File size too large.");
        assert!(rejected.to_string().starts_with("1 of 2 uploads failed"));

        let unreachable = Error::BatchUpload {
            failed: 2,
            total: 2,
            first: Box::new(Error::SignatureFetch("connection refused".to_string())),
        };
        assert_eq!(unreachable.client_message(), "Upload failed");
    }
}
