//! Upload signing
//!
//! The provider authenticates direct uploads by re-deriving a digest over the
//! upload parameters and the account secret. The server signs exactly the
//! parameters the client will later send, so any substitution after signing
//! (a different folder, preset or timestamp) fails provider-side.
//!
//! Digest: sort the non-empty parameters by name, join them as `key=value`
//! pairs separated by `&`, append the API secret, then hex-encode the hash of
//! the result. The hash is SHA-1 unless the account has been switched to
//! SHA-256, see [`SignatureAlgorithm`].

use crate::config::{ApiSecret, CloudinaryCredentials};
use crate::models::{UploadRequest, UploadSignature};
use crate::signature::SignatureService;
use crate::{Error, Result};
use async_trait::async_trait;
use chrono::Utc;
use sha1::Sha1;
use sha2::{Digest, Sha256};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use subtle::ConstantTimeEq;
use thiserror::Error;
use validator::Validate;

/// How long the provider accepts a signed timestamp, in seconds.
pub const SIGNATURE_MAX_AGE_SECS: i64 = 3600;

/// The parameter set covered by a signature.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadParams {
    pub folder: String,
    pub upload_preset: String,
    pub timestamp: i64,
}

impl UploadParams {
    pub fn new(
        folder: impl Into<String>,
        upload_preset: impl Into<String>,
        timestamp: i64,
    ) -> Self {
        Self {
            folder: folder.into(),
            upload_preset: upload_preset.into(),
            timestamp,
        }
    }

    /// Parameters an upload into `folder` will carry under `signature`.
    pub fn for_upload(folder: &str, signature: &UploadSignature) -> Self {
        Self::new(folder, signature.upload_preset.clone(), signature.timestamp)
    }

    /// Name/value pairs that are both signed and sent, sorted by name.
    /// Empty values are left out on both sides.
    pub fn signed_pairs(&self) -> BTreeMap<&'static str, String> {
        let mut pairs = BTreeMap::new();
        if !self.folder.is_empty() {
            pairs.insert("folder", self.folder.clone());
        }
        pairs.insert("timestamp", self.timestamp.to_string());
        if !self.upload_preset.is_empty() {
            pairs.insert("upload_preset", self.upload_preset.clone());
        }
        pairs
    }

    pub fn string_to_sign(&self) -> String {
        self.signed_pairs()
            .iter()
            .map(|(key, value)| format!("{}={}", key, value))
            .collect::<Vec<_>>()
            .join("&")
    }
}

/// Hash the provider account expects signatures to use.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SignatureAlgorithm {
    #[default]
    Sha1,
    Sha256,
}

impl SignatureAlgorithm {
    fn digest(self, parts: &[&[u8]]) -> String {
        match self {
            SignatureAlgorithm::Sha1 => hex_digest::<Sha1>(parts),
            SignatureAlgorithm::Sha256 => hex_digest::<Sha256>(parts),
        }
    }
}

fn hex_digest<D: Digest>(parts: &[&[u8]]) -> String {
    let mut hasher = D::new();
    for part in parts {
        hasher.update(*part);
    }
    hex::encode(hasher.finalize())
}

impl FromStr for SignatureAlgorithm {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "sha1" => Ok(SignatureAlgorithm::Sha1),
            "sha256" => Ok(SignatureAlgorithm::Sha256),
            other => Err(Error::Config(format!(
                "Unsupported signature algorithm '{}', expected sha1 or sha256",
                other
            ))),
        }
    }
}

impl fmt::Display for SignatureAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SignatureAlgorithm::Sha1 => f.write_str("sha1"),
            SignatureAlgorithm::Sha256 => f.write_str("sha256"),
        }
    }
}

pub fn sign(
    params: &UploadParams,
    secret: &ApiSecret,
    algorithm: SignatureAlgorithm,
) -> String {
    algorithm.digest(&[
        params.string_to_sign().as_bytes(),
        secret.expose().as_bytes(),
    ])
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SignatureRejection {
    #[error("Stale request - reported time is {timestamp} which is more than {max_age} seconds away from {now}")]
    Stale {
        timestamp: i64,
        now: i64,
        max_age: i64,
    },

    #[error("Invalid Signature {signature}. String to sign - '{string_to_sign}'.")]
    Mismatch {
        signature: String,
        string_to_sign: String,
    },
}

/// Check a signature the way the provider does: freshness first, then a
/// constant-time comparison against the re-derived digest.
pub fn verify(
    params: &UploadParams,
    signature: &str,
    secret: &ApiSecret,
    algorithm: SignatureAlgorithm,
    now: i64,
) -> std::result::Result<(), SignatureRejection> {
    if now.abs_diff(params.timestamp) > SIGNATURE_MAX_AGE_SECS.unsigned_abs() {
        return Err(SignatureRejection::Stale {
            timestamp: params.timestamp,
            now,
            max_age: SIGNATURE_MAX_AGE_SECS,
        });
    }

    let expected = sign(params, secret, algorithm);
    if bool::from(expected.as_bytes().ct_eq(signature.as_bytes())) {
        Ok(())
    } else {
        Err(SignatureRejection::Mismatch {
            signature: signature.to_string(),
            string_to_sign: params.string_to_sign(),
        })
    }
}

/// Grants upload signatures on behalf of the configured account.
#[derive(Debug, Clone)]
pub struct SignatureIssuer {
    credentials: CloudinaryCredentials,
    upload_preset: String,
    algorithm: SignatureAlgorithm,
}

impl SignatureIssuer {
    pub fn new(credentials: CloudinaryCredentials, upload_preset: impl Into<String>) -> Self {
        Self {
            credentials,
            upload_preset: upload_preset.into(),
            algorithm: SignatureAlgorithm::default(),
        }
    }

    pub fn with_algorithm(mut self, algorithm: SignatureAlgorithm) -> Self {
        self.algorithm = algorithm;
        self
    }

    /// Sign `request` with the current unix time.
    pub fn issue(&self, request: &UploadRequest) -> Result<UploadSignature> {
        self.issue_at(request, Utc::now().timestamp())
    }

    pub fn issue_at(&self, request: &UploadRequest, timestamp: i64) -> Result<UploadSignature> {
        request
            .validate()
            .map_err(|e| Error::Validation(format!("Invalid folder: {}", e)))?;

        let params = UploadParams::new(
            request.folder.clone(),
            self.upload_preset.clone(),
            timestamp,
        );
        let signature = sign(&params, &self.credentials.api_secret, self.algorithm);

        tracing::debug!(
            folder = %request.folder,
            timestamp,
            algorithm = %self.algorithm,
            "Issued upload signature"
        );

        Ok(UploadSignature {
            signature,
            timestamp,
            cloud_name: self.credentials.cloud_name.clone(),
            api_key: self.credentials.api_key.clone(),
            upload_preset: self.upload_preset.clone(),
        })
    }
}

#[async_trait]
impl SignatureService for SignatureIssuer {
    async fn fetch_signature(&self, folder: &str) -> Result<UploadSignature> {
        self.issue(&UploadRequest::new(folder))
    }
}
