//! Configuration loaded from the environment (and `.env` via dotenvy).
//!
//! The server and the upload client need different settings: only the
//! server ever sees the API secret.

use crate::signing::SignatureAlgorithm;
use crate::{Error, Result};
use std::fmt;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_PORT: u16 = 3001;
pub const DEFAULT_CATALOG_PATH: &str = "data/catalog.json";
pub const DEFAULT_SIGNATURE_ENDPOINT: &str = "http://localhost:3001";
pub const DEFAULT_API_BASE: &str = "https://api.cloudinary.com";

/// Provider API secret. Never serialized; `Debug` is redacted.
#[derive(Clone, PartialEq, Eq)]
pub struct ApiSecret(String);

impl ApiSecret {
    pub fn new(secret: impl Into<String>) -> Self {
        Self(secret.into())
    }

    pub(crate) fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for ApiSecret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ApiSecret(<redacted>)")
    }
}

#[derive(Debug, Clone)]
pub struct CloudinaryCredentials {
    pub cloud_name: String,
    pub api_key: String,
    pub api_secret: ApiSecret,
}

impl CloudinaryCredentials {
    /// Parse a `cloudinary://<api_key>:<api_secret>@<cloud_name>` URL.
    pub fn from_url(raw: &str) -> Result<Self> {
        let url = reqwest::Url::parse(raw)
            .map_err(|e| Error::Config(format!("Invalid CLOUDINARY_URL: {}", e)))?;

        if url.scheme() != "cloudinary" {
            return Err(Error::Config(format!(
                "CLOUDINARY_URL must use the cloudinary:// scheme, got '{}'",
                url.scheme()
            )));
        }

        let cloud_name = url.host_str().unwrap_or_default().to_string();
        let api_key = url.username().to_string();
        let api_secret = url.password().unwrap_or_default().to_string();

        if cloud_name.is_empty() || api_key.is_empty() || api_secret.is_empty() {
            return Err(Error::Config(
                "CLOUDINARY_URL must include api key, api secret and cloud name".to_string(),
            ));
        }

        Ok(Self {
            cloud_name,
            api_key,
            api_secret: ApiSecret::new(api_secret),
        })
    }

    fn from_lookup(lookup: &impl Fn(&str) -> Option<String>) -> Result<Self> {
        if let Some(url) = lookup("CLOUDINARY_URL") {
            return Self::from_url(&url);
        }

        let required = |name: &str| {
            lookup(name).ok_or_else(|| Error::Config(format!("{} not set", name)))
        };

        Ok(Self {
            cloud_name: required("CLOUDINARY_CLOUD_NAME")?,
            api_key: required("CLOUDINARY_API_KEY")?,
            api_secret: ApiSecret::new(required("CLOUDINARY_API_SECRET")?),
        })
    }
}

/// Settings for the signature issuer (`serve` and `sign`).
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub bind_addr: SocketAddr,
    pub credentials: CloudinaryCredentials,
    pub upload_preset: String,
    pub signature_algorithm: SignatureAlgorithm,
    pub catalog_path: PathBuf,
    pub cors_allowed_origin: Option<String>,
}

impl ServerConfig {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(env_var)
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let credentials = CloudinaryCredentials::from_lookup(&lookup)?;

        let host = lookup("HOST").unwrap_or_else(|| "0.0.0.0".to_string());
        let port = match lookup("PORT") {
            Some(raw) => raw
                .parse::<u16>()
                .map_err(|_| Error::Config(format!("Invalid PORT '{}'", raw)))?,
            None => DEFAULT_PORT,
        };
        let bind_addr = format!("{}:{}", host, port)
            .parse::<SocketAddr>()
            .map_err(|e| Error::Config(format!("Invalid HOST/PORT: {}", e)))?;

        let signature_algorithm = match lookup("CLOUDINARY_SIGNATURE_ALGORITHM") {
            Some(raw) => raw.parse()?,
            None => SignatureAlgorithm::default(),
        };

        Ok(Self {
            bind_addr,
            credentials,
            upload_preset: lookup("CLOUDINARY_UPLOAD_PRESET").unwrap_or_default(),
            signature_algorithm,
            catalog_path: lookup("CATALOG_PATH")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_CATALOG_PATH)),
            cors_allowed_origin: lookup("CORS_ALLOWED_ORIGIN"),
        })
    }
}

/// Settings for the upload client. Holds no secrets.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub signature_endpoint: String,
    pub api_base: String,
    pub timeout: Option<Duration>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            signature_endpoint: DEFAULT_SIGNATURE_ENDPOINT.to_string(),
            api_base: DEFAULT_API_BASE.to_string(),
            timeout: None,
        }
    }
}

impl ClientConfig {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(env_var)
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let defaults = Self::default();

        let timeout = match lookup("UPLOAD_TIMEOUT_SECS") {
            Some(raw) => Some(Duration::from_secs(raw.parse::<u64>().map_err(|_| {
                Error::Config(format!("Invalid UPLOAD_TIMEOUT_SECS '{}'", raw))
            })?)),
            None => None,
        };

        Ok(Self {
            signature_endpoint: lookup("SIGNATURE_ENDPOINT")
                .map(|url| url.trim_end_matches('/').to_string())
                .unwrap_or(defaults.signature_endpoint),
            api_base: lookup("CLOUDINARY_API_BASE")
                .map(|url| url.trim_end_matches('/').to_string())
                .unwrap_or(defaults.api_base),
            timeout,
        })
    }
}

/// Catalog location for the `catalog` command, which needs no credentials.
pub fn catalog_path_from_env() -> PathBuf {
    dotenvy::dotenv().ok();
    env_var("CATALOG_PATH")
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CATALOG_PATH))
}

fn env_var(name: &str) -> Option<String> {
    std::env::var(name)
        .ok()
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}
