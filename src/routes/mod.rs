//! HTTP routes
//!
//! - `POST /api/cloudinary/signature` - upload signature issuer
//! - `GET /api/{accommodations,destinations,itineraries}` - filtered catalog
//! - `GET /api/{kind}/{id}` - single catalog item
//! - `GET /api/health` - health check

pub mod catalog;
pub mod health;
pub mod signature;

use crate::catalog::Catalog;
use crate::config::ServerConfig;
use crate::signing::SignatureIssuer;
use crate::{Error, Result};
use axum::http::{header, HeaderValue, Method};
use axum::Router;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::info;

/// Immutable state shared by every handler.
#[derive(Clone)]
pub struct AppState {
    pub issuer: Arc<SignatureIssuer>,
    pub catalog: Arc<Catalog>,
}

impl AppState {
    pub fn new(issuer: SignatureIssuer, catalog: Catalog) -> Self {
        Self {
            issuer: Arc::new(issuer),
            catalog: Arc::new(catalog),
        }
    }
}

pub fn create_router(state: AppState) -> Router {
    Router::new()
        .merge(signature::router())
        .merge(catalog::router())
        .merge(health::router())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Allow the site's front end to call the API from the browser.
pub fn apply_cors(router: Router, allowed_origin: Option<&str>) -> Result<Router> {
    let cors = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([header::CONTENT_TYPE]);

    let cors = match allowed_origin {
        Some(origin) => cors.allow_origin(origin.parse::<HeaderValue>().map_err(|_| {
            Error::Config(format!("Invalid CORS_ALLOWED_ORIGIN '{}'", origin))
        })?),
        None => cors.allow_origin(Any),
    };

    Ok(router.layer(cors))
}

/// Load state from `config` and serve until the process is stopped.
pub async fn serve(config: ServerConfig) -> Result<()> {
    let issuer = SignatureIssuer::new(config.credentials.clone(), config.upload_preset.clone())
        .with_algorithm(config.signature_algorithm);
    let catalog = Catalog::from_file(&config.catalog_path)?;

    let router = apply_cors(
        create_router(AppState::new(issuer, catalog)),
        config.cors_allowed_origin.as_deref(),
    )?;

    let listener = TcpListener::bind(config.bind_addr).await?;
    info!("Server listening on {}", config.bind_addr);

    axum::serve(listener, router).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{ApiSecret, CloudinaryCredentials};
    use crate::models::UploadSignature;
    use crate::signing::{self, SignatureAlgorithm, UploadParams};
    use axum::body::{to_bytes, Body};
    use axum::http::{Request, StatusCode};
    use serde_json::Value;
    use tower::ServiceExt;

    const SECRET: &str = "router-secret";

    fn test_state() -> AppState {
        let issuer = SignatureIssuer::new(
            CloudinaryCredentials {
                cloud_name: "wayfarer".to_string(),
                api_key: "777".to_string(),
                api_secret: ApiSecret::new(SECRET),
            },
            "site_uploads",
        );
        let catalog = Catalog::from_json(
            r#"{
                "accommodations": [
                    {"id": "ubud-villa", "name": "Ubud Villa", "destination": "bali", "category": "villa"},
                    {"id": "lima-hotel", "name": "Lima Hotel", "destination": "peru", "category": "hotel"}
                ]
            }"#,
        )
        .unwrap();
        AppState::new(issuer, catalog)
    }

    async fn send(request: Request<Body>) -> (StatusCode, String) {
        let response = create_router(test_state()).oneshot(request).await.unwrap();
        let status = response.status();
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, String::from_utf8(body.to_vec()).unwrap())
    }

    fn post_json(uri: &str, body: &str) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    fn get(uri: &str) -> Request<Body> {
        Request::builder().uri(uri).body(Body::empty()).unwrap()
    }

    #[tokio::test]
    async fn test_signature_endpoint_returns_verifiable_signature() {
        let (status, body) = send(post_json(
            "/api/cloudinary/signature",
            r#"{"folder":"destinations"}"#,
        ))
        .await;

        assert_eq!(status, StatusCode::OK);
        assert!(!body.contains(SECRET));

        let signature: UploadSignature = serde_json::from_str(&body).unwrap();
        assert_eq!(signature.cloud_name, "wayfarer");
        assert_eq!(signature.api_key, "777");
        assert_eq!(signature.upload_preset, "site_uploads");

        let params = UploadParams::for_upload("destinations", &signature);
        assert!(signing::verify(
            &params,
            &signature.signature,
            &ApiSecret::new(SECRET),
            SignatureAlgorithm::Sha1,
            signature.timestamp
        )
        .is_ok());
    }

    #[tokio::test]
    async fn test_signature_endpoint_rejects_bad_folder() {
        let (status, body) = send(post_json(
            "/api/cloudinary/signature",
            r#"{"folder":"../../etc"}"#,
        ))
        .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        let json: Value = serde_json::from_str(&body).unwrap();
        assert!(json["error"].as_str().unwrap().contains("Invalid folder"));
    }

    #[tokio::test]
    async fn test_signature_endpoint_rejects_malformed_body_as_json() {
        let (status, body) = send(post_json(
            "/api/cloudinary/signature",
            r#"{"folder": 5}"#,
        ))
        .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        let json: Value = serde_json::from_str(&body).unwrap();
        assert!(json["error"]
            .as_str()
            .unwrap()
            .starts_with("Invalid request body"));
    }

    #[tokio::test]
    async fn test_signature_endpoint_requires_json_content_type() {
        let request = Request::builder()
            .method("POST")
            .uri("/api/cloudinary/signature")
            .body(Body::from(r#"{"folder":"blog"}"#))
            .unwrap();
        let (status, body) = send(request).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        let json: Value = serde_json::from_str(&body).unwrap();
        assert!(json["error"].is_string());
    }

    #[tokio::test]
    async fn test_catalog_listing_applies_query_filter() {
        let (status, body) = send(get("/api/accommodations?destination=peru&category=all")).await;

        assert_eq!(status, StatusCode::OK);
        let items: Vec<Value> = serde_json::from_str(&body).unwrap();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0]["id"], "lima-hotel");
    }

    #[tokio::test]
    async fn test_catalog_listing_without_filter_returns_everything() {
        let (_, body) = send(get("/api/accommodations")).await;
        let items: Vec<Value> = serde_json::from_str(&body).unwrap();
        assert_eq!(items.len(), 2);

        let (_, body) = send(get("/api/itineraries?destination=bali")).await;
        assert_eq!(body, "[]");
    }

    #[tokio::test]
    async fn test_catalog_item_lookup() {
        let (status, body) = send(get("/api/accommodations/ubud-villa")).await;
        assert_eq!(status, StatusCode::OK);
        let item: Value = serde_json::from_str(&body).unwrap();
        assert_eq!(item["name"], "Ubud Villa");

        let (status, _) = send(get("/api/destinations/atlantis")).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_health_check() {
        let (status, body) = send(get("/api/health")).await;
        assert_eq!(status, StatusCode::OK);
        let json: Value = serde_json::from_str(&body).unwrap();
        assert_eq!(json["status"], "ok");
    }

    #[test]
    fn test_invalid_cors_origin_is_config_error() {
        let router = create_router(test_state());
        let result = apply_cors(router, Some("bad\norigin"));
        assert!(matches!(result, Err(Error::Config(_))));
    }
}
