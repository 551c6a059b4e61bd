use super::AppState;
use crate::models::{UploadRequest, UploadSignature};
use crate::signature::client::SIGNATURE_PATH;
use crate::Result;
use axum::{
    extract::{rejection::JsonRejection, State},
    routing::post,
    Json, Router,
};
use tracing::info;

pub fn router() -> Router<AppState> {
    Router::new().route(SIGNATURE_PATH, post(create_signature))
}

/// Grant a signature for uploading into the requested folder. The response
/// carries the public account parameters only.
async fn create_signature(
    State(state): State<AppState>,
    payload: std::result::Result<Json<UploadRequest>, JsonRejection>,
) -> Result<Json<UploadSignature>> {
    let Json(request) = payload?;
    let signature = state.issuer.issue(&request)?;
    info!(folder = %request.folder, "Signed upload request");
    Ok(Json(signature))
}
