use super::AppState;
use crate::catalog::{CatalogFilter, CatalogKind};
use crate::Result;
use axum::{
    extract::{Path, Query, State},
    routing::get,
    Json, Router,
};
use serde_json::Value;

pub fn router() -> Router<AppState> {
    [
        CatalogKind::Accommodations,
        CatalogKind::Destinations,
        CatalogKind::Itineraries,
    ]
    .into_iter()
    .fold(Router::new(), |router, kind| router.merge(kind_router(kind)))
}

fn kind_router(kind: CatalogKind) -> Router<AppState> {
    Router::new()
        .route(
            &format!("/api/{}", kind),
            get(
                move |State(state): State<AppState>, Query(filter): Query<CatalogFilter>| async move {
                    list_items(kind, &state, &filter)
                },
            ),
        )
        .route(
            &format!("/api/{}/{{id}}", kind),
            get(
                move |State(state): State<AppState>, Path(id): Path<String>| async move {
                    get_item(kind, &state, &id)
                },
            ),
        )
}

fn list_items(kind: CatalogKind, state: &AppState, filter: &CatalogFilter) -> Result<Json<Value>> {
    Ok(Json(state.catalog.filtered_json(kind, filter)?))
}

fn get_item(kind: CatalogKind, state: &AppState, id: &str) -> Result<Json<Value>> {
    Ok(Json(state.catalog.item_json(kind, id)?))
}
