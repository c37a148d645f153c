//! Request handlers for the category API.

use axum::Json;
use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use semcat_categories::{ListedCategory, SearchResult};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::AppState;
use crate::error::ApiError;

/// Response for `GET /categories`.
#[derive(Debug, Serialize, Deserialize)]
pub struct ListResponse {
    pub items: Vec<ListedCategory>,
}

/// Body of `POST /categories`.
#[derive(Debug, Deserialize)]
pub struct CreateRequest {
    #[serde(default)]
    pub name: String,
}

/// Response for `DELETE /categories/{id}`.
#[derive(Debug, Serialize, Deserialize)]
pub struct DeleteResponse {
    pub ok: bool,
}

/// Body of `POST /search`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchRequest {
    #[serde(default)]
    pub query: String,
    pub top_k: Option<usize>,
    pub threshold: Option<f32>,
}

/// Response for `POST /search`.
#[derive(Debug, Serialize, Deserialize)]
pub struct SearchResponse {
    pub results: Vec<SearchResult>,
}

/// Handler for `GET /healthz`
pub async fn healthz() -> &'static str {
    "ok"
}

/// Handler for `GET /categories`
pub async fn list_categories(
    State(state): State<AppState>,
) -> Result<Json<ListResponse>, ApiError> {
    let items = state.service.list().await?;
    Ok(Json(ListResponse { items }))
}

/// Handler for `POST /categories`
pub async fn create_category(
    State(state): State<AppState>,
    body: Result<Json<CreateRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<ListedCategory>), ApiError> {
    let Json(request) = body?;
    let category = state.service.register(&request.name).await?;
    Ok((StatusCode::CREATED, Json(ListedCategory::from(&category))))
}

/// Handler for `DELETE /categories/{id}`
pub async fn delete_category(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<DeleteResponse>, ApiError> {
    state.service.remove(&id).await?;
    Ok(Json(DeleteResponse { ok: true }))
}

/// Handler for `POST /search`
pub async fn search(
    State(state): State<AppState>,
    body: Result<Json<SearchRequest>, JsonRejection>,
) -> Result<Json<SearchResponse>, ApiError> {
    let Json(request) = body?;

    let mut options = state.service.search_defaults();
    if let Some(top_k) = request.top_k {
        options = options.with_top_k(top_k);
    }
    if let Some(threshold) = request.threshold {
        options = options.with_threshold(threshold);
    }
    debug!("Search request: top_k={}, threshold={}", options.top_k, options.threshold);

    let results = state.service.search(&request.query, options).await?;
    Ok(Json(SearchResponse { results }))
}
