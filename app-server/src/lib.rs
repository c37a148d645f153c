//! HTTP surface and command-line front end for the semantic category store.

pub mod config;
pub mod error;
pub mod handlers;
pub mod render;

use axum::Router;
use axum::routing::{delete, get, post};
use semcat_categories::CategoryService;
use tower_http::trace::TraceLayer;

pub use config::{EmbeddingConfig, ProviderKind, ServerConfig};
pub use error::ApiError;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub service: CategoryService,
}

/// Build the router for `service`.
///
/// Routes are served both at the root and under `/api`.
pub fn router(service: CategoryService) -> Router {
    let api = Router::new()
        .route(
            "/categories",
            get(handlers::list_categories).post(handlers::create_category),
        )
        .route("/categories/{id}", delete(handlers::delete_category))
        .route("/search", post(handlers::search));

    Router::new()
        .route("/healthz", get(handlers::healthz))
        .merge(api.clone())
        .nest("/api", api)
        .layer(TraceLayer::new_for_http())
        .with_state(AppState { service })
}
