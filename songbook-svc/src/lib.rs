//! songbook-svc library - music catalog service
//!
//! Groups and their songs, with paginated and filtered listings, verse
//! paging over stored lyrics, and soft-delete.

use std::sync::Arc;

use axum::Router;
use sqlx::SqlitePool;
use tower_http::trace::TraceLayer;

pub mod api;
pub mod catalog;
pub mod error;
pub mod gateway;
pub mod logging;

pub use catalog::Catalog;
pub use error::{ApiError, ApiResult};
pub use gateway::{CatalogGateway, SqliteGateway};

/// Application state shared across HTTP handlers
#[derive(Clone)]
pub struct AppState {
    pub catalog: Catalog,
}

impl AppState {
    pub fn new(catalog: Catalog) -> Self {
        Self { catalog }
    }

    /// State backed by a SQLite pool
    pub fn with_pool(pool: SqlitePool, query_timeout_ms: u64) -> Self {
        let gateway = SqliteGateway::new(pool, std::time::Duration::from_millis(query_timeout_ms));
        Self::new(Catalog::new(Arc::new(gateway)))
    }
}

/// Build application router
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .merge(api::group_routes())
        .merge(api::song_routes())
        .merge(api::health_routes())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
