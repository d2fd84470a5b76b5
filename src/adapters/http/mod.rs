pub mod routes;
pub mod state;

use axum::{extract::DefaultBodyLimit, routing::{get, post}, Router};
use crate::adapters::http::state::HttpState;

/// Largest accepted image upload.
pub const MAX_IMAGE_BYTES: usize = 32 * 1024 * 1024;

pub fn router(state: HttpState) -> Router {
    Router::new()
        .route("/api/health", get(routes::health))
        .route("/api/config", get(routes::get_config))
        .route("/api/config", post(routes::apply_config))
        .route("/api/detect", post(routes::detect))
        .route("/api/detect/overlay", post(routes::detect_overlay))
        .layer(DefaultBodyLimit::max(MAX_IMAGE_BYTES))
        .with_state(state)
}
