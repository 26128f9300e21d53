pub mod routes;
pub mod state;

use axum::{extract::DefaultBodyLimit, routing::{get, post}, Router};
use tower_http::trace::TraceLayer;
use crate::adapters::http::state::HttpState;

/// Las fotos de la cámara pueden superar el límite por defecto de axum.
pub const MAX_IMAGE_BYTES: usize = 16 * 1024 * 1024;

pub fn router(state: HttpState) -> Router {
    Router::new()
        .route("/api/config", get(routes::get_config))
        .route("/api/theme", get(routes::get_theme))
        .route("/api/status", get(routes::get_status))
        .route("/api/scan", post(routes::scan))
        .layer(DefaultBodyLimit::max(MAX_IMAGE_BYTES))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
