pub mod health;

use std::path::Path;

use axum::{
    routing::{get, post},
    Router,
};
use tower_http::services::{ServeDir, ServeFile};
use tracing::info;

use crate::analysis::handlers;
use crate::state::AppState;

/// Builds the API router. When `static_dir` holds a front-end build it is
/// served for every other path, with `index.html` as the client-side routing fallback.
pub fn build_router(state: AppState, static_dir: Option<&Path>) -> Router {
    let router = Router::new()
        .route("/health", get(health::health_handler))
        .route("/analyze", post(handlers::handle_analyze))
        .with_state(state);

    match static_dir {
        Some(dir) if dir.is_dir() => {
            info!("Serving front end from {}", dir.display());
            let index = ServeFile::new(dir.join("index.html"));
            router.fallback_service(ServeDir::new(dir).fallback(index))
        }
        _ => router,
    }
}
