//! Route modules for the HTTP surface

pub mod buffer;
pub mod health;
pub mod reconstruct;
pub mod save_json;
pub mod square;
pub mod upload;

use axum::Router;
use tower_http::trace::TraceLayer;

use crate::state::AppState;

/// Build the full application router
pub fn build_router(state: AppState) -> Router {
    let max_body_bytes = state.config().upload.max_body_bytes;

    Router::new()
        .nest("/health", health::router())
        .nest("/square", square::router())
        .nest("/save-json", save_json::router())
        .nest("/upload-file", upload::router(max_body_bytes))
        .nest("/buffer", buffer::router())
        .nest("/reconstruct", reconstruct::router())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
