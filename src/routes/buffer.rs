//! Buffer inspection routes
//!
//! Expose the same in-memory buffer the console menu edits.
//!
//! Endpoints:
//! - GET /buffer - Current text and hex of the buffer
//! - POST /buffer/byte - Overwrite one byte

use axum::{extract::State, routing::get, routing::post, Json, Router};
use serde::{Deserialize, Serialize};

use crate::buffer::{parse_hex_byte, LoadedBuffer};
use crate::error::{AppError, Result};
use crate::state::AppState;

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BufferView {
    pub text: String,
    pub hex: Vec<String>,
    pub length: usize,
}

impl From<&LoadedBuffer> for BufferView {
    fn from(buffer: &LoadedBuffer) -> Self {
        let bytes = buffer.snapshot();
        Self {
            text: String::from_utf8_lossy(&bytes).into_owned(),
            hex: bytes.iter().map(|b| format!("{:02X}", b)).collect(),
            length: bytes.len(),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct SetByteRequest {
    pub index: i64,
    /// Hex byte such as `5A` or `0x5A`
    pub value: String,
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(show_buffer).fallback(|| async { AppError::MethodNotAllowed("GET") }),
        )
        .route(
            "/byte",
            post(set_byte).fallback(|| async { AppError::MethodNotAllowed("POST") }),
        )
}

async fn show_buffer(State(state): State<AppState>) -> Json<BufferView> {
    let buffer = state.buffer().ensure_loaded();
    Json(BufferView::from(&buffer))
}

async fn set_byte(
    State(state): State<AppState>,
    Json(request): Json<SetByteRequest>,
) -> Result<Json<BufferView>> {
    let value = parse_hex_byte(&request.value)?;
    let buffer = state.buffer().ensure_loaded();
    buffer.set_byte(request.index, value)?;

    tracing::info!(index = request.index, value = %request.value, "Buffer modified over HTTP");

    Ok(Json(BufferView::from(&buffer)))
}
