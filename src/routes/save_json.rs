//! JSON persistence endpoint
//!
//! POST /save-json stores the decoded payload, pretty-printed, at the
//! configured path. Each request overwrites the previous file.

use axum::{body::Bytes, extract::State, routing::post, Router};
use serde::{Deserialize, Serialize};

use crate::error::{AppError, Result};
use crate::state::AppState;

/// Body accepted by the endpoint. Missing fields take their zero value.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DataPayload {
    pub message: String,
    pub number: i64,
}

pub fn router() -> Router<AppState> {
    Router::new().route(
        "/",
        post(save_json).fallback(|| async { AppError::MethodNotAllowed("POST") }),
    )
}

async fn save_json(State(state): State<AppState>, body: Bytes) -> Result<String> {
    let payload = decode_payload(&body)?;

    let path = &state.config().storage.json_output_path;
    let mut contents = serde_json::to_string_pretty(&payload)
        .map_err(|e| AppError::Internal(format!("Failed to encode JSON: {}", e)))?;
    contents.push('\n');

    tokio::fs::write(path, contents).await.map_err(|e| {
        AppError::Internal(format!(
            "Failed to write JSON to {}: {}",
            path.display(),
            e
        ))
    })?;

    tracing::info!(path = %path.display(), number = payload.number, "Saved JSON payload");

    Ok(format!(
        "JSON payload successfully written to {}\n",
        path.display()
    ))
}

/// Decode the first JSON value of the body.
///
/// Anything after that value is ignored. A `null` value stores the zero
/// payload. An empty body is rejected.
fn decode_payload(body: &[u8]) -> Result<DataPayload> {
    let mut values = serde_json::Deserializer::from_slice(body).into_iter::<Option<DataPayload>>();
    match values.next() {
        Some(Ok(payload)) => Ok(payload.unwrap_or_default()),
        Some(Err(e)) => {
            tracing::debug!("Rejected JSON payload: {}", e);
            Err(AppError::BadRequest("Invalid JSON payload.".to_string()))
        }
        None => Err(AppError::BadRequest("Invalid JSON payload.".to_string())),
    }
}
