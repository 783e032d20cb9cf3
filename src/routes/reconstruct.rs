//! Reconstruction endpoint
//!
//! POST /reconstruct runs the streaming reconstructor on a blocking worker
//! and reports how many bytes landed on disk.

use std::path::PathBuf;

use axum::{extract::State, routing::post, Json, Router};
use serde::{Deserialize, Serialize};

use crate::error::{AppError, Result};
use crate::reconstruct::{ProgressCadence, ReconstructionJob};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReconstructRequest {
    pub chunk_size: usize,
    pub total_size: u64,
    /// Defaults to the configured output path
    #[serde(default)]
    pub destination: Option<PathBuf>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReconstructResponse {
    pub destination: PathBuf,
    pub bytes_written: u64,
}

pub fn router() -> Router<AppState> {
    Router::new().route(
        "/",
        post(reconstruct).fallback(|| async { AppError::MethodNotAllowed("POST") }),
    )
}

async fn reconstruct(
    State(state): State<AppState>,
    Json(request): Json<ReconstructRequest>,
) -> Result<Json<ReconstructResponse>> {
    let config = &state.config().reconstruct;
    if request.total_size > config.max_request_size {
        return Err(AppError::BadRequest(format!(
            "totalSize {} exceeds the limit of {} bytes",
            request.total_size, config.max_request_size
        )));
    }

    let job = ReconstructionJob::new(
        request.chunk_size,
        request.total_size,
        request
            .destination
            .unwrap_or_else(|| config.output_path.clone()),
    );
    let cadence = ProgressCadence::from_step(config.progress_step);

    let destination = job.destination.clone();
    let bytes_written = tokio::task::spawn_blocking(move || {
        job.run(cadence, &mut |written: u64, total: u64| {
            tracing::debug!(written, total, "Reconstruction progress");
        })
    })
    .await
    .map_err(|e| AppError::Internal(format!("Reconstruction task failed: {}", e)))??;

    Ok(Json(ReconstructResponse {
        destination,
        bytes_written,
    }))
}
