//! Square endpoint
//!
//! GET /square?number=n

use axum::{extract::Query, routing::get, Router};
use serde::Deserialize;

use crate::error::{AppError, Result};
use crate::native;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct SquareQuery {
    number: Option<String>,
}

pub fn router() -> Router<AppState> {
    Router::new().route(
        "/",
        get(square).fallback(|| async { AppError::MethodNotAllowed("GET") }),
    )
}

async fn square(Query(query): Query<SquareQuery>) -> Result<String> {
    let raw = query
        .number
        .filter(|n| !n.is_empty())
        .ok_or_else(|| AppError::BadRequest("Missing 'number' query parameter".to_string()))?;

    let n: i32 = raw.trim().parse().map_err(|_| {
        AppError::BadRequest("Invalid 'number' query parameter. Must be an integer.".to_string())
    })?;

    let result = native::square(n);
    tracing::debug!(n, result, "Squared number");

    Ok(format!("The square of {} is {}\n", n, result))
}
