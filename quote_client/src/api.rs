//! HTTP read API over the `QuoteCache`.
//!
//! - `GET /health` — liveness with the current server time.
//! - `GET /quotes` — every cached `symbol → price`, or 503 while nothing has arrived yet.
//! - `GET /quotes/{symbol}` — one cached price, or 404 for an unknown symbol.

use std::collections::HashMap;
use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
};
use chrono::{SecondsFormat, Utc};
use serde::Serialize;
use thiserror::Error;

use crate::cache::QuoteCache;

/// Outcome of a cache read that produced no value.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ReadError {
    /// Nothing has been received from the generator yet.
    #[error("no quotes available yet")]
    Unavailable,
    /// The symbol is not in the cache.
    #[error("not found")]
    NotFound(String),
}

/// Every cached price; `Unavailable` while the cache is empty.
pub fn get_all(cache: &QuoteCache) -> Result<HashMap<String, f64>, ReadError> {
    let quotes = cache.get_all();
    if quotes.is_empty() {
        return Err(ReadError::Unavailable);
    }
    Ok(quotes)
}

/// Cached price of exactly `symbol`.
pub fn get_one(cache: &QuoteCache, symbol: &str) -> Result<f64, ReadError> {
    cache
        .get(symbol)
        .ok_or_else(|| ReadError::NotFound(symbol.to_string()))
}

/// Error payload returned to HTTP callers.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub symbol: Option<String>,
}

/// API error type
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub body: ErrorResponse,
}

impl From<ReadError> for ApiError {
    fn from(err: ReadError) -> Self {
        let error = err.to_string();
        match err {
            ReadError::Unavailable => ApiError {
                status: StatusCode::SERVICE_UNAVAILABLE,
                body: ErrorResponse {
                    error,
                    symbol: None,
                },
            },
            ReadError::NotFound(symbol) => ApiError {
                status: StatusCode::NOT_FOUND,
                body: ErrorResponse {
                    error,
                    symbol: Some(symbol),
                },
            },
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(self.body)).into_response()
    }
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub time: String,
}

#[derive(Debug, Serialize)]
pub struct QuoteResponse {
    pub symbol: String,
    pub price: f64,
}

/// Create the consumer router
pub fn create_router(cache: Arc<QuoteCache>) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/quotes", get(all_quotes))
        .route("/quotes/{symbol}", get(one_quote))
        .with_state(cache)
}

/// GET /health
async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy",
        time: Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true),
    })
}

/// GET /quotes
async fn all_quotes(
    State(cache): State<Arc<QuoteCache>>,
) -> Result<Json<HashMap<String, f64>>, ApiError> {
    Ok(Json(get_all(&cache)?))
}

/// GET /quotes/{symbol}
async fn one_quote(
    State(cache): State<Arc<QuoteCache>>,
    Path(symbol): Path<String>,
) -> Result<Json<QuoteResponse>, ApiError> {
    let price = get_one(&cache, &symbol)?;
    Ok(Json(QuoteResponse { symbol, price }))
}
