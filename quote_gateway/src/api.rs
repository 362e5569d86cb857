//! HTTP surface of the gateway.
//!
//! `GET /quotes` runs one collection window on the blocking pool and answers with the
//! reduced snapshot as a JSON array. Every response carries permissive CORS headers and
//! any `OPTIONS` request is answered with 204 before reaching a handler.

use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Request, State},
    http::{HeaderValue, Method, StatusCode, header},
    middleware::{self, Next},
    response::{IntoResponse, Response},
    routing::get,
};
use log::{error, info};
use quote_common::Quote;
use serde::Serialize;

use crate::collector::SnapshotCollector;

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

/// API error type
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub message: String,
}

impl ApiError {
    pub fn internal(message: impl Into<String>) -> Self {
        ApiError {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            message: message.into(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = Json(ErrorResponse {
            error: self.message,
        });
        (self.status, body).into_response()
    }
}

/// Create the gateway router
pub fn create_router(collector: Arc<SnapshotCollector>) -> Router {
    Router::new()
        .route("/quotes", get(quotes))
        .layer(middleware::from_fn(cors))
        .with_state(collector)
}

async fn cors(request: Request, next: Next) -> Response {
    let mut response = if request.method() == Method::OPTIONS {
        StatusCode::NO_CONTENT.into_response()
    } else {
        next.run(request).await
    };
    let headers = response.headers_mut();
    headers.insert(
        header::ACCESS_CONTROL_ALLOW_ORIGIN,
        HeaderValue::from_static("*"),
    );
    headers.insert(
        header::ACCESS_CONTROL_ALLOW_METHODS,
        HeaderValue::from_static("GET, POST, OPTIONS"),
    );
    headers.insert(
        header::ACCESS_CONTROL_ALLOW_HEADERS,
        HeaderValue::from_static("Content-Type"),
    );
    response
}

/// GET /quotes
async fn quotes(
    State(collector): State<Arc<SnapshotCollector>>,
) -> Result<Json<Vec<Quote>>, ApiError> {
    let quotes = tokio::task::spawn_blocking(move || collector.collect())
        .await
        .map_err(|e| ApiError::internal(e.to_string()))?
        .map_err(|e| {
            error!("Failed to open quote stream: {}", e);
            ApiError::internal(e.to_string())
        })?;
    info!("Sent {} quotes", quotes.len());
    Ok(Json(quotes))
}
