//! Verbatim passthrough to the provider's own wire protocol.

use crate::provider::{AuthProvider, ForwardedRequest};
use axum::{
    body::to_bytes,
    extract::{Extension, Request},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use std::sync::Arc;
use tracing::error;

const MAX_BODY_BYTES: usize = 64 * 1024;

pub async fn forward(
    Extension(provider): Extension<Arc<dyn AuthProvider>>,
    request: Request,
) -> Response {
    let (parts, body) = request.into_parts();
    let body = match to_bytes(body, MAX_BODY_BYTES).await {
        Ok(bytes) => bytes.to_vec(),
        Err(err) => {
            error!("Failed to read passthrough body: {err}");
            return StatusCode::PAYLOAD_TOO_LARGE.into_response();
        }
    };

    let path_and_query = parts
        .uri
        .path_and_query()
        .map_or_else(|| parts.uri.path().to_string(), |pq| pq.as_str().to_string());

    let forwarded = ForwardedRequest {
        method: parts.method,
        path_and_query,
        headers: parts.headers,
        body,
    };

    match provider.forward(forwarded).await {
        Ok(reply) => reply.into_response(),
        Err(err) => {
            error!("Provider passthrough failed: {err}");
            StatusCode::BAD_GATEWAY.into_response()
        }
    }
}
