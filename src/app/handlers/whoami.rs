//! Minimal JSON identity endpoint.

use crate::app::session::SessionContext;
use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;

pub async fn whoami(context: SessionContext) -> Response {
    match context.user() {
        None => (StatusCode::UNAUTHORIZED, Json(json!({ "role": "guest" }))).into_response(),
        Some(user) => Json(json!({
            "role": user.role.as_str(),
            "data": {
                "name": user.name,
                "id": user.id,
            },
        }))
        .into_response(),
    }
}
