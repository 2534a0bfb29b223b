use axum::{Json, extract::Extension, http::StatusCode, response::IntoResponse};
use serde_json::json;

use crate::app::{ServiceIdentity, dto};
use crate::context::CallerContext;

pub async fn info(Extension(identity): Extension<ServiceIdentity>) -> impl IntoResponse {
    Json(dto::ServiceInfo {
        service: identity.name,
        version: identity.version,
    })
}

pub async fn health() -> impl IntoResponse {
    (StatusCode::OK, Json(json!({ "status": "ok" })))
}

pub async fn whoami(Extension(ctx): Extension<CallerContext>) -> impl IntoResponse {
    Json(dto::WhoAmI::from(ctx.caller()))
}
