//! Institutional clients. Every route sits behind the auth delegate; writes
//! are logged with the acting principal.

use axum::{
    Json, Router,
    extract::{Extension, Path},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
};

use medisupply_clients::{ClientPatch, NewClient};
use medisupply_core::{ClientId, Page};

use crate::app::extract::{ApiJson, ApiQuery};
use crate::app::{errors, services::AppServices};
use crate::context::CallerContext;

pub fn router() -> Router {
    Router::new()
        .route("/", get(list_clients).post(register_client))
        .route("/by-nit/:nit", get(get_client_by_nit))
        .route(
            "/:id",
            get(get_client).put(update_client).patch(update_client).delete(delete_client),
        )
        .route("/:id/validate", post(validate_client))
}

fn parse_client_id(raw: &str) -> Result<ClientId, Response> {
    raw.parse().map_err(errors::domain_error_to_response)
}

fn not_found() -> Response {
    errors::json_error(StatusCode::NOT_FOUND, "not_found", "client not found")
}

pub async fn register_client(
    Extension(services): Extension<AppServices>,
    Extension(ctx): Extension<CallerContext>,
    ApiJson(body): ApiJson<NewClient>,
) -> Response {
    match services.register_client(&ctx, body) {
        Ok(client) => (StatusCode::CREATED, Json(client)).into_response(),
        Err(e) => errors::domain_error_to_response(e),
    }
}

pub async fn list_clients(Extension(services): Extension<AppServices>, ApiQuery(page): ApiQuery<Page>) -> Response {
    Json(services.list_clients(page)).into_response()
}

pub async fn get_client(Extension(services): Extension<AppServices>, Path(id): Path<String>) -> Response {
    let id = match parse_client_id(&id) {
        Ok(v) => v,
        Err(res) => return res,
    };
    match services.get_client(id) {
        Some(client) => Json(client).into_response(),
        None => not_found(),
    }
}

pub async fn get_client_by_nit(Extension(services): Extension<AppServices>, Path(nit): Path<String>) -> Response {
    match services.get_client_by_nit(&nit) {
        Ok(Some(client)) => Json(client).into_response(),
        Ok(None) => not_found(),
        Err(e) => errors::domain_error_to_response(e),
    }
}

pub async fn update_client(
    Extension(services): Extension<AppServices>,
    Extension(ctx): Extension<CallerContext>,
    Path(id): Path<String>,
    ApiJson(body): ApiJson<ClientPatch>,
) -> Response {
    let id = match parse_client_id(&id) {
        Ok(v) => v,
        Err(res) => return res,
    };
    match services.update_client(&ctx, id, body) {
        Ok(client) => Json(client).into_response(),
        Err(e) => errors::domain_error_to_response(e),
    }
}

pub async fn validate_client(
    Extension(services): Extension<AppServices>,
    Extension(ctx): Extension<CallerContext>,
    Path(id): Path<String>,
) -> Response {
    let id = match parse_client_id(&id) {
        Ok(v) => v,
        Err(res) => return res,
    };
    match services.validate_client(&ctx, id) {
        Ok(client) => Json(client).into_response(),
        Err(e) => errors::domain_error_to_response(e),
    }
}

pub async fn delete_client(
    Extension(services): Extension<AppServices>,
    Extension(ctx): Extension<CallerContext>,
    Path(id): Path<String>,
) -> Response {
    let id = match parse_client_id(&id) {
        Ok(v) => v,
        Err(res) => return res,
    };
    match services.delete_client(&ctx, id) {
        Ok(_) => StatusCode::NO_CONTENT.into_response(),
        Err(e) => errors::domain_error_to_response(e),
    }
}
