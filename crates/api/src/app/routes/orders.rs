use axum::{
    Json, Router,
    extract::{Extension, Path},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
};

use medisupply_core::{OrderId, Page};
use medisupply_orders::{NewOrder, OrderFilter, OrderPatch};

use crate::app::extract::{ApiJson, ApiQuery};
use crate::app::{dto, errors, services::AppServices};

pub fn router() -> Router {
    Router::new()
        .route("/", get(list_orders).post(create_order))
        .route(
            "/:id",
            get(get_order).put(update_order).patch(update_order).delete(delete_order),
        )
}

pub(crate) fn parse_order_id(raw: &str) -> Result<OrderId, Response> {
    raw.parse().map_err(errors::domain_error_to_response)
}

pub async fn create_order(
    Extension(services): Extension<AppServices>,
    ApiJson(body): ApiJson<NewOrder>,
) -> Response {
    match services.create_order(body) {
        Ok(order) => (StatusCode::CREATED, Json(order)).into_response(),
        Err(e) => errors::domain_error_to_response(e),
    }
}

pub async fn list_orders(
    Extension(services): Extension<AppServices>,
    ApiQuery(page): ApiQuery<Page>,
    ApiQuery(query): ApiQuery<dto::OrderListQuery>,
) -> Response {
    let filter = OrderFilter::from(query);
    Json(services.list_orders(&filter, page)).into_response()
}

pub async fn get_order(Extension(services): Extension<AppServices>, Path(id): Path<String>) -> Response {
    let id = match parse_order_id(&id) {
        Ok(v) => v,
        Err(res) => return res,
    };
    match services.get_order(id) {
        Some(order) => Json(order).into_response(),
        None => errors::json_error(StatusCode::NOT_FOUND, "not_found", "order not found"),
    }
}

pub async fn update_order(
    Extension(services): Extension<AppServices>,
    Path(id): Path<String>,
    ApiJson(body): ApiJson<OrderPatch>,
) -> Response {
    let id = match parse_order_id(&id) {
        Ok(v) => v,
        Err(res) => return res,
    };
    match services.update_order(id, body) {
        Ok(order) => Json(order).into_response(),
        Err(e) => errors::domain_error_to_response(e),
    }
}

pub async fn delete_order(Extension(services): Extension<AppServices>, Path(id): Path<String>) -> Response {
    let id = match parse_order_id(&id) {
        Ok(v) => v,
        Err(res) => return res,
    };
    match services.delete_order(id) {
        Ok(_) => StatusCode::NO_CONTENT.into_response(),
        Err(e) => errors::domain_error_to_response(e),
    }
}
