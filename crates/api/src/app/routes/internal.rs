//! Routes reserved for other services in the mesh.

use axum::{
    Json, Router,
    extract::Extension,
    response::{IntoResponse, Response},
    routing::get,
};

use medisupply_core::Page;
use medisupply_orders::OrderFilter;

use crate::app::extract::ApiQuery;
use crate::app::{dto, services::AppServices};

pub fn router() -> Router {
    Router::new().route("/ordenes", get(list_orders))
}

pub async fn list_orders(
    Extension(services): Extension<AppServices>,
    ApiQuery(page): ApiQuery<dto::InternalPage>,
    ApiQuery(filter): ApiQuery<OrderFilter>,
) -> Response {
    Json(services.list_orders(&filter, Page::from(page))).into_response()
}
