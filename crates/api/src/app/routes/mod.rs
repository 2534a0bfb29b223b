use axum::{Router, routing::get};

pub mod clients;
pub mod internal;
pub mod orders;
pub mod plans;
pub mod system;

/// Router for every endpoint behind the auth delegate.
pub fn router() -> Router {
    Router::new()
        .route("/whoami", get(system::whoami))
        .nest("/api/v1/clientes", clients::router())
        .nest("/api/v1/ordenes", orders::router())
        .nest("/api/v1/planes-venta", plans::router())
}
