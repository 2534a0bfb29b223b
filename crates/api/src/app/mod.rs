//! HTTP application wiring (Axum router + service wiring).
//!
//! - `services.rs`: storage wiring and the operations handlers call
//! - `routes/`: HTTP routes + handlers (one file per resource)
//! - `dto.rs`: query/response DTOs
//! - `errors.rs`: consistent error responses
//! - `extract.rs`: body/query extractors that answer with those errors

use axum::{Extension, Router, routing::get};
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;

use medisupply_auth::AuthDelegate;

use crate::middleware;

pub mod dto;
pub mod errors;
pub mod extract;
pub mod routes;
pub mod services;

/// Static facts about the running service, shown on `/`.
#[derive(Debug, Clone)]
pub struct ServiceIdentity {
    pub name: String,
    pub version: &'static str,
}

impl ServiceIdentity {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            version: env!("CARGO_PKG_VERSION"),
        }
    }
}

/// Build the full HTTP router with fresh in-memory storage.
pub fn build_app(delegate: AuthDelegate, service_name: impl Into<String>) -> Router {
    build_app_with(delegate, services::AppServices::in_memory(), ServiceIdentity::new(service_name))
}

pub fn build_app_with(delegate: AuthDelegate, services: services::AppServices, identity: ServiceIdentity) -> Router {
    let auth_state = middleware::AuthState { delegate };

    // Every route in here passes the auth delegate first.
    let protected = routes::router().route_layer(axum::middleware::from_fn_with_state(
        auth_state.clone(),
        middleware::auth_middleware,
    ));

    // Service-to-service only: a user token is not enough.
    let internal = routes::internal::router().route_layer(axum::middleware::from_fn_with_state(
        auth_state,
        middleware::internal_middleware,
    ));

    Router::new()
        .route("/", get(routes::system::info))
        .route("/healthz", get(routes::system::health))
        .merge(protected)
        .nest("/internal/v1", internal)
        .layer(
            ServiceBuilder::new()
                .layer(axum::middleware::from_fn(middleware::request_id_middleware))
                .layer(TraceLayer::new_for_http())
                .layer(Extension(services))
                .layer(Extension(identity)),
        )
}
