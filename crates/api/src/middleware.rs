use axum::{
    extract::{Request, State},
    http::{HeaderName, HeaderValue},
    middleware::Next,
    response::Response,
};
use tracing::Instrument;
use uuid::Uuid;

use medisupply_auth::AuthDelegate;

use crate::app::errors;
use crate::context::CallerContext;

pub const REQUEST_ID_HEADER: &str = "x-request-id";

#[derive(Clone)]
pub struct AuthState {
    pub delegate: AuthDelegate,
}

/// Resolve the caller of a protected route or answer 401.
///
/// Runs before the handler; a rejected request never reaches business logic.
pub async fn auth_middleware(State(state): State<AuthState>, mut req: Request, next: Next) -> Response {
    match state.delegate.authorize(req.headers()).await {
        Ok(caller) => {
            req.extensions_mut().insert(CallerContext::new(caller));
            next.run(req).await
        }
        Err(rejected) => errors::unauthorized(rejected),
    }
}

/// Gate for `/internal` routes: internal key (or disabled auth) only.
pub async fn internal_middleware(State(state): State<AuthState>, mut req: Request, next: Next) -> Response {
    match state.delegate.authorize_internal(req.headers()) {
        Ok(caller) => {
            req.extensions_mut().insert(CallerContext::new(caller));
            next.run(req).await
        }
        Err(rejected) => errors::unauthorized(rejected),
    }
}

/// Attach a request id (propagated from the caller or freshly generated) to
/// the logging span and the response.
pub async fn request_id_middleware(req: Request, next: Next) -> Response {
    let request_id = req
        .headers()
        .get(REQUEST_ID_HEADER)
        .and_then(|v| v.to_str().ok())
        .filter(|v| !v.is_empty() && v.len() <= 128)
        .map(str::to_string)
        .unwrap_or_else(|| Uuid::now_v7().to_string());

    let span = tracing::info_span!("request", request_id = %request_id);
    let mut response = next.run(req).instrument(span).await;

    if let Ok(value) = HeaderValue::from_str(&request_id) {
        response
            .headers_mut()
            .insert(HeaderName::from_static(REQUEST_ID_HEADER), value);
    }
    response
}
