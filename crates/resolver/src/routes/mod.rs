//! Resolver routes

pub mod health;
pub mod resolve;

use axum::{
    extract::Request,
    http::StatusCode,
    routing::{any, get},
    Router,
};
use tower::ServiceBuilder;
use tower_http::{
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    timeout::{RequestBodyTimeoutLayer, TimeoutLayer},
    trace::TraceLayer,
};

use crate::state::AppState;

/// Create all resolver routes.
///
/// `/health` and `/ready` are probes; every other path and method resolves the
/// tenant, so the proxy's auth-url can point anywhere on this service.
pub fn create_router(state: AppState) -> Router {
    let read_timeout = state.config.read_timeout;
    let write_timeout = state.config.write_timeout;

    let layers = ServiceBuilder::new()
        .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
        .layer(
            TraceLayer::new_for_http().make_span_with(|request: &Request| {
                let request_id = request
                    .headers()
                    .get("x-request-id")
                    .and_then(|v| v.to_str().ok())
                    .unwrap_or("-");
                tracing::info_span!(
                    "request",
                    method = %request.method(),
                    uri = %request.uri(),
                    request_id = %request_id,
                    tenant_id = tracing::field::Empty,
                )
            }),
        )
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(RequestBodyTimeoutLayer::new(read_timeout))
        .layer(TimeoutLayer::with_status_code(
            StatusCode::REQUEST_TIMEOUT,
            write_timeout,
        ));

    Router::new()
        .route("/health", any(health::liveness))
        .route("/ready", get(health::readiness))
        .route("/", any(resolve::resolve))
        .fallback(resolve::resolve)
        .layer(layers)
        .with_state(state)
}
