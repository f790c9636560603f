//! Resolver error types and handling
//!
//! Responses are plain text: the caller is an edge proxy that only looks at
//! the status code.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};

use crate::store::StoreError;

/// Outcome of a failed resolve call
#[derive(Debug, thiserror::Error)]
pub enum ResolveError {
    #[error("No host header found")]
    MissingHost,

    #[error("Tenant not found for domain {0}")]
    TenantNotFound(String),

    #[error("Store unavailable: {0}")]
    StoreUnavailable(#[from] StoreError),

    /// The stored identifier cannot be sent as a header value
    #[error("Stored tenant identifier for {0} is not a valid header value")]
    InvalidMapping(String),
}

impl IntoResponse for ResolveError {
    fn into_response(self) -> Response {
        let (status, body) = match &self {
            ResolveError::MissingHost => (StatusCode::BAD_REQUEST, "No host header found"),
            ResolveError::TenantNotFound(_) => {
                (StatusCode::UNAUTHORIZED, "Tenant not found for domain")
            }
            ResolveError::StoreUnavailable(_) | ResolveError::InvalidMapping(_) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error")
            }
        };

        (status, body).into_response()
    }
}

/// Readiness probe failure
#[derive(Debug, thiserror::Error)]
pub enum ProbeError {
    #[error("Store unreachable: {0}")]
    StoreUnreachable(StoreError),
}

impl IntoResponse for ProbeError {
    fn into_response(self) -> Response {
        (StatusCode::SERVICE_UNAVAILABLE, "Service not ready").into_response()
    }
}

/// Result type alias for resolver handlers
pub type ResolveResult<T> = Result<T, ResolveError>;
