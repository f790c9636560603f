//! Health check endpoints

use axum::{extract::State, http::StatusCode};

use crate::error::ProbeError;
use crate::state::AppState;

/// Liveness probe. Never touches the store.
pub async fn liveness() -> (StatusCode, &'static str) {
    (StatusCode::OK, "OK")
}

/// Readiness probe: pings the store on every call, nothing is cached
pub async fn readiness(State(state): State<AppState>) -> Result<(StatusCode, &'static str), ProbeError> {
    match state.store.ping().await {
        Ok(()) => Ok((StatusCode::OK, "Ready")),
        Err(err) => {
            tracing::error!(error = %err, "Readiness check failed: store is not available");
            Err(ProbeError::StoreUnreachable(err))
        }
    }
}
