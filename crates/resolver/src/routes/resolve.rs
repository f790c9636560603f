//! Tenant resolution endpoint
//!
//! Called by the edge proxy as an auth subrequest. A 200 carries the tenant in
//! `X-Tenant-ID`, which the proxy copies onto the upstream request.

use axum::{
    extract::State,
    http::{HeaderMap, HeaderValue, StatusCode, Uri},
    response::{IntoResponse, Response},
};
use tenantgate_shared::TENANT_ID_HEADER;

use crate::error::{ResolveError, ResolveResult};
use crate::state::AppState;

pub async fn resolve(
    State(state): State<AppState>,
    headers: HeaderMap,
    uri: Uri,
) -> ResolveResult<Response> {
    let resolved = state.resolver.resolve(&headers, &uri).await?;

    let value = HeaderValue::from_str(&resolved.tenant_id).map_err(|_| {
        tracing::error!(host = %resolved.host, "Stored tenant identifier is not a valid header value");
        ResolveError::InvalidMapping(resolved.host.clone())
    })?;

    tracing::Span::current().record(
        "tenant_id",
        tracing::field::display(&resolved.tenant_id),
    );

    Ok((StatusCode::OK, [(TENANT_ID_HEADER, value)]).into_response())
}
