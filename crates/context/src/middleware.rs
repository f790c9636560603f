//! Tenant context middleware
//!
//! Gates tenant-scoped routes on a well-formed `X-Tenant-ID` header. The edge
//! proxy copies that header from the domain resolver's response, so anything
//! reaching this layer without it never went through tenant resolution.
//!
//! Per request the context is either rejected before the handler runs, or
//! validated, stored in the request extensions and handed to the handler. The
//! extensions die with the request, so nothing is shared between requests.

use axum::{
    extract::Request,
    http::{Extensions, HeaderMap},
    middleware::{self, Next},
    response::Response,
    Router,
};
use tenantgate_shared::{TenantId, TENANT_ID_HEADER};
use tracing::Span;

use crate::error::{MissingTenantContext, TenantRejection};

/// Validated tenant for the current request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TenantContext {
    tenant_id: TenantId,
}

impl TenantContext {
    pub fn new(tenant_id: TenantId) -> Self {
        Self { tenant_id }
    }

    pub fn tenant_id(&self) -> &TenantId {
        &self.tenant_id
    }

    pub fn into_tenant_id(self) -> TenantId {
        self.tenant_id
    }
}

/// Read and validate the tenant header.
///
/// An empty header counts as missing. Length is the only rule on the value;
/// bytes that are not UTF-8 are malformed.
pub fn tenant_id_from_headers(headers: &HeaderMap) -> Result<TenantId, TenantRejection> {
    let Some(value) = headers.get(TENANT_ID_HEADER) else {
        return Err(TenantRejection::TenantIdRequired);
    };
    if value.is_empty() {
        return Err(TenantRejection::TenantIdRequired);
    }

    let raw = std::str::from_utf8(value.as_bytes())
        .map_err(|_| TenantRejection::InvalidTenantIdFormat)?;

    Ok(TenantId::parse(raw)?)
}

/// Middleware that requires a valid `X-Tenant-ID` header.
///
/// On rejection the inner service is never called.
pub async fn require_tenant(mut request: Request, next: Next) -> Result<Response, TenantRejection> {
    let tenant_id = match tenant_id_from_headers(request.headers()) {
        Ok(tenant_id) => tenant_id,
        Err(rejection) => {
            tracing::debug!(
                code = rejection.code(),
                path = %request.uri().path(),
                "Rejected request without a valid tenant"
            );
            return Err(rejection);
        }
    };

    // Shows up on the request span when it declares a `tenant_id` field
    Span::current().record("tenant_id", tracing::field::display(&tenant_id));
    request
        .extensions_mut()
        .insert(TenantContext::new(tenant_id));

    Ok(next.run(request).await)
}

/// Tenant of the current request, if the middleware ran.
///
/// Never falls back to a default tenant.
pub fn get_tenant_id(extensions: &Extensions) -> Option<&TenantId> {
    extensions
        .get::<TenantContext>()
        .map(TenantContext::tenant_id)
}

/// Tenant of the current request for code that sits behind the middleware.
///
/// A missing context is a wiring defect; the returned error fails only the
/// current request (500, logged when turned into a response).
pub fn must_get_tenant_id(extensions: &Extensions) -> Result<&TenantId, MissingTenantContext> {
    get_tenant_id(extensions).ok_or(MissingTenantContext)
}

/// Apply the tenant middleware to every route of `router`.
///
/// Uses `route_layer`, so unmatched paths still 404 instead of demanding a
/// tenant.
pub fn tenant_routes<S>(router: Router<S>) -> Router<S>
where
    S: Clone + Send + Sync + 'static,
{
    router.route_layer(middleware::from_fn(require_tenant))
}
