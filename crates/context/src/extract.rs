//! Handler extractor for the tenant context

use axum::{async_trait, extract::FromRequestParts, http::request::Parts};

use crate::error::MissingTenantContext;
use crate::middleware::TenantContext;

/// `TenantContext` as an extractor is the must-get form: a handler taking it
/// fails with 500 when the middleware did not run. Use
/// `Option<TenantContext>` for the non-failing form.
#[async_trait]
impl<S> FromRequestParts<S> for TenantContext
where
    S: Send + Sync,
{
    type Rejection = MissingTenantContext;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<TenantContext>()
            .cloned()
            .ok_or(MissingTenantContext)
    }
}
