//! Tenantgate Tenant Context
//!
//! Middleware that validates the `X-Tenant-ID` header set by the edge proxy and
//! exposes the tenant to downstream handlers.
//!
//! ```ignore
//! let api = tenant_routes(
//!     Router::new()
//!         .route("/users/:id", get(get_user))
//!         .route("/orders", get(list_orders)),
//! );
//!
//! async fn get_user(tenant: TenantContext, Path(id): Path<String>) -> impl IntoResponse {
//!     // Query with tenant isolation
//!     repo.find_user(tenant.tenant_id(), &id).await
//! }
//! ```

pub mod error;
mod extract;
pub mod middleware;

pub use error::{ErrorBody, MissingTenantContext, TenantRejection};
pub use middleware::{
    get_tenant_id, must_get_tenant_id, require_tenant, tenant_id_from_headers, tenant_routes,
    TenantContext,
};
pub use tenantgate_shared::{TenantId, TENANT_ID_HEADER};
