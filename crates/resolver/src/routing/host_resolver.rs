//! Host-to-Tenant Resolution
//!
//! One store round trip per request, no caching. The selected host is used
//! verbatim in the lookup key; a missing mapping is a client error (401), never
//! confused with a store failure (500).

use std::sync::Arc;

use axum::http::{HeaderMap, Uri};
use tenantgate_shared::domain_key;

use super::HostPolicy;
use crate::error::ResolveError;
use crate::store::DomainStore;

/// Result of resolving a host to a tenant
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedTenant {
    /// The host that was looked up
    pub host: String,
    /// The tenant identifier exactly as stored
    pub tenant_id: String,
}

/// Resolves request hosts against the domain store
#[derive(Clone)]
pub struct DomainResolver {
    store: Arc<dyn DomainStore>,
    policy: Arc<HostPolicy>,
}

impl DomainResolver {
    pub fn new(store: Arc<dyn DomainStore>, policy: HostPolicy) -> Self {
        Self {
            store,
            policy: Arc::new(policy),
        }
    }

    /// Resolve the tenant for a request.
    ///
    /// Only the highest-priority present host is looked up. If that lookup
    /// misses, the request fails; lower-priority hosts are not tried.
    pub async fn resolve(
        &self,
        headers: &HeaderMap,
        uri: &Uri,
    ) -> Result<ResolvedTenant, ResolveError> {
        let Some(host) = self.policy.select(headers, uri) else {
            tracing::info!("No host header found in request");
            return Err(ResolveError::MissingHost);
        };

        tracing::debug!(host = %host, "Resolving tenant for domain");

        let key = domain_key(host);
        match self.store.get(&key).await {
            Ok(Some(tenant_id)) => {
                tracing::info!(host = %host, tenant_id = %tenant_id, "Resolved domain to tenant");
                Ok(ResolvedTenant {
                    host: host.to_string(),
                    tenant_id,
                })
            }
            Ok(None) => {
                tracing::info!(host = %host, "No tenant mapping found for domain");
                Err(ResolveError::TenantNotFound(host.to_string()))
            }
            Err(err) => {
                tracing::error!(host = %host, error = %err, "Store lookup failed");
                Err(ResolveError::StoreUnavailable(err))
            }
        }
    }
}
