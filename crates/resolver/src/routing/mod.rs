//! Host-based tenant resolution
//!
//! Turns the host an edge proxy saw into a tenant identifier:
//! - pick the host from a trust-ordered chain of sources ([`HostPolicy`])
//! - look up `domain:{host}` in the [`DomainStore`](crate::store::DomainStore)

mod host_policy;
mod host_resolver;

pub use host_policy::{HostPolicy, HostPolicyError, HostSource};
pub use host_resolver::{DomainResolver, ResolvedTenant};
