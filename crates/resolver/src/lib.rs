//! Tenantgate Domain Resolver
//!
//! Maps the host an edge proxy saw to a tenant identifier stored in Redis and
//! hands it back in `X-Tenant-ID`.

pub mod config;
pub mod error;
pub mod routes;
pub mod routing;
pub mod server;
pub mod state;
pub mod store;

pub use config::Config;
pub use error::{ProbeError, ResolveError, ResolveResult};
pub use routes::create_router;
pub use routing::{DomainResolver, HostPolicy, HostSource, ResolvedTenant};
pub use state::AppState;
pub use store::{DomainStore, MemoryDomainStore, RedisDomainStore, RedisTimeouts, StoreError};
