//! Domain mapping store
//!
//! The resolver only ever reads `domain:{host}` keys. The store client is the
//! one resource shared between in-flight requests; implementations must be safe
//! for concurrent use and must not cache, retry or back off, and
//! must give up well before the request deadline.

mod memory;
mod redis_store;

pub use memory::MemoryDomainStore;
pub use redis_store::{RedisDomainStore, RedisTimeouts};

use async_trait::async_trait;

/// Read-only access to the domain-to-tenant mapping
#[async_trait]
pub trait DomainStore: Send + Sync {
    /// Fetch the value stored under `key`.
    ///
    /// Returns `Ok(None)` when the key does not exist. Absence is never
    /// reported as an error.
    async fn get(&self, key: &str) -> Result<Option<String>, StoreError>;

    /// Round trip to the store without reading any data.
    async fn ping(&self) -> Result<(), StoreError>;

    /// Stop issuing commands. Every later call returns [`StoreError::Closed`].
    async fn close(&self);
}

/// Errors surfaced by a [`DomainStore`]
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("Store unreachable: {0}")]
    Unreachable(String),

    #[error("Store command failed: {0}")]
    Command(String),

    #[error("Store connection closed")]
    Closed,
}
