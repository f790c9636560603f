//! In-process domain store for local runs and tests

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, RwLock};

use async_trait::async_trait;
use tenantgate_shared::domain_key;

use super::{DomainStore, StoreError};

/// Thread-safe in-memory mapping with a reachability switch.
///
/// Flipping `set_reachable(false)` makes every call fail with
/// `StoreError::Unreachable`, which is how tests simulate an outage.
pub struct MemoryDomainStore {
    entries: RwLock<HashMap<String, String>>,
    reachable: AtomicBool,
    closed: AtomicBool,
    lookups: Mutex<Vec<String>>,
}

impl Default for MemoryDomainStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryDomainStore {
    pub fn new() -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            reachable: AtomicBool::new(true),
            closed: AtomicBool::new(false),
            lookups: Mutex::new(Vec::new()),
        }
    }

    /// Map a host to a tenant under its `domain:` key
    pub fn map_domain(&self, host: &str, tenant_id: &str) {
        if let Ok(mut entries) = self.entries.write() {
            entries.insert(domain_key(host), tenant_id.to_string());
        }
    }

    pub fn set_reachable(&self, reachable: bool) {
        self.reachable.store(reachable, Ordering::Release);
    }

    /// Keys passed to `get`, in call order
    pub fn lookups(&self) -> Vec<String> {
        self.lookups
            .lock()
            .map(|lookups| lookups.clone())
            .unwrap_or_default()
    }

    fn check(&self) -> Result<(), StoreError> {
        if self.closed.load(Ordering::Acquire) {
            return Err(StoreError::Closed);
        }
        if !self.reachable.load(Ordering::Acquire) {
            return Err(StoreError::Unreachable("memory store offline".to_string()));
        }
        Ok(())
    }
}

#[async_trait]
impl DomainStore for MemoryDomainStore {
    async fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        self.check()?;
        if let Ok(mut lookups) = self.lookups.lock() {
            lookups.push(key.to_string());
        }
        let entries = self
            .entries
            .read()
            .map_err(|_| StoreError::Command("memory store poisoned".to_string()))?;
        Ok(entries.get(key).cloned())
    }

    async fn ping(&self) -> Result<(), StoreError> {
        self.check()
    }

    async fn close(&self) {
        self.closed.store(true, Ordering::Release);
    }
}
