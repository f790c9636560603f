//! Shared application state

use std::sync::Arc;

use crate::config::Config;
use crate::routing::DomainResolver;
use crate::store::DomainStore;

/// State handed to every handler.
///
/// Holds the one explicitly owned store client; nothing in here is mutated per
/// request.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub store: Arc<dyn DomainStore>,
    pub resolver: DomainResolver,
}

impl AppState {
    pub fn new(config: Config, store: Arc<dyn DomainStore>) -> Self {
        let resolver = DomainResolver::new(store.clone(), config.host_policy.clone());
        Self {
            config: Arc::new(config),
            store,
            resolver,
        }
    }
}
