//! Application state management for the service.
//!
//! This module defines the shared application state that is passed
//! to HTTP handlers.

use std::sync::Arc;

use crate::stats::ServiceStats;
use crate::store::ConfigStore;

/// Type alias for shared application state.
pub type SharedState = Arc<AppState>;

/// Application state shared across requests.
pub struct AppState {
    pub store: Arc<ConfigStore>,
    pub stats: Arc<ServiceStats>,
}

impl AppState {
    pub fn new(store: ConfigStore) -> SharedState {
        Arc::new(Self {
            store: Arc::new(store),
            stats: Arc::new(ServiceStats::new()),
        })
    }
}
