//! Application state shared across handlers.

use std::sync::Arc;

use checkout_lane_core::Store;

/// Application state shared across all handlers.
///
/// Cheaply cloneable via `Arc`. The store does its own locking, so handlers
/// only ever need a shared reference.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    store: Store,
}

impl AppState {
    /// Create a new application state around `store`.
    #[must_use]
    pub fn new(store: Store) -> Self {
        Self {
            inner: Arc::new(AppStateInner { store }),
        }
    }

    /// Get a reference to the store.
    #[must_use]
    pub fn store(&self) -> &Store {
        &self.inner.store
    }
}
