//! Application state for Axum handlers.

use phonebook_core::environment::{Clock, SystemClock};
use phonebook_core::PersonStore;
use std::sync::Arc;

/// Application state shared across all HTTP handlers.
///
/// # Examples
///
/// ```ignore
/// use phonebook_testing::InMemoryPersonStore;
/// use phonebook_web::AppState;
/// use std::sync::Arc;
///
/// let state = AppState::new(Arc::new(InMemoryPersonStore::new()));
/// ```
#[derive(Clone)]
pub struct AppState {
    /// Record store behind the person routes.
    pub store: Arc<dyn PersonStore>,
    /// Source of the timestamp on `/info`.
    pub clock: Arc<dyn Clock>,
}

impl AppState {
    /// State backed by `store` and the system clock.
    #[must_use]
    pub fn new(store: Arc<dyn PersonStore>) -> Self {
        Self::with_clock(store, Arc::new(SystemClock))
    }

    /// State backed by `store` and `clock`.
    #[must_use]
    pub fn with_clock(store: Arc<dyn PersonStore>, clock: Arc<dyn Clock>) -> Self {
        Self { store, clock }
    }
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState").finish_non_exhaustive()
    }
}
