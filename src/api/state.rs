//! Application state for the crew roster API.

use std::sync::Arc;

use chrono::{NaiveDate, Utc};

use crate::config::ConfigLoader;
use crate::store::RosterStore;

/// Shared application state.
///
/// Holds the loaded facility configuration and the roster store shared by
/// every request handler, plus the server's notion of today.
#[derive(Clone)]
pub struct AppState {
    config: Arc<ConfigLoader>,
    store: Arc<RosterStore>,
    pinned_today: Option<NaiveDate>,
}

impl AppState {
    /// Creates state with an empty store.
    pub fn new(config: ConfigLoader) -> Self {
        Self::with_store(config, Arc::new(RosterStore::new()))
    }

    /// Creates state over an existing store, e.g. one pre-loaded from an
    /// import.
    pub fn with_store(config: ConfigLoader, store: Arc<RosterStore>) -> Self {
        Self {
            config: Arc::new(config),
            store,
            pinned_today: None,
        }
    }

    /// Fixes the server date instead of reading the UTC clock.
    pub fn with_today(mut self, today: NaiveDate) -> Self {
        self.pinned_today = Some(today);
        self
    }

    /// The server date: the pinned date if set, otherwise the UTC date.
    pub fn today(&self) -> NaiveDate {
        self.pinned_today.unwrap_or_else(|| Utc::now().date_naive())
    }

    /// Returns a reference to the configuration loader.
    pub fn config(&self) -> &ConfigLoader {
        &self.config
    }

    /// Returns the roster store.
    pub fn store(&self) -> &RosterStore {
        &self.store
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_app_state_is_clone() {
        fn assert_clone<T: Clone + Send + Sync>() {}
        assert_clone::<AppState>();
    }

    #[test]
    fn test_clones_share_the_store() {
        let config = ConfigLoader::load("./config/facility").unwrap();
        let state = AppState::new(config);
        let clone = state.clone();
        assert!(std::ptr::eq(state.store(), clone.store()));
    }

    #[test]
    fn test_pinned_today_overrides_clock() {
        let config = ConfigLoader::load("./config/facility").unwrap();
        let pinned = NaiveDate::from_ymd_opt(2025, 1, 6).unwrap();
        let state = AppState::new(config).with_today(pinned);
        assert_eq!(state.clone().today(), pinned);
    }
}
