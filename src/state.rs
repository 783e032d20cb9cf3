//! Application state management

use std::sync::Arc;

use crate::buffer::BufferStore;
use crate::config::Config;

/// Shared application state
///
/// One instance is handed to both the HTTP router and the console loop.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: Config,
    buffer: BufferStore,
}

impl AppState {
    pub fn new(config: Config) -> Self {
        let buffer = BufferStore::new(config.buffer.seed.clone());
        Self {
            inner: Arc::new(AppStateInner { config, buffer }),
        }
    }

    /// Get the configuration
    pub fn config(&self) -> &Config {
        &self.inner.config
    }

    /// Get the process-wide buffer store
    pub fn buffer(&self) -> &BufferStore {
        &self.inner.buffer
    }
}
