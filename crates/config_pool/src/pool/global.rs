//! Process-wide pool instance.
//!
//! [`get`] lazily creates the shared pool and [`unload`] drops it. Both
//! run under one mutex, so at most one instance exists at a time and a
//! caller never sees a half-built or half-torn-down pool. Handles obtained
//! before an unload stay usable but are detached: the next [`get`] starts
//! from an empty registry.

use std::sync::Arc;

use parking_lot::Mutex;

use crate::options::PoolOptions;

use super::facade::ConfigPool;

static INSTANCE: Mutex<Option<Arc<ConfigPool>>> = parking_lot::const_mutex(None);

/// Shared pool, created with default options on first use.
pub fn get() -> Arc<ConfigPool> {
    get_or_init_with(PoolOptions::default)
}

/// Shared pool, created with the given options if none exists yet.
///
/// Options are ignored when a pool is already loaded.
pub fn get_or_init_with(options: impl FnOnce() -> PoolOptions) -> Arc<ConfigPool> {
    let mut slot = INSTANCE.lock();
    slot.get_or_insert_with(|| {
        tracing::debug!("Creating config pool");
        Arc::new(ConfigPool::with_options(options()))
    })
    .clone()
}

/// Drop the shared pool. Returns whether one was loaded.
pub fn unload() -> bool {
    let previous = INSTANCE.lock().take();
    if previous.is_some() {
        tracing::debug!("Unloaded config pool");
    }
    previous.is_some()
}

pub fn is_loaded() -> bool {
    INSTANCE.lock().is_some()
}
