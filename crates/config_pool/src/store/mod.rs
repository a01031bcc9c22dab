//! Persistence backends for the config pool.
//!
//! A [`ConfigStore`] is a flat key/value store of strings. Keys are
//! canonical config paths (`video/width`); values are the textual form of
//! a [`crate::ConfigValue`]. Typed helpers are string round-trips on top
//! of `read_string`/`write_string`.

mod memory;
mod toml_file;

pub use memory::MemoryStore;
pub use toml_file::TomlStore;

use crate::error::ConfigResult;

/// Key/value backend used by bulk load and save.
pub trait ConfigStore {
    /// Read the raw string stored under `key`.
    fn read_string(&self, key: &str) -> Option<String>;

    /// Store `value` under `key`, replacing any previous value.
    fn write_string(&mut self, key: &str, value: &str) -> ConfigResult<()>;

    /// Remove `key`. Returns whether it was present.
    fn remove(&mut self, key: &str) -> bool;

    /// All keys currently held by the store.
    fn keys(&self) -> Vec<String>;

    /// Persist pending writes. In-memory stores have nothing to do.
    fn flush(&mut self) -> ConfigResult<()> {
        Ok(())
    }

    fn exists(&self, key: &str) -> bool {
        self.read_string(key).is_some()
    }

    fn read_string_or(&self, key: &str, default: &str) -> String {
        self.read_string(key)
            .unwrap_or_else(|| default.to_string())
    }

    fn read_int(&self, key: &str, default: i32) -> i32 {
        self.read_string(key)
            .and_then(|s| s.trim().parse().ok())
            .unwrap_or(default)
    }

    fn read_uint(&self, key: &str, default: u32) -> u32 {
        self.read_string(key)
            .and_then(|s| s.trim().parse().ok())
            .unwrap_or(default)
    }

    fn read_double(&self, key: &str, default: f64) -> f64 {
        self.read_string(key)
            .and_then(|s| s.trim().parse().ok())
            .unwrap_or(default)
    }

    fn read_bool(&self, key: &str, default: bool) -> bool {
        match self.read_string(key).as_deref().map(str::trim) {
            Some("1") | Some("true") => true,
            Some("0") | Some("false") => false,
            _ => default,
        }
    }

    fn write_int(&mut self, key: &str, value: i32) -> ConfigResult<()> {
        self.write_string(key, &value.to_string())
    }

    fn write_uint(&mut self, key: &str, value: u32) -> ConfigResult<()> {
        self.write_string(key, &value.to_string())
    }

    fn write_double(&mut self, key: &str, value: f64) -> ConfigResult<()> {
        self.write_string(key, &value.to_string())
    }

    fn write_bool(&mut self, key: &str, value: bool) -> ConfigResult<()> {
        self.write_string(key, if value { "true" } else { "false" })
    }
}
