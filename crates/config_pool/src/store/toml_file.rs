//! TOML file store.
//!
//! Key features:
//! - Flat `"path" = "value"` entries, optionally inside one named table
//! - Keys the pool doesn't know about are preserved on save
//! - Comments and formatting are preserved with toml_edit
//! - Atomic writes (write to temp file, then rename)

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use toml_edit::{DocumentMut, Item, Table, Value};

use crate::error::{ConfigError, ConfigResult};

use super::ConfigStore;

/// Config store backed by a TOML file.
///
/// The file is read once on open; writes stay in memory until
/// [`ConfigStore::flush`] rewrites the file.
#[derive(Debug)]
pub struct TomlStore {
    /// Path to the backing file.
    path: PathBuf,
    /// Parsed document, edited in place.
    doc: DocumentMut,
    /// Table holding the entries (`None` = top level).
    table_name: Option<String>,
    /// Whether the document changed since it was read.
    dirty: bool,
}

impl TomlStore {
    /// Open a store, starting empty if the file doesn't exist yet.
    pub fn open(path: impl Into<PathBuf>, table_name: Option<&str>) -> ConfigResult<Self> {
        let path = path.into();
        let doc = if path.exists() {
            fs::read_to_string(&path)?.parse::<DocumentMut>()?
        } else {
            DocumentMut::new()
        };

        Ok(Self {
            path,
            doc,
            table_name: table_name.map(str::to_string),
            dirty: false,
        })
    }

    /// Open a store whose file must already exist.
    pub fn open_existing(path: impl Into<PathBuf>, table_name: Option<&str>) -> ConfigResult<Self> {
        let path = path.into();
        if !path.exists() {
            return Err(ConfigError::IoError(io::Error::new(
                io::ErrorKind::NotFound,
                format!("Config file not found: {}", path.display()),
            )));
        }
        Self::open(path, table_name)
    }

    /// Get the backing file path.
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn table(&self) -> Option<&Table> {
        match &self.table_name {
            None => Some(self.doc.as_table()),
            Some(name) => self.doc.as_table().get(name).and_then(Item::as_table),
        }
    }

    fn table_mut(&mut self) -> ConfigResult<&mut Table> {
        match &self.table_name {
            None => Ok(self.doc.as_table_mut()),
            Some(name) => self
                .doc
                .as_table_mut()
                .entry(name)
                .or_insert(Item::Table(Table::new()))
                .as_table_mut()
                .ok_or_else(|| ConfigError::ParseError(format!("[{}] is not a table", name))),
        }
    }

    /// Write content to the backing file atomically.
    ///
    /// Writes to a temp file first, then renames.
    fn atomic_write(&self, content: &str) -> io::Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        let temp_path = self.path.with_extension("toml.tmp");

        {
            let mut file = fs::File::create(&temp_path)?;
            file.write_all(content.as_bytes())?;
            file.sync_all()?;
        }

        fs::rename(&temp_path, &self.path)?;

        Ok(())
    }
}

/// Textual form of a scalar entry. Hand-edited numbers and booleans are
/// accepted alongside the strings this store writes.
fn scalar_text(item: &Item) -> Option<String> {
    match item.as_value()? {
        Value::String(s) => Some(s.value().clone()),
        Value::Integer(i) => Some(i.value().to_string()),
        Value::Float(f) => Some(f.value().to_string()),
        Value::Boolean(b) => Some(b.value().to_string()),
        _ => None,
    }
}

impl ConfigStore for TomlStore {
    fn read_string(&self, key: &str) -> Option<String> {
        self.table()?.get(key).and_then(scalar_text)
    }

    fn write_string(&mut self, key: &str, value: &str) -> ConfigResult<()> {
        self.table_mut()?.insert(key, toml_edit::value(value));
        self.dirty = true;
        Ok(())
    }

    fn remove(&mut self, key: &str) -> bool {
        let removed = match self.table_mut() {
            Ok(table) => table.remove(key).is_some(),
            Err(_) => false,
        };
        self.dirty |= removed;
        removed
    }

    fn keys(&self) -> Vec<String> {
        self.table()
            .map(|table| {
                table
                    .iter()
                    .filter(|(_, item)| scalar_text(item).is_some())
                    .map(|(key, _)| key.to_string())
                    .collect()
            })
            .unwrap_or_default()
    }

    fn flush(&mut self) -> ConfigResult<()> {
        if !self.dirty && self.path.exists() {
            return Ok(());
        }
        self.atomic_write(&self.doc.to_string())?;
        self.dirty = false;
        tracing::debug!("Wrote config store {}", self.path().display());
        Ok(())
    }
}
