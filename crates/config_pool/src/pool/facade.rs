//! Typed config access and bulk persistence over a shared registry.

use std::fs;
use std::path::Path;

use parking_lot::{Mutex, RwLock};

use crate::error::{ConfigError, ConfigResult};
use crate::logging::WarningCallback;
use crate::options::PoolOptions;
use crate::path;
use crate::registry::{ConfigId, ConfigRegistry};
use crate::store::{ConfigStore, TomlStore};
use crate::value::{ConfigType, ConfigValue, TypeTag};
use crate::xml;

/// Thread-safe config pool: registry, current values and load/save.
///
/// All access goes through one reader/writer lock. Reads take it shared;
/// registration, writes and bulk loads take it exclusively, so a save
/// never observes a half-applied load. File I/O happens outside the lock.
pub struct ConfigPool {
    registry: RwLock<ConfigRegistry>,
    options: PoolOptions,
    warning_handler: Mutex<Option<WarningCallback>>,
}

impl Default for ConfigPool {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigPool {
    /// Create an empty pool with default options.
    pub fn new() -> Self {
        Self::with_options(PoolOptions::default())
    }

    /// Create an empty pool with the given options.
    pub fn with_options(options: PoolOptions) -> Self {
        Self {
            registry: RwLock::new(ConfigRegistry::new()),
            options,
            warning_handler: Mutex::new(None),
        }
    }

    /// Options the pool was created with.
    pub fn options(&self) -> &PoolOptions {
        &self.options
    }

    /// Install the handler notified when a bulk load fails.
    pub fn set_warning_handler(&self, handler: WarningCallback) {
        *self.warning_handler.lock() = Some(handler);
    }

    /// Remove the load-failure handler.
    pub fn clear_warning_handler(&self) {
        *self.warning_handler.lock() = None;
    }

    // Registry

    /// Register `path` with a typed default, returning its id.
    ///
    /// Repeated calls with the same path return the same id; the first
    /// registration's type and default stay in effect.
    pub fn gen_id<T: ConfigType>(&self, path: &str, default: T) -> ConfigResult<ConfigId> {
        self.registry.write().register(path, default.into_value())
    }

    /// Id registered for a path.
    pub fn resolve(&self, path: &str) -> Option<ConfigId> {
        self.registry.read().resolve(path)
    }

    /// Canonical path of an id.
    pub fn resolve_path(&self, id: ConfigId) -> Option<String> {
        self.registry.read().resolve_path(id).map(str::to_string)
    }

    /// Registered type of an id; `None` for structural nodes.
    pub fn type_of(&self, id: ConfigId) -> Option<TypeTag> {
        self.registry.read().type_of(id)
    }

    /// Direct children of an id in registration order.
    pub fn children_of(&self, id: ConfigId) -> Vec<ConfigId> {
        self.registry.read().children_of(id).to_vec()
    }

    /// Parent of an id.
    pub fn parent_of(&self, id: ConfigId) -> Option<ConfigId> {
        self.registry.read().parent_of(id)
    }

    /// Typed entries under a section, in pre-order.
    pub fn ids_under(&self, section: &str) -> ConfigResult<Vec<ConfigId>> {
        self.registry.read().ids_under(section)
    }

    /// Number of registry nodes, including the root.
    pub fn len(&self) -> usize {
        self.registry.read().len()
    }

    /// True when only the root exists.
    pub fn is_empty(&self) -> bool {
        self.registry.read().is_empty()
    }

    /// Copy of the registry as it is right now.
    pub fn snapshot(&self) -> ConfigRegistry {
        self.registry.read().clone()
    }

    // Values

    /// Read a value; fails on unknown ids and type mismatches.
    pub fn get<T: ConfigType>(&self, id: ConfigId) -> ConfigResult<T> {
        self.registry.read().get(id)
    }

    /// Read a value, falling back silently on any failure.
    pub fn get_or<T: ConfigType>(&self, id: ConfigId, fallback: T) -> T {
        self.get(id).unwrap_or(fallback)
    }

    /// Replace a value in memory. Nothing is persisted until a save.
    pub fn set<T: ConfigType>(&self, id: ConfigId, value: T) -> ConfigResult<()> {
        self.registry.write().set(id, value)
    }

    /// Current value of an entry, whatever its type.
    pub fn value(&self, id: ConfigId) -> ConfigResult<ConfigValue> {
        self.registry.read().value(id).cloned()
    }

    /// Default an entry was registered with.
    pub fn default_of(&self, id: ConfigId) -> ConfigResult<ConfigValue> {
        self.registry.read().default_of(id).cloned()
    }

    /// Restore an entry's registered default.
    pub fn reset_to_default(&self, id: ConfigId) -> ConfigResult<()> {
        self.registry.write().reset(id)
    }

    /// Reset every entry under `section` to its default.
    pub fn reset_section(&self, section: &str) -> ConfigResult<usize> {
        let mut registry = self.registry.write();
        let ids = registry.ids_under(section)?;
        for &id in &ids {
            registry.reset(id)?;
        }
        Ok(ids.len())
    }

    // Key/value stores

    /// Load a section from a TOML store file.
    ///
    /// Returns the number of entries applied. Keys that match no
    /// registered path are ignored.
    pub fn load_config(&self, section: &str, filename: impl AsRef<Path>) -> ConfigResult<usize> {
        let filename = filename.as_ref();
        let result = TomlStore::open_existing(filename, self.options.toml_table.as_deref())
            .and_then(|store| self.apply_store(section, &store));
        self.report_load(section, &filename.display().to_string(), result)
    }

    /// Save a section to a TOML store file, keeping unrelated keys.
    ///
    /// Returns the number of entries written.
    pub fn save_config(&self, section: &str, filename: impl AsRef<Path>) -> ConfigResult<usize> {
        let mut store = TomlStore::open(filename.as_ref(), self.options.toml_table.as_deref())?;
        self.save_config_to_store(section, &mut store)
    }

    /// Load a section from any store. Nothing is applied unless every
    /// matching entry parses.
    pub fn load_config_from_store(
        &self,
        section: &str,
        store: &dyn ConfigStore,
    ) -> ConfigResult<usize> {
        let result = self.apply_store(section, store);
        self.report_load(section, "store", result)
    }

    /// Write a section's current values into a store and flush it.
    ///
    /// A failed write or flush leaves the in-memory values untouched.
    pub fn save_config_to_store(
        &self,
        section: &str,
        store: &mut dyn ConfigStore,
    ) -> ConfigResult<usize> {
        let entries = self.section_entries(section)?;
        for (key, text) in &entries {
            store.write_string(key, text)?;
        }
        store.flush()?;

        tracing::info!("Saved {} config entries for section {:?}", entries.len(), section);
        Ok(entries.len())
    }

    // XML

    /// Load a section from an XML file. All-or-nothing, as with
    /// [`ConfigPool::load_config_from_xml_string`].
    pub fn load_config_from_xml(
        &self,
        section: &str,
        filename: impl AsRef<Path>,
    ) -> ConfigResult<usize> {
        let filename = filename.as_ref();
        let result = fs::read_to_string(filename)
            .map_err(ConfigError::from)
            .and_then(|content| self.apply_xml(section, &content));
        self.report_load(section, &filename.display().to_string(), result)
    }

    /// Load a section from an XML string.
    ///
    /// The document is parsed completely before any value changes, so a
    /// malformed document or value leaves the pool untouched.
    pub fn load_config_from_xml_string(&self, section: &str, xml: &str) -> ConfigResult<usize> {
        let result = self.apply_xml(section, xml);
        self.report_load(section, "XML string", result)
    }

    /// Serialize a section to an XML string.
    pub fn save_config_to_xml_string(&self, section: &str) -> ConfigResult<String> {
        let section = path::canonical_section(section)?;
        let registry = self.registry.read();
        xml::write_section(&registry, &section, &self.options)
    }

    /// Serialize a section to an XML file.
    pub fn save_config_to_xml(&self, section: &str, filename: impl AsRef<Path>) -> ConfigResult<()> {
        let content = self.save_config_to_xml_string(section)?;
        fs::write(filename.as_ref(), content)?;
        tracing::info!(
            "Saved config section {:?} to {}",
            section,
            filename.as_ref().display()
        );
        Ok(())
    }

    fn apply_store(&self, section: &str, store: &dyn ConfigStore) -> ConfigResult<usize> {
        let section = path::canonical_section(section)?;
        let mut registry = self.registry.write();

        let mut parsed = Vec::new();
        for key in store.keys() {
            let Ok(canonical) = path::canonicalize(&key) else {
                continue;
            };
            if !path::is_within(&canonical, &section) {
                continue;
            }
            let Some(id) = registry.resolve(&canonical) else {
                continue;
            };
            let (Some(tag), Some(text)) = (registry.type_of(id), store.read_string(&key)) else {
                continue;
            };
            let value = ConfigValue::parse(tag, &text)
                .map_err(|e| ConfigError::ParseError(format!("{}: {}", key, e)))?;
            parsed.push((id, value));
        }

        let applied = apply(&mut registry, parsed)?;
        tracing::info!("Loaded {} config entries for section {:?}", applied, section);
        Ok(applied)
    }

    fn apply_xml(&self, section: &str, content: &str) -> ConfigResult<usize> {
        let section = path::canonical_section(section)?;
        let mut registry = self.registry.write();
        let parsed = xml::read_section(&registry, &section, content, &self.options)?;

        let applied = apply(&mut registry, parsed)?;
        tracing::info!("Loaded {} config entries for section {:?} from XML", applied, section);
        Ok(applied)
    }

    /// `(path, text)` for every typed entry under a section.
    fn section_entries(&self, section: &str) -> ConfigResult<Vec<(String, String)>> {
        let registry = self.registry.read();
        let ids = registry.ids_under(section)?;
        Ok(ids
            .into_iter()
            .filter_map(|id| {
                let path = registry.resolve_path(id)?;
                let value = registry.value(id).ok()?;
                Some((path.to_string(), value.to_text()))
            })
            .collect())
    }

    fn report_load<T>(&self, section: &str, source: &str, result: ConfigResult<T>) -> ConfigResult<T> {
        if let Err(err) = &result {
            let message = format!(
                "Failed to load config section {:?} from {}: {}",
                section, source, err
            );
            tracing::warn!("{}", message);
            let handler = self.warning_handler.lock().clone();
            if let Some(handler) = handler {
                handler(message.as_str());
            }
        }
        result
    }
}

/// Apply parsed values. Tags were checked while parsing.
fn apply(registry: &mut ConfigRegistry, parsed: Vec<(ConfigId, ConfigValue)>) -> ConfigResult<usize> {
    let count = parsed.len();
    for (id, value) in parsed {
        registry.set_value(id, value)?;
    }
    Ok(count)
}

macro_rules! typed_accessors {
    ($($ty:ty => $gen:ident, $get:ident, $set:ident;)*) => {
        impl ConfigPool {
            $(
                #[doc = concat!("Register a `", stringify!($ty), "` entry.")]
                pub fn $gen(&self, path: &str, default: $ty) -> ConfigResult<ConfigId> {
                    self.gen_id(path, default)
                }

                #[doc = concat!("Read a `", stringify!($ty), "` entry.")]
                pub fn $get(&self, id: ConfigId) -> ConfigResult<$ty> {
                    self.get(id)
                }

                #[doc = concat!("Write a `", stringify!($ty), "` entry.")]
                pub fn $set(&self, id: ConfigId, value: $ty) -> ConfigResult<()> {
                    self.set(id, value)
                }
            )*
        }
    };
}

typed_accessors! {
    i32 => gen_int_id, get_int, set_int;
    u32 => gen_uint_id, get_uint, set_uint;
    i8 => gen_char_id, get_char, set_char;
    char => gen_wide_char_id, get_wide_char, set_wide_char;
    u8 => gen_byte_id, get_byte, set_byte;
    bool => gen_bool_id, get_bool, set_bool;
    f32 => gen_float_id, get_float, set_float;
    f64 => gen_double_id, get_double, set_double;
    String => gen_string_id, get_string, set_string;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logging::init_test_tracing;
    use crate::store::MemoryStore;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use std::thread;
    use tempfile::tempdir;

    #[test]
    fn video_width_scenario() {
        let dir = tempdir().unwrap();
        let prefs = dir.path().join("prefs");

        let pool = ConfigPool::new();
        let width = pool.gen_uint_id("video/width", 640).unwrap();
        assert_eq!(width, ConfigId(2));
        pool.set_uint(width, 1920).unwrap();
        assert_eq!(pool.get_uint(width).unwrap(), 1920);
        assert_eq!(pool.save_config("video", &prefs).unwrap(), 1);

        let fresh = ConfigPool::new();
        let again = fresh.gen_uint_id("video/width", 640).unwrap();
        assert_eq!(again, ConfigId(2));
        assert_eq!(fresh.get_uint(again).unwrap(), 640);
        assert_eq!(fresh.load_config("video", &prefs).unwrap(), 1);
        assert_eq!(fresh.get_uint(again).unwrap(), 1920);
    }

    #[test]
    fn registration_returns_same_id() {
        let pool = ConfigPool::new();
        let id = pool.gen_string_id("project/name", "untitled".to_string()).unwrap();
        assert_eq!(pool.gen_string_id("project/name", "other".to_string()).unwrap(), id);
        assert_eq!(pool.resolve("project/name"), Some(id));
        assert_eq!(pool.resolve_path(id).as_deref(), Some("project/name"));
        assert_eq!(pool.get_string(id).unwrap(), "untitled");
    }

    #[test]
    fn every_type_roundtrips_through_set_get() {
        let pool = ConfigPool::new();

        let i = pool.gen_int_id("t/int", 0).unwrap();
        let u = pool.gen_uint_id("t/uint", 0).unwrap();
        let c = pool.gen_char_id("t/char", 0).unwrap();
        let w = pool.gen_wide_char_id("t/wchar", 'a').unwrap();
        let b = pool.gen_byte_id("t/byte", 0).unwrap();
        let f = pool.gen_bool_id("t/bool", false).unwrap();
        let fl = pool.gen_float_id("t/float", 0.0).unwrap();
        let d = pool.gen_double_id("t/double", 0.0).unwrap();
        let s = pool.gen_string_id("t/string", String::new()).unwrap();

        pool.set_int(i, -12).unwrap();
        pool.set_uint(u, 12).unwrap();
        pool.set_char(c, b'x' as i8).unwrap();
        pool.set_wide_char(w, 'ж').unwrap();
        pool.set_byte(b, 200).unwrap();
        pool.set_bool(f, true).unwrap();
        pool.set_float(fl, 1.5).unwrap();
        pool.set_double(d, 23.976).unwrap();
        pool.set_string(s, "clip.mkv".to_string()).unwrap();

        assert_eq!(pool.get_int(i).unwrap(), -12);
        assert_eq!(pool.get_uint(u).unwrap(), 12);
        assert_eq!(pool.get_char(c).unwrap(), b'x' as i8);
        assert_eq!(pool.get_wide_char(w).unwrap(), 'ж');
        assert_eq!(pool.get_byte(b).unwrap(), 200);
        assert!(pool.get_bool(f).unwrap());
        assert_eq!(pool.get_float(fl).unwrap(), 1.5);
        assert_eq!(pool.get_double(d).unwrap(), 23.976);
        assert_eq!(pool.get_string(s).unwrap(), "clip.mkv");
    }

    #[test]
    fn mismatched_get_fails_for_every_other_type() {
        let pool = ConfigPool::new();
        let id = pool.gen_double_id("video/fps", 25.0).unwrap();

        assert!(pool.get_int(id).is_err());
        assert!(pool.get_uint(id).is_err());
        assert!(pool.get_char(id).is_err());
        assert!(pool.get_wide_char(id).is_err());
        assert!(pool.get_byte(id).is_err());
        assert!(pool.get_bool(id).is_err());
        assert!(pool.get_float(id).is_err());
        assert!(pool.get_string(id).is_err());
        assert!(pool.set_float(id, 1.0).is_err());
        assert_eq!(pool.get_double(id).unwrap(), 25.0);
    }

    #[test]
    fn get_or_falls_back_silently() {
        let pool = ConfigPool::new();
        let id = pool.gen_bool_id("ui/autoscroll", true).unwrap();
        assert_eq!(pool.get_or(id, 7i32), 7);
        assert_eq!(pool.get_or(ConfigId(500), 3u32), 3);
        assert!(pool.get_or(id, false));
    }

    #[test]
    fn hierarchy_reaches_root() {
        let pool = ConfigPool::new();
        let c = pool.gen_int_id("a/b/c", 1).unwrap();
        let ab = pool.resolve("a/b").unwrap();
        let a = pool.resolve("a").unwrap();

        assert!(pool.children_of(ab).contains(&c));
        assert!(pool.children_of(a).contains(&ab));
        assert!(pool.children_of(ConfigId::ROOT).contains(&a));
        assert_eq!(pool.parent_of(a), Some(ConfigId::ROOT));
        assert_eq!(pool.type_of(ab), None);
        assert_eq!(pool.len(), 4);
    }

    #[test]
    fn reset_section_restores_defaults() {
        let pool = ConfigPool::new();
        let w = pool.gen_uint_id("video/width", 640).unwrap();
        let h = pool.gen_uint_id("video/height", 480).unwrap();
        let r = pool.gen_uint_id("audio/rate", 48000).unwrap();
        pool.set_uint(w, 1).unwrap();
        pool.set_uint(h, 2).unwrap();
        pool.set_uint(r, 3).unwrap();

        assert_eq!(pool.reset_section("video").unwrap(), 2);
        assert_eq!(pool.get_uint(w).unwrap(), 640);
        assert_eq!(pool.get_uint(h).unwrap(), 480);
        assert_eq!(pool.get_uint(r).unwrap(), 3);

        pool.reset_to_default(r).unwrap();
        assert_eq!(pool.value(r).unwrap(), ConfigValue::UInt(48000));
        assert_eq!(pool.default_of(r).unwrap(), ConfigValue::UInt(48000));
    }

    #[test]
    fn save_only_writes_section_subtree() {
        let pool = ConfigPool::new();
        pool.gen_uint_id("video/width", 640).unwrap();
        pool.gen_uint_id("audio/rate", 48000).unwrap();

        let mut store = MemoryStore::new();
        assert_eq!(pool.save_config_to_store("video", &mut store).unwrap(), 1);
        assert_eq!(store.keys(), vec!["video/width"]);

        assert_eq!(pool.save_config_to_store("", &mut store).unwrap(), 2);
        assert_eq!(store.read_uint("audio/rate", 0), 48000);
    }

    #[test]
    fn load_ignores_unknown_keys_and_other_sections() {
        let pool = ConfigPool::new();
        let w = pool.gen_uint_id("video/width", 640).unwrap();
        let r = pool.gen_uint_id("audio/rate", 48000).unwrap();

        let mut store = MemoryStore::new();
        store.write_string("video/width", "1280").unwrap();
        store.write_string("video/unknown", "whatever").unwrap();
        store.write_string("audio/rate", "44100").unwrap();
        store.write_string("bad//key", "1").unwrap();

        assert_eq!(pool.load_config_from_store("video", &store).unwrap(), 1);
        assert_eq!(pool.get_uint(w).unwrap(), 1280);
        assert_eq!(pool.get_uint(r).unwrap(), 48000);
    }

    #[test]
    fn malformed_store_value_applies_nothing() {
        let pool = ConfigPool::new();
        let w = pool.gen_uint_id("video/width", 640).unwrap();
        let h = pool.gen_uint_id("video/height", 480).unwrap();

        let mut store = MemoryStore::new();
        store.write_string("video/height", "1080").unwrap();
        store.write_string("video/width", "wide").unwrap();

        assert!(matches!(
            pool.load_config_from_store("video", &store),
            Err(ConfigError::ParseError(_))
        ));
        assert_eq!(pool.get_uint(w).unwrap(), 640);
        assert_eq!(pool.get_uint(h).unwrap(), 480);
    }

    #[test]
    fn save_keeps_values_of_unregistered_paths() {
        let dir = tempdir().unwrap();
        let prefs = dir.path().join("prefs.toml");

        let pool = ConfigPool::new();
        pool.gen_uint_id("video/width", 640).unwrap();
        pool.gen_bool_id("video/deinterlace", true).unwrap();
        pool.save_config("video", &prefs).unwrap();

        let fresh = ConfigPool::new();
        let w = fresh.gen_uint_id("video/width", 1).unwrap();
        fresh.set_uint(w, 800).unwrap();
        fresh.save_config("video", &prefs).unwrap();

        let store = TomlStore::open_existing(&prefs, None).unwrap();
        assert_eq!(store.read_uint("video/width", 0), 800);
        assert!(store.read_bool("video/deinterlace", false));
    }

    #[test]
    fn options_table_is_used_for_files() {
        let dir = tempdir().unwrap();
        let prefs = dir.path().join("prefs.toml");
        let options = PoolOptions {
            toml_table: Some("settings".into()),
            ..PoolOptions::default()
        };

        let pool = ConfigPool::with_options(options.clone());
        let id = pool.gen_int_id("timeline/zoom", 3).unwrap();
        pool.save_config("", &prefs).unwrap();
        assert!(fs::read_to_string(&prefs).unwrap().contains("[settings]"));

        let fresh = ConfigPool::with_options(options);
        fresh.gen_int_id("timeline/zoom", 0).unwrap();
        fresh.load_config("", &prefs).unwrap();
        assert_eq!(fresh.get_int(id).unwrap(), 3);
    }

    #[test]
    fn xml_string_roundtrip_restores_values() {
        let pool = ConfigPool::new();
        let w = pool.gen_uint_id("video/width", 640).unwrap();
        let n = pool.gen_string_id("video/codec/name", "h264".to_string()).unwrap();
        pool.set_uint(w, 3840).unwrap();
        pool.set_string(n, "av1 <main>".to_string()).unwrap();

        let xml = pool.save_config_to_xml_string("video").unwrap();
        pool.reset_section("video").unwrap();
        assert_eq!(pool.get_uint(w).unwrap(), 640);

        assert_eq!(pool.load_config_from_xml_string("video", &xml).unwrap(), 2);
        assert_eq!(pool.get_uint(w).unwrap(), 3840);
        assert_eq!(pool.get_string(n).unwrap(), "av1 <main>");
    }

    #[test]
    fn xml_file_roundtrip() {
        let dir = tempdir().unwrap();
        let file = dir.path().join("video.xml");

        let pool = ConfigPool::new();
        let fps = pool.gen_double_id("video/fps", 25.0).unwrap();
        pool.set_double(fps, 29.97).unwrap();
        pool.save_config_to_xml("video", &file).unwrap();

        let fresh = ConfigPool::new();
        fresh.gen_double_id("video/fps", 25.0).unwrap();
        assert_eq!(fresh.load_config_from_xml("video", &file).unwrap(), 1);
        assert_eq!(fresh.get_double(fps).unwrap(), 29.97);
    }

    #[test]
    fn malformed_xml_leaves_values_unchanged() {
        init_test_tracing();
        let pool = ConfigPool::new();
        let w = pool.gen_uint_id("video/width", 640).unwrap();
        pool.set_uint(w, 1024).unwrap();

        let warnings = Arc::new(AtomicUsize::new(0));
        let counter = warnings.clone();
        pool.set_warning_handler(Arc::new(move |_msg: &str| {
            counter.fetch_add(1, Ordering::SeqCst);
        }));

        let result = pool.load_config_from_xml_string("video", "<video><width type=\"uint\">1920</width>");
        assert!(matches!(result, Err(ConfigError::ParseError(_))));
        assert_eq!(pool.get_uint(w).unwrap(), 1024);
        assert_eq!(warnings.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn bad_value_in_xml_is_all_or_nothing() {
        let pool = ConfigPool::new();
        let w = pool.gen_uint_id("video/width", 640).unwrap();
        let h = pool.gen_uint_id("video/height", 480).unwrap();

        let xml = r#"<video><width type="uint">1920</width><height type="uint">tall</height></video>"#;
        assert!(pool.load_config_from_xml_string("video", xml).is_err());
        assert_eq!(pool.get_uint(w).unwrap(), 640);
        assert_eq!(pool.get_uint(h).unwrap(), 480);
    }

    #[test]
    fn missing_file_warns_once() {
        let dir = tempdir().unwrap();
        let pool = ConfigPool::new();
        pool.gen_uint_id("video/width", 640).unwrap();

        let messages = Arc::new(Mutex::new(Vec::new()));
        let sink = messages.clone();
        pool.set_warning_handler(Arc::new(move |msg: &str| sink.lock().push(msg.to_string())));

        let result = pool.load_config("video", dir.path().join("absent.toml"));
        assert!(matches!(result, Err(ConfigError::IoError(_))));
        let messages = messages.lock();
        assert_eq!(messages.len(), 1);
        assert!(messages[0].contains("absent.toml"));
    }

    #[test]
    fn handler_may_replace_itself() {
        let pool = Arc::new(ConfigPool::new());
        let calls = Arc::new(AtomicUsize::new(0));

        let weak = Arc::downgrade(&pool);
        let counter = calls.clone();
        pool.set_warning_handler(Arc::new(move |_msg: &str| {
            counter.fetch_add(1, Ordering::SeqCst);
            if let Some(pool) = weak.upgrade() {
                pool.clear_warning_handler();
            }
        }));

        assert!(pool.load_config_from_xml_string("video", "<broken").is_err());
        assert!(pool.load_config_from_xml_string("video", "<broken").is_err());
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn failed_save_keeps_memory_values() {
        let dir = tempdir().unwrap();
        // A directory in place of the store file makes the save fail.
        let target = dir.path().join("prefs.toml");
        fs::create_dir_all(target.join("occupied")).unwrap();

        let pool = ConfigPool::new();
        let w = pool.gen_uint_id("video/width", 640).unwrap();
        pool.set_uint(w, 720).unwrap();

        assert!(pool.save_config("video", &target).is_err());
        assert_eq!(pool.get_uint(w).unwrap(), 720);
    }

    #[test]
    fn invalid_section_is_rejected() {
        let pool = ConfigPool::new();
        assert!(matches!(
            pool.save_config_to_xml_string("video/"),
            Err(ConfigError::InvalidPath(_))
        ));
        assert!(matches!(
            pool.load_config_from_store("/video", &MemoryStore::new()),
            Err(ConfigError::InvalidPath(_))
        ));
    }

    #[test]
    fn concurrent_access_is_consistent() {
        let pool = Arc::new(ConfigPool::new());
        let counter = pool.gen_uint_id("stats/frames", 0).unwrap();

        let handles: Vec<_> = (0..8)
            .map(|t| {
                let pool = pool.clone();
                thread::spawn(move || {
                    let own = pool.gen_int_id(&format!("workers/w{}", t), t).unwrap();
                    for _ in 0..100 {
                        pool.set_int(own, t).unwrap();
                        assert_eq!(pool.get_int(own).unwrap(), t);
                        let frames = pool.get_uint(counter).unwrap();
                        pool.set_uint(counter, frames.max(1)).unwrap();
                    }
                    own
                })
            })
            .collect();

        let mut ids: Vec<ConfigId> = handles.into_iter().map(|h| h.join().unwrap()).collect();
        ids.sort();
        ids.dedup();
        assert_eq!(ids.len(), 8);
        assert_eq!(pool.children_of(pool.resolve("workers").unwrap()).len(), 8);
        assert_eq!(pool.get_uint(counter).unwrap(), 1);
    }
}
