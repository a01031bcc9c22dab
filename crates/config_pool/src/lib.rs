//! Config Pool - runtime configuration registry.
//!
//! Maps hierarchical config paths (`video/width`) to compact numeric ids,
//! keeps a typed default and current value per id, and loads/saves
//! sections to key/value stores and XML documents.
//!
//! Register once, then read and write through the id:
//!
//! ```
//! use config_pool::ConfigPool;
//!
//! let pool = ConfigPool::new();
//! let fps = pool.gen_double_id("video/fps", 25.0).unwrap();
//! pool.set_double(fps, 29.97).unwrap();
//! assert_eq!(pool.get_double(fps).unwrap(), 29.97);
//! assert!(pool.get_int(fps).is_err());
//! ```

pub mod error;
pub mod logging;
pub mod options;
pub mod path;
pub mod pool;
pub mod registry;
pub mod store;
pub mod value;
pub mod xml;

pub use error::{ConfigError, ConfigResult};
pub use options::PoolOptions;
pub use pool::ConfigPool;
pub use registry::{ConfigId, ConfigRegistry};
pub use value::{ConfigType, ConfigValue, TypeTag};

/// Returns the crate version.
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
