//! Identifier registry: config paths, numeric ids and the path hierarchy.
//!
//! Paths are registered once with a typed default and receive a stable
//! [`ConfigId`]. Id `1` is the implicit root; ids start at `2` and are
//! allocated in registration order.
//!
//! # Example
//!
//! ```
//! use config_pool::registry::{ConfigId, ConfigRegistry};
//! use config_pool::ConfigValue;
//!
//! let mut registry = ConfigRegistry::new();
//! let width = registry.register("video/width", ConfigValue::UInt(640)).unwrap();
//!
//! assert_eq!(width, ConfigId(2));
//! assert_eq!(registry.resolve("video.width"), Some(width));
//! assert_eq!(registry.get::<u32>(width).unwrap(), 640);
//! ```

mod tree;
mod types;

pub use tree::ConfigRegistry;
pub use types::{ConfigId, ConfigNode};
