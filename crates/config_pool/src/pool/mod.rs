//! Config store facade.
//!
//! This module provides:
//! - [`ConfigPool`]: typed get/set by id over a shared registry
//! - Bulk load/save against TOML stores, any [`crate::store::ConfigStore`]
//!   and XML documents
//! - A process-wide instance behind [`get`] / [`unload`]
//!
//! # Example
//!
//! ```no_run
//! use config_pool::pool;
//!
//! let config = pool::get();
//! let width = config.gen_uint_id("video/width", 640).unwrap();
//!
//! config.load_config("video", ".config/prefs.toml").unwrap();
//! println!("width: {}", config.get_uint(width).unwrap());
//!
//! config.set_uint(width, 1920).unwrap();
//! config.save_config("video", ".config/prefs.toml").unwrap();
//! ```

mod facade;
mod global;

pub use facade::ConfigPool;
pub use global::{get, get_or_init_with, is_loaded, unload};
