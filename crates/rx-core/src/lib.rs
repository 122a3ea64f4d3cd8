//! Core configuration types and errors for rxwatch.
//!
//! This crate provides the foundational types used across the workspace:
//!
//! - [`Config`]: the on-disk YAML configuration (`config.yaml`)
//! - [`WatchSettings`]: validated settings with a compiled pattern
//! - [`ConfigError`]: everything that can go wrong before watching starts
//!
//! # Example
//!
//! ```
//! use rx_core::Config;
//!
//! let config = Config::from_yaml_str("folderToWatch: ./inbox\nregexPattern: '\\w+\\d+'\n")?;
//! let settings = config.resolve()?;
//!
//! assert_eq!(settings.watch_root.as_str(), "./inbox");
//! assert!(settings.pattern.is_match("abc123"));
//! # Ok::<(), rx_core::ConfigError>(())
//! ```

#![deny(clippy::all)]
#![warn(missing_docs)]

pub mod config;
pub mod error;
pub mod settings;

pub use config::{CONFIG_FILE_NAMES, Config, default_search_dirs};
pub use error::ConfigError;
pub use settings::WatchSettings;
