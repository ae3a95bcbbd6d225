//! Config file loading and caching.
//!
//! Handles key/value file parsing, path resolution through the
//! `AWS_CONFIG_FILE` override, and the process-wide load-once cache.

pub mod parser;
pub mod store;

pub use store::{ConfigError, ConfigFile, ConfigReader, ConfigStore, DiskReader};
