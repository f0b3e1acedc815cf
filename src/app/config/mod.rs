//! Filesystem-backed configuration loading.
//!
//! Schema and validation live in `domain::config`.

mod load_config;

pub use load_config::{DEFAULT_CONFIG_FILE, load_config};
