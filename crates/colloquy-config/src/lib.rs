//! Colloquy configuration system.
//!
//! TOML-based configuration with validation. All config sections use
//! sensible defaults so partial configs work out of the box.
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use colloquy_config::load_config;
//!
//! let config = load_config(None).expect("failed to load config");
//! println!("sandbox runs {}", config.sandbox.interpreter);
//! ```

pub mod paths;
pub mod schema;
pub mod toml_loader;
pub mod validation;

pub use schema::{ColloquyConfig, CONFIG_SCHEMA_VERSION};

use std::path::Path;

use colloquy_common::ConfigError;

/// Load config from `path`, or from the platform default location when
/// `None` (creating a commented `config.toml` on first run).
///
/// Out-of-range values are logged as warnings, not returned as errors.
pub fn load_config(path: Option<&Path>) -> Result<ColloquyConfig, ConfigError> {
    match path {
        Some(path) => toml_loader::load_from_path(path),
        None => toml_loader::load_default(),
    }
}
