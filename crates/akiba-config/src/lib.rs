//! Akiba configuration system.
//!
//! TOML-based configuration for the boot simulation: pacing intervals,
//! memory-test animation parameters, audio, and logging. All sections use
//! `serde(default)` so partial configs work out of the box.

pub mod error;
pub mod schema;
pub mod toml_loader;
pub mod validation;

pub use error::ConfigError;
pub use schema::{AkibaConfig, CONFIG_SCHEMA_VERSION};

/// Load config from the platform default path.
///
/// Creates a default `config.toml` on first run, then validates the result.
pub fn load_config() -> Result<AkibaConfig, ConfigError> {
    let config = toml_loader::load_default()?;
    validation::validate(&config)?;
    Ok(config)
}
