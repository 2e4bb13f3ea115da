//! TOML config file loading and creation.

use std::path::{Path, PathBuf};

use tracing::{info, warn};

use crate::error::ConfigError;
use crate::schema::AkibaConfig;
use crate::validation;

/// Load config from a specific TOML file path.
///
/// Missing fields fall back to serde defaults. If validation fails, a
/// warning is logged and the default config is returned.
pub fn load_from_path(path: &Path) -> Result<AkibaConfig, ConfigError> {
    if !path.exists() {
        return Err(ConfigError::FileNotFound(path.to_path_buf()));
    }

    let content = std::fs::read_to_string(path)
        .map_err(|e| ConfigError::ParseError(format!("failed to read {}: {e}", path.display())))?;

    let config: AkibaConfig = toml::from_str(&content)
        .map_err(|e| ConfigError::ParseError(format!("failed to parse TOML: {e}")))?;

    if let Err(e) = validation::validate(&config) {
        warn!("config validation warning: {e}");
        warn!("falling back to default config");
        return Ok(AkibaConfig::default());
    }

    info!("loaded config from {}", path.display());
    Ok(config)
}

/// Load config from the platform-specific default path.
///
/// If the file does not exist, creates a default config file and returns
/// defaults.
pub fn load_default() -> Result<AkibaConfig, ConfigError> {
    let path = default_config_path()?;

    if !path.exists() {
        info!("no config found at {}, creating default", path.display());
        create_default_config(&path)?;
        return Ok(AkibaConfig::default());
    }

    load_from_path(&path)
}

/// The platform-specific default config file path.
pub fn default_config_path() -> Result<PathBuf, ConfigError> {
    let config_dir = dirs::config_dir()
        .ok_or_else(|| ConfigError::ParseError("could not determine config directory".into()))?;
    Ok(config_dir.join("akiba").join("config.toml"))
}

/// Create a default TOML config file with documentation comments.
pub fn create_default_config(path: &Path) -> Result<(), ConfigError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(|e| {
            ConfigError::ParseError(format!(
                "failed to create config directory {}: {e}",
                parent.display()
            ))
        })?;
    }

    std::fs::write(path, default_config_toml()).map_err(|e| {
        ConfigError::ParseError(format!(
            "failed to write default config to {}: {e}",
            path.display()
        ))
    })?;

    info!("created default config at {}", path.display());
    Ok(())
}

fn default_config_toml() -> &'static str {
    r#"# Akiba configuration
# All values are optional; anything omitted uses the built-in default.

[boot]
# Pause after a simulated failure before the line returns to RETRYING.
fail_settle_ms = 1000
# Pause after a line resolves before the next one is scheduled.
advance_settle_ms = 100
# Randomized wait before a retry attempt.
retry_delay_min_ms = 500
retry_delay_max_ms = 1000
# Cursor blink half-period.
blink_period_ms = 500

[memory_test]
# Number of counter frames during the memory test.
steps = 100
# Final counter value, in KB.
target_kb = 16384
# Tone pitch while the test runs.
tone_hz = 440.0

[audio]
enabled = true

[logging]
# Tracing filter directive, e.g. "akiba=debug".
level = "akiba=info"
"#
}
