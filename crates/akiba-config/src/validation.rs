//! Configuration validation.
//!
//! Validates all numeric ranges, collecting every error before reporting.

use crate::error::ConfigError;
use crate::schema::AkibaConfig;

/// Run all validations on a config, collecting all errors.
pub fn validate(config: &AkibaConfig) -> Result<(), ConfigError> {
    let mut errors: Vec<String> = Vec::new();

    validate_range(&mut errors, "boot.fail_settle_ms", config.boot.fail_settle_ms, 0, 60_000);
    validate_range(
        &mut errors,
        "boot.advance_settle_ms",
        config.boot.advance_settle_ms,
        0,
        60_000,
    );
    validate_range(
        &mut errors,
        "boot.retry_delay_min_ms",
        config.boot.retry_delay_min_ms,
        0,
        60_000,
    );
    validate_range(
        &mut errors,
        "boot.retry_delay_max_ms",
        config.boot.retry_delay_max_ms,
        0,
        60_000,
    );
    if config.boot.retry_delay_min_ms > config.boot.retry_delay_max_ms {
        errors.push(format!(
            "boot.retry_delay_min_ms ({}) must not exceed boot.retry_delay_max_ms ({})",
            config.boot.retry_delay_min_ms, config.boot.retry_delay_max_ms
        ));
    }
    validate_range(&mut errors, "boot.blink_period_ms", config.boot.blink_period_ms, 50, 5_000);

    validate_range(&mut errors, "memory_test.steps", u64::from(config.memory_test.steps), 1, 10_000);
    validate_range(
        &mut errors,
        "memory_test.target_kb",
        u64::from(config.memory_test.target_kb),
        1,
        16 * 1024 * 1024,
    );
    if !(20.0..=20_000.0).contains(&config.memory_test.tone_hz) {
        errors.push(format!(
            "memory_test.tone_hz ({}) must be between 20 and 20000",
            config.memory_test.tone_hz
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(ConfigError::ValidationError(errors.join("; ")))
    }
}

fn validate_range(errors: &mut Vec<String>, field: &str, value: u64, min: u64, max: u64) {
    if value < min || value > max {
        errors.push(format!("{field} ({value}) must be between {min} and {max}"));
    }
}
