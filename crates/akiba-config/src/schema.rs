//! Configuration schema types.
//!
//! All structs use `serde(default)` so partial configs work correctly.
//! Defaults reproduce the classic pacing of the boot sequence.

use serde::{Deserialize, Serialize};

/// Current config schema version.
pub const CONFIG_SCHEMA_VERSION: u32 = 1;

/// Root configuration.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct AkibaConfig {
    pub boot: BootConfig,
    pub memory_test: MemoryTestConfig,
    pub audio: AudioConfig,
    pub logging: LoggingConfig,
}

/// Pacing of the line state machine and the cursor blink.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BootConfig {
    /// Pause after a FAIL before the line flips back to RETRYING.
    pub fail_settle_ms: u64,
    /// Pause after a successful resolve before the next line is scheduled.
    pub advance_settle_ms: u64,
    /// Bounds for the randomized wait between RETRYING and the next attempt.
    pub retry_delay_min_ms: u64,
    pub retry_delay_max_ms: u64,
    /// Cursor blink half-period.
    pub blink_period_ms: u64,
}

impl Default for BootConfig {
    fn default() -> Self {
        Self {
            fail_settle_ms: 1000,
            advance_settle_ms: 100,
            retry_delay_min_ms: 500,
            retry_delay_max_ms: 1000,
            blink_period_ms: 500,
        }
    }
}

/// Memory-test progress animation settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MemoryTestConfig {
    /// Number of intermediate counter frames.
    pub steps: u32,
    /// Final counter value, in KB.
    pub target_kb: u32,
    /// Tone pitch during the test.
    pub tone_hz: f32,
}

impl Default for MemoryTestConfig {
    fn default() -> Self {
        Self {
            steps: 100,
            target_kb: 16384,
            tone_hz: 440.0,
        }
    }
}

/// Audio output settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AudioConfig {
    pub enabled: bool,
}

impl Default for AudioConfig {
    fn default() -> Self {
        Self { enabled: true }
    }
}

/// Logging settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Tracing filter directive, e.g. `akiba=debug`.
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "akiba=info".into(),
        }
    }
}
