//! # Capture Configuration
//!
//! Tunable timing and scanner settings for a scan session.
//!
//! ## Configuration Sources
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Configuration Priority                               │
//! │                                                                         │
//! │  1. Environment Variables (highest priority)                           │
//! │     SHELFSCAN_COOLDOWN_MS=1500                                         │
//! │     SHELFSCAN_SETTLE_DELAY_MS=500                                      │
//! │     SHELFSCAN_CAPTURE_QUALITY=0.5                                      │
//! │     SHELFSCAN_CODE_TYPES=qr,ean13                                      │
//! │                                                                         │
//! │  2. TOML Config File                                                   │
//! │     ~/.config/shelfscan/config.toml (Linux)                            │
//! │     ~/Library/Application Support/com.shelfscan.shelfscan/... (macOS)  │
//! │                                                                         │
//! │  3. Default Values (lowest priority)                                   │
//! │     2000 ms cooldown, 500 ms settle delay, quality 0.5                 │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Configuration File Format
//! ```toml
//! # config.toml
//! [gate]
//! cooldown_ms = 2000
//! tick_interval_ms = 100
//!
//! [capture]
//! settle_delay_ms = 500
//! quality = 0.5
//! shutter_sound = false
//!
//! [scanner]
//! accepted_code_types = ["qr", "ean13", "ean8", "upc_e", "upc_a", "code128"]
//! ```

use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use shelfscan_core::validation::{validate_capture_quality, validate_code_type, validate_cooldown};
use shelfscan_core::{
    CaptureOptions, DEFAULT_CAPTURE_QUALITY, DEFAULT_CODE_TYPES, DEFAULT_COOLDOWN,
    DEFAULT_SETTLE_DELAY,
};
use tracing::{debug, info, warn};

use crate::error::{SessionError, SessionResult};

// =============================================================================
// Gate Settings
// =============================================================================

/// Scan gate timing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GateSettings {
    /// Cooldown after an admitted barcode capture, in milliseconds.
    #[serde(default = "default_cooldown_ms")]
    pub cooldown_ms: u64,

    /// How often the gate timer checks for an elapsed cooldown.
    #[serde(default = "default_tick_interval_ms")]
    pub tick_interval_ms: u64,
}

fn default_cooldown_ms() -> u64 {
    DEFAULT_COOLDOWN.as_millis() as u64
}

fn default_tick_interval_ms() -> u64 {
    100
}

impl Default for GateSettings {
    fn default() -> Self {
        GateSettings {
            cooldown_ms: default_cooldown_ms(),
            tick_interval_ms: default_tick_interval_ms(),
        }
    }
}

// =============================================================================
// Capture Settings
// =============================================================================

/// Photo acquisition settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CaptureSettings {
    /// Pause before a barcode-triggered photo so focus and exposure settle.
    #[serde(default = "default_settle_delay_ms")]
    pub settle_delay_ms: u64,

    /// Compression quality passed to the camera (0.0 – 1.0).
    #[serde(default = "default_quality")]
    pub quality: f32,

    /// Play the shutter sound.
    #[serde(default)]
    pub shutter_sound: bool,
}

fn default_settle_delay_ms() -> u64 {
    DEFAULT_SETTLE_DELAY.as_millis() as u64
}

fn default_quality() -> f32 {
    DEFAULT_CAPTURE_QUALITY
}

impl Default for CaptureSettings {
    fn default() -> Self {
        CaptureSettings {
            settle_delay_ms: default_settle_delay_ms(),
            quality: default_quality(),
            shutter_sound: false,
        }
    }
}

// =============================================================================
// Scanner Settings
// =============================================================================

/// Which decoded symbologies may start a capture.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScannerSettings {
    #[serde(default = "default_code_types")]
    pub accepted_code_types: Vec<String>,
}

fn default_code_types() -> Vec<String> {
    DEFAULT_CODE_TYPES.iter().map(|s| s.to_string()).collect()
}

impl Default for ScannerSettings {
    fn default() -> Self {
        ScannerSettings {
            accepted_code_types: default_code_types(),
        }
    }
}

// =============================================================================
// Capture Config
// =============================================================================

/// Complete scan-session configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CaptureConfig {
    #[serde(default)]
    pub gate: GateSettings,

    #[serde(default)]
    pub capture: CaptureSettings,

    #[serde(default)]
    pub scanner: ScannerSettings,
}

impl CaptureConfig {
    /// Creates a config with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads configuration from file, environment, and defaults.
    ///
    /// ## Load Order (later overrides earlier)
    /// 1. Default values
    /// 2. Config file (config.toml)
    /// 3. Environment variables
    pub fn load(config_path: Option<PathBuf>) -> SessionResult<Self> {
        let mut config = Self::default();

        if let Some(path) = config_path.or_else(Self::default_config_path) {
            if path.exists() {
                info!(?path, "Loading capture config from file");
                let contents = std::fs::read_to_string(&path)?;
                config = toml::from_str(&contents)?;
            } else {
                debug!(?path, "Config file not found, using defaults");
            }
        }

        config.apply_overrides(|key| std::env::var(key).ok());
        config.validate()?;

        Ok(config)
    }

    /// Loads config or returns default if load fails.
    pub fn load_or_default(config_path: Option<PathBuf>) -> Self {
        Self::load(config_path).unwrap_or_else(|e| {
            warn!("Failed to load capture config: {}. Using defaults.", e);
            Self::default()
        })
    }

    /// Saves configuration to file.
    pub fn save(&self, config_path: Option<PathBuf>) -> SessionResult<()> {
        let path = config_path
            .or_else(Self::default_config_path)
            .ok_or_else(|| SessionError::ConfigSaveFailed("No config path available".into()))?;

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .map_err(|e| SessionError::ConfigSaveFailed(e.to_string()))?;
        }

        let contents = toml::to_string_pretty(self)?;
        std::fs::write(&path, contents).map_err(|e| SessionError::ConfigSaveFailed(e.to_string()))?;

        info!(?path, "Capture config saved");
        Ok(())
    }

    /// Validates the configuration.
    pub fn validate(&self) -> SessionResult<()> {
        validate_cooldown(self.cooldown())?;
        validate_capture_quality(self.capture.quality)?;

        if self.gate.tick_interval_ms == 0 {
            return Err(SessionError::InvalidConfig(
                "tick_interval_ms must be greater than 0".into(),
            ));
        }

        if self.scanner.accepted_code_types.is_empty() {
            return Err(SessionError::InvalidConfig(
                "at least one accepted code type is required".into(),
            ));
        }

        Ok(())
    }

    /// Applies `SHELFSCAN_*` overrides from a key lookup.
    ///
    /// `load` passes the process environment; tests pass a map.
    pub fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(value) = lookup("SHELFSCAN_COOLDOWN_MS") {
            match value.trim().parse::<u64>() {
                Ok(ms) => {
                    debug!(cooldown_ms = ms, "Overriding cooldown from environment");
                    self.gate.cooldown_ms = ms;
                }
                Err(_) => warn!(value = %value, "Ignoring invalid SHELFSCAN_COOLDOWN_MS"),
            }
        }

        if let Some(value) = lookup("SHELFSCAN_SETTLE_DELAY_MS") {
            match value.trim().parse::<u64>() {
                Ok(ms) => {
                    debug!(settle_delay_ms = ms, "Overriding settle delay from environment");
                    self.capture.settle_delay_ms = ms;
                }
                Err(_) => warn!(value = %value, "Ignoring invalid SHELFSCAN_SETTLE_DELAY_MS"),
            }
        }

        if let Some(value) = lookup("SHELFSCAN_CAPTURE_QUALITY") {
            match value.trim().parse::<f32>() {
                Ok(q) => self.capture.quality = q,
                Err(_) => warn!(value = %value, "Ignoring invalid SHELFSCAN_CAPTURE_QUALITY"),
            }
        }

        if let Some(value) = lookup("SHELFSCAN_CODE_TYPES") {
            let types: Vec<String> = value
                .split(',')
                .map(|s| s.trim().to_lowercase())
                .filter(|s| !s.is_empty())
                .collect();
            if !types.is_empty() {
                debug!(?types, "Overriding accepted code types from environment");
                self.scanner.accepted_code_types = types;
            }
        }
    }

    /// Returns the default config file path.
    fn default_config_path() -> Option<PathBuf> {
        directories::ProjectDirs::from("com", "shelfscan", "shelfscan")
            .map(|dirs| dirs.config_dir().join("config.toml"))
    }

    // =========================================================================
    // Convenience Methods
    // =========================================================================

    pub fn cooldown(&self) -> Duration {
        Duration::from_millis(self.gate.cooldown_ms)
    }

    pub fn settle_delay(&self) -> Duration {
        Duration::from_millis(self.capture.settle_delay_ms)
    }

    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.gate.tick_interval_ms)
    }

    /// Options handed to [`crate::CameraCapability::capture_photo`].
    pub fn capture_options(&self) -> CaptureOptions {
        CaptureOptions {
            quality: self.capture.quality,
            shutter_sound: self.capture.shutter_sound,
        }
    }

    /// Returns true if barcodes of this symbology may start a capture.
    pub fn accepts_code_type(&self, code_type: &str) -> bool {
        validate_code_type(code_type, &self.scanner.accepted_code_types).is_ok()
    }
}
