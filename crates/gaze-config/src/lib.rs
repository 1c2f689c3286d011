// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! # Gaze Emulator Configuration
//!
//! Type-safe configuration loader for the gaze emitter and receiver with support for:
//! - TOML file parsing (`gaze_emulator.toml`)
//! - Environment variable overrides (`GAZE_*`)
//! - CLI argument overrides
//!
//! ## Usage
//!
//! ```rust,no_run
//! use gaze_config::{load_config_or_default, GazeConfig};
//!
//! // Built-in defaults are used when no config file is present
//! let config: GazeConfig = load_config_or_default(None, None).expect("Failed to load config");
//!
//! println!("Emitter port: {}", config.emitter.port);
//! println!("Frequency: {}Hz", config.emitter.frequency_hz);
//! ```

/// Crate version from Cargo.toml
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub mod duration;
pub mod loader;
pub mod types;
pub mod validation;

pub use duration::parse_session_duration;
pub use loader::{
    apply_cli_overrides, apply_environment_overrides, find_config_file, load_config,
    load_config_or_default,
};
pub use types::*;
pub use validation::{
    validate_config, validate_emitter_config, validate_receiver_config, ConfigValidationError,
};

/// Re-export for convenience
pub use serde;

/// Configuration error types
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Config file not found. Searched: {0}")]
    FileNotFound(String),

    #[error("Failed to read config file: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Invalid TOML syntax: {0}")]
    ParseError(String),

    #[error("Validation failed: {0}")]
    ValidationError(String),

    #[error("Invalid configuration value: {0}")]
    InvalidValue(String),
}

impl From<toml::de::Error> for ConfigError {
    fn from(err: toml::de::Error) -> Self {
        ConfigError::ParseError(err.to_string())
    }
}

/// Result type for configuration operations
pub type ConfigResult<T> = Result<T, ConfigError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_round_trips_through_toml() {
        let config = GazeConfig::default();
        let text = toml::to_string(&config).unwrap();
        let parsed: GazeConfig = toml::from_str(&text).unwrap();
        assert_eq!(parsed.emitter.port, config.emitter.port);
        assert_eq!(parsed.receiver.counting, config.receiver.counting);
    }

    #[test]
    fn test_toml_error_maps_to_parse_error() {
        let err: ConfigError = toml::from_str::<GazeConfig>("[emitter\nport = 1")
            .unwrap_err()
            .into();
        assert!(matches!(err, ConfigError::ParseError(_)));
    }
}
