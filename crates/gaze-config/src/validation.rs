//! Configuration validation
//!
//! This module provides validation logic to ensure configuration values are
//! consistent and within valid ranges before any socket is opened.

use crate::{ConfigError, ConfigResult, EmitterConfig, GazeConfig, ReceiverConfig, SamplesConfig};

/// Validation errors that can occur during config validation
#[derive(Debug, Clone)]
pub enum ConfigValidationError {
    InvalidPort { port_name: String },
    MissingRequired { field: String },
    InvalidValue { field: String, reason: String },
}

impl std::fmt::Display for ConfigValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidPort { port_name } => {
                write!(f, "Port {} must not be 0", port_name)
            }
            Self::MissingRequired { field } => {
                write!(f, "Missing required configuration: {}", field)
            }
            Self::InvalidValue { field, reason } => {
                write!(f, "Invalid configuration value for {}: {}", field, reason)
            }
        }
    }
}

/// Validate the complete configuration
///
/// Checks for:
/// - Ports (0 is reserved for ephemeral binds and cannot be dialled)
/// - Required fields
/// - Valid value ranges
///
/// # Errors
///
/// Returns `ConfigError::ValidationError` listing every problem found
pub fn validate_config(config: &GazeConfig) -> ConfigResult<()> {
    let mut errors = Vec::new();
    check_emitter(&config.emitter, &mut errors);
    check_samples(&config.samples, &mut errors);
    check_receiver(&config.receiver, &mut errors);
    into_result(errors)
}

/// Validate only what the emitter reads: `[emitter]` and `[samples]`
pub fn validate_emitter_config(config: &GazeConfig) -> ConfigResult<()> {
    let mut errors = Vec::new();
    check_emitter(&config.emitter, &mut errors);
    check_samples(&config.samples, &mut errors);
    into_result(errors)
}

/// Validate only what the receiver reads: `[receiver]`
pub fn validate_receiver_config(config: &GazeConfig) -> ConfigResult<()> {
    let mut errors = Vec::new();
    check_receiver(&config.receiver, &mut errors);
    into_result(errors)
}

fn into_result(errors: Vec<ConfigValidationError>) -> ConfigResult<()> {
    if errors.is_empty() {
        return Ok(());
    }
    let error_messages = errors
        .iter()
        .map(|e| format!("  - {}", e))
        .collect::<Vec<_>>()
        .join("\n");

    Err(ConfigError::ValidationError(format!(
        "Configuration validation failed:\n{}",
        error_messages
    )))
}

fn check_emitter(emitter: &EmitterConfig, errors: &mut Vec<ConfigValidationError>) {
    if emitter.port == 0 {
        errors.push(ConfigValidationError::InvalidPort {
            port_name: "emitter.port".to_string(),
        });
    }
    if emitter.host.is_empty() {
        errors.push(ConfigValidationError::MissingRequired {
            field: "emitter.host".to_string(),
        });
    }
    if !(emitter.frequency_hz.is_finite() && emitter.frequency_hz > 0.0) {
        errors.push(ConfigValidationError::InvalidValue {
            field: "emitter.frequency_hz".to_string(),
            reason: "must be a positive number".to_string(),
        });
    }
    if !(emitter.duration_secs.is_finite() && emitter.duration_secs >= 0.0) {
        errors.push(ConfigValidationError::InvalidValue {
            field: "emitter.duration_secs".to_string(),
            reason: "must be zero or positive".to_string(),
        });
    }
    if !(emitter.prelude_delay_secs.is_finite() && emitter.prelude_delay_secs >= 0.0) {
        errors.push(ConfigValidationError::InvalidValue {
            field: "emitter.prelude_delay_secs".to_string(),
            reason: "must be zero or positive".to_string(),
        });
    }
}

fn check_samples(samples: &SamplesConfig, errors: &mut Vec<ConfigValidationError>) {
    if samples.mock_size == 0 {
        errors.push(ConfigValidationError::InvalidValue {
            field: "samples.mock_size".to_string(),
            reason: "sample pool needs at least one entry".to_string(),
        });
    }
    if samples.x_min >= samples.x_max {
        errors.push(ConfigValidationError::InvalidValue {
            field: "samples.x_min".to_string(),
            reason: "must be below samples.x_max".to_string(),
        });
    }
    if samples.y_min >= samples.y_max {
        errors.push(ConfigValidationError::InvalidValue {
            field: "samples.y_min".to_string(),
            reason: "must be below samples.y_max".to_string(),
        });
    }
}

fn check_receiver(receiver: &ReceiverConfig, errors: &mut Vec<ConfigValidationError>) {
    if receiver.port == 0 {
        errors.push(ConfigValidationError::InvalidPort {
            port_name: "receiver.port".to_string(),
        });
    }
    if receiver.host.is_empty() {
        errors.push(ConfigValidationError::MissingRequired {
            field: "receiver.host".to_string(),
        });
    }
    if receiver.read_buffer_size == 0 {
        errors.push(ConfigValidationError::InvalidValue {
            field: "receiver.read_buffer_size".to_string(),
            reason: "must be at least 1 byte".to_string(),
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = GazeConfig::default();
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn test_zero_port_rejected() {
        let mut config = GazeConfig::default();
        config.receiver.port = 0;

        match validate_config(&config) {
            Err(ConfigError::ValidationError(msg)) => assert!(msg.contains("receiver.port")),
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn test_all_problems_reported_together() {
        let mut config = GazeConfig::default();
        config.emitter.frequency_hz = 0.0;
        config.emitter.duration_secs = -3.0;
        config.samples.mock_size = 0;
        config.emitter.host = String::new();

        match validate_config(&config) {
            Err(ConfigError::ValidationError(msg)) => {
                assert!(msg.contains("emitter.frequency_hz"));
                assert!(msg.contains("emitter.duration_secs"));
                assert!(msg.contains("samples.mock_size"));
                assert!(msg.contains("emitter.host"));
            }
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn test_empty_coordinate_range_rejected() {
        let mut config = GazeConfig::default();
        config.samples.y_min = 700;
        config.samples.y_max = 700;
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn test_each_binary_checks_only_its_sections() {
        let mut config = GazeConfig::default();
        config.emitter.frequency_hz = f64::NAN;
        config.samples.mock_size = 0;
        assert!(validate_receiver_config(&config).is_ok());
        assert!(validate_emitter_config(&config).is_err());

        let mut config = GazeConfig::default();
        config.receiver.read_buffer_size = 0;
        config.receiver.port = 0;
        assert!(validate_emitter_config(&config).is_ok());
        match validate_receiver_config(&config) {
            Err(ConfigError::ValidationError(msg)) => {
                assert!(msg.contains("receiver.read_buffer_size"));
                assert!(msg.contains("receiver.port"));
            }
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn test_zero_duration_is_valid() {
        let mut config = GazeConfig::default();
        config.emitter.duration_secs = 0.0;
        assert!(validate_config(&config).is_ok());
    }
}
