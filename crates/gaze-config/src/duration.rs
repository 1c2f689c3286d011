//! Session duration strings
//!
//! Durations are given either as plain seconds (`"90"`, `"0.5"`) or as
//! minutes with an `m` suffix (`"10m"`).

use std::time::Duration;

use crate::{ConfigError, ConfigResult};

/// Parse a session duration string into a [`Duration`].
///
/// # Errors
///
/// Returns `ConfigError::InvalidValue` for empty, negative or non-numeric input.
pub fn parse_session_duration(text: &str) -> ConfigResult<Duration> {
    let trimmed = text.trim();
    let (number, scale) = match trimmed.strip_suffix('m') {
        Some(minutes) => (minutes.trim(), 60.0),
        None => (trimmed, 1.0),
    };

    let value: f64 = number.parse().map_err(|_| {
        ConfigError::InvalidValue(format!(
            "duration must be seconds or '<n>m' minutes, got '{}'",
            text
        ))
    })?;

    Duration::try_from_secs_f64(value * scale).map_err(|_| {
        ConfigError::InvalidValue(format!("duration must be non-negative, got '{}'", text))
    })
}
