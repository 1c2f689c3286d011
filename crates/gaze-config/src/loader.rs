// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Configuration file loading with override support
//!
//! This module implements the 3-tier configuration loading system:
//! 1. TOML file (base defaults)
//! 2. Environment variables (runtime overrides)
//! 3. CLI arguments (explicit user overrides)

use crate::{parse_session_duration, ConfigError, ConfigResult, GazeConfig};
use std::collections::HashMap;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

/// Default configuration file name
pub const CONFIG_FILE_NAME: &str = "gaze_emulator.toml";

/// Find the configuration file
///
/// Search order:
/// 1. `GAZE_CONFIG_PATH` environment variable
/// 2. Current working directory: `./gaze_emulator.toml`
/// 3. Up to 5 parent directories
///
/// # Errors
///
/// Returns `ConfigError::FileNotFound` if no config file is found in any location
pub fn find_config_file() -> ConfigResult<PathBuf> {
    if let Ok(env_path) = env::var("GAZE_CONFIG_PATH") {
        let path = PathBuf::from(env_path);
        if path.exists() {
            return Ok(path);
        }
        return Err(ConfigError::FileNotFound(format!(
            "Config file specified by GAZE_CONFIG_PATH not found: {}",
            path.display()
        )));
    }

    let mut search_paths = Vec::new();
    if let Ok(cwd) = env::current_dir() {
        search_paths.push(cwd.join(CONFIG_FILE_NAME));

        let mut current = cwd;
        for _ in 0..5 {
            match current.parent() {
                Some(parent) => {
                    search_paths.push(parent.join(CONFIG_FILE_NAME));
                    current = parent.to_path_buf();
                }
                None => break,
            }
        }
    }

    if let Some(path) = search_paths.iter().find(|p| p.exists()) {
        return Ok(path.clone());
    }

    let search_list = search_paths
        .iter()
        .map(|p| format!("  - {}", p.display()))
        .collect::<Vec<_>>()
        .join("\n");

    Err(ConfigError::FileNotFound(format!(
        "'{}' not found in any of these locations:\n{}\n\nSet GAZE_CONFIG_PATH to specify a custom location.",
        CONFIG_FILE_NAME, search_list
    )))
}

/// Load configuration from a TOML file
///
/// # Arguments
///
/// * `config_path` - Optional path to config file. If `None`, will search for config file.
/// * `cli_args` - Optional CLI argument overrides
///
/// # Errors
///
/// Returns error if the config file is not found, contains invalid TOML, or an
/// override carries a value that cannot be parsed
pub fn load_config(
    config_path: Option<&Path>,
    cli_args: Option<&HashMap<String, String>>,
) -> ConfigResult<GazeConfig> {
    let config_file = match config_path {
        Some(path) => path.to_path_buf(),
        None => find_config_file()?,
    };

    let content = fs::read_to_string(&config_file)?;
    let mut config: GazeConfig = toml::from_str(&content)?;

    apply_environment_overrides(&mut config)?;
    if let Some(cli) = cli_args {
        apply_cli_overrides(&mut config, cli)?;
    }

    Ok(config)
}

/// Like [`load_config`], but falls back to built-in defaults when no file is
/// found by discovery. An explicit `config_path` must still exist.
pub fn load_config_or_default(
    config_path: Option<&Path>,
    cli_args: Option<&HashMap<String, String>>,
) -> ConfigResult<GazeConfig> {
    if config_path.is_some() {
        return load_config(config_path, cli_args);
    }

    match find_config_file() {
        Ok(path) => load_config(Some(&path), cli_args),
        Err(ConfigError::FileNotFound(_)) if env::var("GAZE_CONFIG_PATH").is_err() => {
            let mut config = GazeConfig::default();
            apply_environment_overrides(&mut config)?;
            if let Some(cli) = cli_args {
                apply_cli_overrides(&mut config, cli)?;
            }
            Ok(config)
        }
        Err(e) => Err(e),
    }
}

fn parse_value<T: std::str::FromStr>(key: &str, value: &str) -> ConfigResult<T> {
    value
        .trim()
        .parse::<T>()
        .map_err(|_| ConfigError::InvalidValue(format!("{} = '{}'", key, value)))
}

fn parse_flag(value: &str) -> bool {
    let value = value.to_lowercase();
    value == "true" || value == "1" || value == "yes"
}

/// Apply environment variable overrides to configuration
///
/// Supported environment variables:
/// - `GAZE_EMITTER_HOST` -> `emitter.host`
/// - `GAZE_EMITTER_PORT` -> `emitter.port`
/// - `GAZE_EMITTER_ROLE` -> `emitter.role`
/// - `GAZE_FREQUENCY_HZ` -> `emitter.frequency_hz`
/// - `GAZE_DURATION` -> `emitter.duration_secs` (accepts `<n>m`)
/// - `GAZE_SESSION_PATH` -> `emitter.session_path`
/// - `GAZE_PRELUDE_DELAY_SECS` -> `emitter.prelude_delay_secs`
/// - `GAZE_RECEIVER_HOST` -> `receiver.host`
/// - `GAZE_RECEIVER_PORT` -> `receiver.port`
/// - `GAZE_RECEIVER_ROLE` -> `receiver.role`
/// - `GAZE_COUNTING_MODE` -> `receiver.counting`
/// - `GAZE_LOG_LEVEL` -> `logging.level`
pub fn apply_environment_overrides(config: &mut GazeConfig) -> ConfigResult<()> {
    // Emitter settings
    if let Ok(value) = env::var("GAZE_EMITTER_HOST") {
        config.emitter.host = value;
    }
    if let Ok(value) = env::var("GAZE_EMITTER_PORT") {
        config.emitter.port = parse_value("GAZE_EMITTER_PORT", &value)?;
    }
    if let Ok(value) = env::var("GAZE_EMITTER_ROLE") {
        config.emitter.role = value.parse()?;
    }
    if let Ok(value) = env::var("GAZE_FREQUENCY_HZ") {
        config.emitter.frequency_hz = parse_value("GAZE_FREQUENCY_HZ", &value)?;
    }
    if let Ok(value) = env::var("GAZE_DURATION") {
        config.emitter.duration_secs = parse_session_duration(&value)?.as_secs_f64();
    }
    if let Ok(value) = env::var("GAZE_SESSION_PATH") {
        config.emitter.session_path = value;
    }
    if let Ok(value) = env::var("GAZE_PRELUDE_DELAY_SECS") {
        config.emitter.prelude_delay_secs = parse_value("GAZE_PRELUDE_DELAY_SECS", &value)?;
    }

    // Receiver settings
    if let Ok(value) = env::var("GAZE_RECEIVER_HOST") {
        config.receiver.host = value;
    }
    if let Ok(value) = env::var("GAZE_RECEIVER_PORT") {
        config.receiver.port = parse_value("GAZE_RECEIVER_PORT", &value)?;
    }
    if let Ok(value) = env::var("GAZE_RECEIVER_ROLE") {
        config.receiver.role = value.parse()?;
    }
    if let Ok(value) = env::var("GAZE_COUNTING_MODE") {
        config.receiver.counting = value.parse()?;
    }

    if let Ok(value) = env::var("GAZE_LOG_LEVEL") {
        config.logging.level = value;
    }

    Ok(())
}

/// Apply CLI argument overrides to configuration
///
/// `port`, `host` and `role` apply to both sides; each binary only reads its own section.
///
/// # Arguments
///
/// * `config` - Configuration to modify
/// * `cli_args` - HashMap of CLI arguments (e.g., `{"freq": "120", "duration": "2m"}`)
pub fn apply_cli_overrides(
    config: &mut GazeConfig,
    cli_args: &HashMap<String, String>,
) -> ConfigResult<()> {
    if let Some(value) = cli_args.get("host") {
        config.emitter.host = value.clone();
        config.receiver.host = value.clone();
    }
    if let Some(value) = cli_args.get("port") {
        let port = parse_value("port", value)?;
        config.emitter.port = port;
        config.receiver.port = port;
    }
    if let Some(value) = cli_args.get("role") {
        let role = value.parse()?;
        config.emitter.role = role;
        config.receiver.role = role;
    }

    // Emitter settings
    if let Some(value) = cli_args.get("freq") {
        config.emitter.frequency_hz = parse_value("freq", value)?;
    }
    if let Some(value) = cli_args.get("duration") {
        config.emitter.duration_secs = parse_session_duration(value)?.as_secs_f64();
    }
    if let Some(value) = cli_args.get("session_path") {
        config.emitter.session_path = value.clone();
    }
    if let Some(value) = cli_args.get("prelude_delay") {
        config.emitter.prelude_delay_secs = parse_value("prelude_delay", value)?;
    }

    // Sample pool settings
    if let Some(value) = cli_args.get("data") {
        config.samples.data_file = Some(PathBuf::from(value));
    }
    if let Some(value) = cli_args.get("mock_size") {
        config.samples.mock_size = parse_value("mock_size", value)?;
    }
    if let Some(value) = cli_args.get("seed") {
        config.samples.seed = Some(parse_value("seed", value)?);
    }
    if let Some(value) = cli_args.get("save") {
        config.samples.save_generated = parse_flag(value);
    }
    if let Some(value) = cli_args.get("save_path") {
        config.samples.save_path = PathBuf::from(value);
    }

    // Receiver settings
    if let Some(value) = cli_args.get("counting") {
        config.receiver.counting = value.parse()?;
    }

    if let Some(value) = cli_args.get("log_level") {
        config.logging.level = value.clone();
    }

    Ok(())
}
