// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Configuration type definitions
//!
//! This module defines all configuration structs that map to sections in
//! `gaze_emulator.toml`.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use crate::{ConfigError, ConfigResult};

/// Root configuration structure
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct GazeConfig {
    pub emitter: EmitterConfig,
    pub receiver: ReceiverConfig,
    pub samples: SamplesConfig,
    pub logging: LoggingConfig,
}

/// Which side of the TCP handshake a process takes.
///
/// Both the emitter and the receiver can either bind and accept exactly one
/// peer (`Listen`) or dial out to a waiting peer (`Connect`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ConnectionRole {
    Listen,
    Connect,
}

impl fmt::Display for ConnectionRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConnectionRole::Listen => write!(f, "listen"),
            ConnectionRole::Connect => write!(f, "connect"),
        }
    }
}

impl FromStr for ConnectionRole {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "listen" | "server" => Ok(ConnectionRole::Listen),
            "connect" | "client" => Ok(ConnectionRole::Connect),
            other => Err(ConfigError::InvalidValue(format!(
                "connection role must be 'listen' or 'connect', got '{}'",
                other
            ))),
        }
    }
}

/// How the receiver turns inbound bytes into an entry count.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CountingMode {
    /// One entry per non-empty socket read.
    Chunks,
    /// One entry per complete, newline-delimited gaze message.
    Lines,
}

impl fmt::Display for CountingMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CountingMode::Chunks => write!(f, "chunks"),
            CountingMode::Lines => write!(f, "lines"),
        }
    }
}

impl FromStr for CountingMode {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "chunks" => Ok(CountingMode::Chunks),
            "lines" => Ok(CountingMode::Lines),
            other => Err(ConfigError::InvalidValue(format!(
                "counting mode must be 'chunks' or 'lines', got '{}'",
                other
            ))),
        }
    }
}

/// Session emitter configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct EmitterConfig {
    pub host: String,
    pub port: u16,
    pub role: ConnectionRole,
    /// Gaze samples per second
    pub frequency_hz: f64,
    /// Total emission time in seconds
    pub duration_secs: f64,
    /// Pause between the session-start message and the first gaze sample
    pub prelude_delay_secs: f64,
    /// Path announced in the session-start message
    pub session_path: String,
    pub tcp_nodelay: bool,
}

impl Default for EmitterConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8008,
            role: ConnectionRole::Listen,
            frequency_hz: 60.0,
            duration_secs: 60.0,
            prelude_delay_secs: 1.0,
            session_path: "./".to_string(),
            tcp_nodelay: true,
        }
    }
}

impl EmitterConfig {
    /// `host:port` string used for bind or connect
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Time between two gaze samples
    pub fn interval(&self) -> ConfigResult<Duration> {
        if !(self.frequency_hz.is_finite() && self.frequency_hz > 0.0) {
            return Err(ConfigError::InvalidValue(format!(
                "emitter.frequency_hz must be positive, got {}",
                self.frequency_hz
            )));
        }
        secs_to_duration("emitter.frequency_hz", 1.0 / self.frequency_hz)
    }

    pub fn session_duration(&self) -> ConfigResult<Duration> {
        secs_to_duration("emitter.duration_secs", self.duration_secs)
    }

    pub fn prelude_delay(&self) -> ConfigResult<Duration> {
        secs_to_duration("emitter.prelude_delay_secs", self.prelude_delay_secs)
    }
}

/// Session receiver configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ReceiverConfig {
    pub host: String,
    pub port: u16,
    pub role: ConnectionRole,
    pub counting: CountingMode,
    /// Maximum bytes requested per socket read
    pub read_buffer_size: usize,
}

impl Default for ReceiverConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8008,
            role: ConnectionRole::Connect,
            counting: CountingMode::Chunks,
            read_buffer_size: 1024,
        }
    }
}

impl ReceiverConfig {
    /// `host:port` string used for bind or connect
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Sample pool source and mock generation settings
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct SamplesConfig {
    /// JSON file holding `[{"x": .., "y": ..}, ...]`; generated when absent
    pub data_file: Option<PathBuf>,
    pub mock_size: usize,
    /// Fixed RNG seed for reproducible mock pools
    pub seed: Option<u64>,
    pub save_generated: bool,
    pub save_path: PathBuf,
    pub x_min: i64,
    pub x_max: i64,
    pub y_min: i64,
    pub y_max: i64,
}

impl Default for SamplesConfig {
    fn default() -> Self {
        Self {
            data_file: None,
            mock_size: 500,
            seed: None,
            save_generated: false,
            save_path: PathBuf::from("mock-data.json"),
            x_min: 500,
            x_max: 1000,
            y_min: 400,
            y_max: 700,
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Default level when no per-crate debug flag applies (trace, debug, info, warn, error)
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

fn secs_to_duration(field: &str, secs: f64) -> ConfigResult<Duration> {
    Duration::try_from_secs_f64(secs).map_err(|_| {
        ConfigError::InvalidValue(format!(
            "{} must be a non-negative number of seconds, got {}",
            field, secs
        ))
    })
}
