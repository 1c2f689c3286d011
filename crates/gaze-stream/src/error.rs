// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Error types for the gaze stream

use crate::pacer::PacerError;

/// Result type alias using StreamError
pub type Result<T> = std::result::Result<T, StreamError>;

/// Error types for emitting and receiving gaze sessions
#[derive(Debug, thiserror::Error)]
pub enum StreamError {
    /// Bind, accept, connect, read or write failed. Never retried.
    #[error("Connection error: {context}: {source}")]
    Connection {
        context: String,
        #[source]
        source: std::io::Error,
    },

    /// Sample pool file is unreadable, not a list, empty, or has bad elements
    #[error("Malformed input: {0}")]
    MalformedInput(String),

    /// A line that does not follow the session protocol
    #[error("Protocol error: {0}")]
    Protocol(String),

    /// Pacer parameters out of range
    #[error("Invalid pacing: {0}")]
    InvalidPacing(#[from] PacerError),

    /// Settings derived from configuration were invalid
    #[error("Configuration error: {0}")]
    Config(#[from] gaze_config::ConfigError),
}

impl StreamError {
    pub fn connection(context: impl Into<String>, source: std::io::Error) -> Self {
        StreamError::Connection {
            context: context.into(),
            source,
        }
    }

    /// True for network failures (as opposed to bad input or settings)
    pub fn is_connection(&self) -> bool {
        matches!(self, StreamError::Connection { .. })
    }
}
