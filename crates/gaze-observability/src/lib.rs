// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! # gaze-observability
//!
//! Logging setup shared by the gaze emitter and receiver binaries, with
//! per-crate debug flag support.
//!
//! ## Features
//! - `file-logging`: JSON log files in timestamped run folders with retention cleanup

/// Crate version from Cargo.toml
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub mod cli;
pub mod config;
pub mod init;

// Re-export commonly used items
pub use cli::*;
pub use config::*;
pub use init::*;

/// Workspace crate names accepted by `--debug-<crate>`
pub const KNOWN_CRATES: &[&str] = &["gaze-config", "gaze-stream", "gaze-emulator"];
