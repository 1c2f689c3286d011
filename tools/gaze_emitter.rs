// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Gaze emitter
//!
//! Emulates an eye tracker: waits for (or dials) a consumer, then streams one
//! session of gaze samples at a fixed rate.
//!
//! Usage:
//!   gaze-emitter --freq 120 --duration 2m --data samples.json
//!   gaze-emitter --mock-size 1000 --seed 7 --save --debug-gaze-stream

use std::collections::HashMap;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;

use gaze_emulator::app::run_emitter;
use gaze_emulator::config::{load_config_or_default, validate_emitter_config};
use gaze_emulator::observability::{
    debug_flags_help, init_logging, parse_debug_flags, strip_debug_args, LoggingOptions,
};

#[derive(Parser, Debug)]
#[command(name = "gaze-emitter", version, about = "Stream mock gaze samples over TCP at a fixed rate")]
#[command(after_help = debug_flags_help())]
struct Args {
    /// TOML configuration file (default: discover gaze_emulator.toml)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Data sending frequency, in Hertz [default: 60]
    #[arg(short = 'f', long)]
    freq: Option<f64>,

    /// Session duration in seconds, or minutes with an `m` suffix (10 -> 10 s, 10m -> 10 min) [default: 60]
    #[arg(long)]
    duration: Option<String>,

    /// Session path announced in `session_start` [default: ./]
    #[arg(long)]
    mock_session_path: Option<String>,

    /// JSON array of {x, y} samples to send cyclically; generated when omitted
    #[arg(long)]
    data: Option<PathBuf>,

    /// Number of generated samples [default: 500]
    #[arg(long)]
    mock_size: Option<usize>,

    /// Seed for generated samples (random when omitted)
    #[arg(long)]
    seed: Option<u64>,

    /// Save generated samples after the session (ignored with --data)
    #[arg(long)]
    save: bool,

    /// Where --save writes the samples [default: mock-data.json]
    #[arg(long)]
    save_path: Option<PathBuf>,

    /// Seconds to wait between session start and the first gaze [default: 1]
    #[arg(long)]
    prelude_delay: Option<f64>,

    /// TCP port [default: 8008]
    #[arg(long)]
    port: Option<u16>,

    /// Host to bind or dial [default: 127.0.0.1]
    #[arg(long)]
    host: Option<String>,

    /// `listen` (accept one receiver) or `connect` (dial a listening receiver) [default: listen]
    #[arg(long)]
    role: Option<String>,

    /// Default log level [default: info]
    #[arg(long)]
    log_level: Option<String>,

    /// Also write JSON logs into a run folder under this directory (needs the `file-logging` feature)
    #[arg(long)]
    log_dir: Option<PathBuf>,
}

impl Args {
    /// Only flags given on the command line override the configuration.
    fn overrides(&self) -> HashMap<String, String> {
        let mut map = HashMap::new();
        let mut put = |key: &str, value: Option<String>| {
            if let Some(value) = value {
                map.insert(key.to_string(), value);
            }
        };
        put("freq", self.freq.map(|v| v.to_string()));
        put("duration", self.duration.clone());
        put("session_path", self.mock_session_path.clone());
        put("data", self.data.as_ref().map(|p| p.display().to_string()));
        put("mock_size", self.mock_size.map(|v| v.to_string()));
        put("seed", self.seed.map(|v| v.to_string()));
        put("save", self.save.then(|| "true".to_string()));
        put("save_path", self.save_path.as_ref().map(|p| p.display().to_string()));
        put("prelude_delay", self.prelude_delay.map(|v| v.to_string()));
        put("port", self.port.map(|v| v.to_string()));
        put("host", self.host.clone());
        put("role", self.role.clone());
        put("log_level", self.log_level.clone());
        map
    }
}

fn main() -> Result<()> {
    let debug_flags = parse_debug_flags();
    let args = Args::parse_from(strip_debug_args(std::env::args()));

    let config = load_config_or_default(args.config.as_deref(), Some(&args.overrides()))
        .context("Failed to load configuration")?;
    validate_emitter_config(&config).context("Invalid emitter configuration")?;

    let logging = LoggingOptions {
        log_dir: args.log_dir.clone(),
        ..LoggingOptions::with_level(config.logging.level.clone())
    };
    let _logging_guard = init_logging(&debug_flags, &logging).context("Failed to initialize logging")?;

    let summary = run_emitter(&config)?;
    tracing::debug!(
        entries = summary.entries_sent,
        elapsed = ?summary.elapsed,
        "Emitter finished"
    );
    Ok(())
}
