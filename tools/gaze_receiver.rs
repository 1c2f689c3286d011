//! Gaze receiver
//!
//! Receives one gaze session and prints how many entries arrived and the
//! achieved throughput.
//!
//! Usage:
//!   gaze-receiver --port 8008
//!   gaze-receiver --counting lines --role listen

use std::collections::HashMap;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;

use gaze_emulator::app::run_receiver;
use gaze_emulator::config::{load_config_or_default, validate_receiver_config};
use gaze_emulator::observability::{
    debug_flags_help, init_logging, parse_debug_flags, strip_debug_args, LoggingOptions,
};

#[derive(Parser, Debug)]
#[command(name = "gaze-receiver", version, about = "Receive one gaze session and report throughput")]
#[command(after_help = debug_flags_help())]
struct Args {
    /// TOML configuration file (default: discover gaze_emulator.toml)
    #[arg(long)]
    config: Option<PathBuf>,

    /// TCP port [default: 8008]
    #[arg(long)]
    port: Option<u16>,

    /// Host to dial or bind [default: 127.0.0.1]
    #[arg(long)]
    host: Option<String>,

    /// `connect` (dial a listening emitter) or `listen` (accept one emitter) [default: connect]
    #[arg(long)]
    role: Option<String>,

    /// `chunks` (one entry per socket read) or `lines` (parsed gaze messages) [default: chunks]
    #[arg(long)]
    counting: Option<String>,

    /// Default log level [default: info]
    #[arg(long)]
    log_level: Option<String>,

    /// Also write JSON logs into a run folder under this directory (needs the `file-logging` feature)
    #[arg(long)]
    log_dir: Option<PathBuf>,
}

impl Args {
    fn overrides(&self) -> HashMap<String, String> {
        let mut map = HashMap::new();
        if let Some(port) = self.port {
            map.insert("port".to_string(), port.to_string());
        }
        for (key, value) in [
            ("host", &self.host),
            ("role", &self.role),
            ("counting", &self.counting),
            ("log_level", &self.log_level),
        ] {
            if let Some(value) = value {
                map.insert(key.to_string(), value.clone());
            }
        }
        map
    }
}

fn main() -> Result<()> {
    let debug_flags = parse_debug_flags();
    let args = Args::parse_from(strip_debug_args(std::env::args()));

    let config = load_config_or_default(args.config.as_deref(), Some(&args.overrides()))
        .context("Failed to load configuration")?;
    validate_receiver_config(&config).context("Invalid receiver configuration")?;

    let logging = LoggingOptions {
        log_dir: args.log_dir.clone(),
        ..LoggingOptions::with_level(config.logging.level.clone())
    };
    let _logging_guard = init_logging(&debug_flags, &logging).context("Failed to initialize logging")?;

    let report = run_receiver(&config)?;
    println!("{}", report);
    Ok(())
}
