//! # gaze-emulator
//!
//! Eye-tracker emulator: streams gaze samples over TCP at a fixed rate and
//! measures how many arrive and how fast.
//!
//! ## Components
//!
//! - **`config`** ([`gaze_config`]): TOML configuration with environment and CLI overrides
//! - **`observability`** ([`gaze_observability`]): logging setup and `--debug-<crate>` flags
//! - **`stream`** ([`gaze_stream`]): pacer, wire protocol, session emitter and receiver
//! - [`app`]: the end-to-end runs behind the `gaze-emitter` and `gaze-receiver` binaries
//!
//! ## Usage
//!
//! ```rust,no_run
//! use gaze_emulator::prelude::*;
//!
//! let config = GazeConfig::default();
//! let summary = gaze_emulator::app::run_emitter(&config)?;
//! println!("{} entries sent", summary.entries_sent);
//! # Ok::<(), anyhow::Error>(())
//! ```

pub mod app;

pub use gaze_config as config;
pub use gaze_observability as observability;
pub use gaze_stream as stream;

/// Prelude with the most commonly used types
pub mod prelude {
    pub use gaze_config::{
        load_config_or_default, validate_config, ConnectionRole, CountingMode, GazeConfig,
    };
    pub use gaze_stream::{
        Endpoint, MonotonicClock, Pacer, ReceiveReport, ReceiverSettings, Sample, SamplePool,
        SessionEmitter, SessionReceiver, SessionSummary, StreamError,
    };
}
