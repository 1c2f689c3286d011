// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! # gaze-stream
//!
//! Rate-paced gaze sample streaming over TCP.
//!
//! - [`Pacer`]: non-blocking fixed-rate tick gate with a hard duration limit
//! - [`SessionEmitter`]: sends `session_start`, paced `gaze` messages and `session_end`
//! - [`SessionReceiver`]: counts what arrived and measures throughput
//!
//! ```no_run
//! use gaze_stream::{Endpoint, MonotonicClock, ReceiverSettings, SessionReceiver};
//!
//! let receiver = SessionReceiver::new(ReceiverSettings::default(), MonotonicClock::new());
//! let report = receiver.receive_session(&Endpoint::connect("127.0.0.1:8008"))?;
//! println!("{}", report);
//! # Ok::<(), gaze_stream::StreamError>(())
//! ```

pub mod clock;
pub mod emitter;
pub mod error;
pub mod pacer;
pub mod protocol;
pub mod receiver;
pub mod report;
pub mod samples;
pub mod transport;

pub use clock::{epoch_millis, ManualClock, MonotonicClock, TimeSource};
pub use emitter::{run_session, EmitterSettings, SessionEmitter, SessionSummary};
pub use error::{Result, StreamError};
pub use pacer::{PacedTicks, Pacer, PacerError, PacerPoll, Tick};
pub use protocol::{LineFramer, Message, SessionId};
pub use receiver::{ReceiveAnomaly, ReceiveReport, ReceiverSettings, SessionReceiver};
pub use report::format_timespan;
pub use samples::{resolve_pool, MockSampleSpec, PoolOrigin, Sample, SamplePool};
pub use transport::{BoundEndpoint, Endpoint};

pub use gaze_config::{ConnectionRole, CountingMode};
