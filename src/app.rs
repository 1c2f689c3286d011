// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! End-to-end runs driven by a loaded [`GazeConfig`]

use anyhow::{Context, Result};
use tracing::info;

use gaze_config::GazeConfig;
use gaze_stream::{
    resolve_pool, EmitterSettings, Endpoint, MonotonicClock, PoolOrigin, ReceiveReport,
    ReceiverSettings, SessionEmitter, SessionReceiver, SessionSummary,
};

/// Prepare the sample pool, run one emitter session, then save a generated
/// pool if asked to.
pub fn run_emitter(config: &GazeConfig) -> Result<SessionSummary> {
    let settings =
        EmitterSettings::from_config(&config.emitter).context("Invalid emitter settings")?;

    let (pool, origin) = resolve_pool(&config.samples).context("Failed to prepare sample pool")?;
    if origin == PoolOrigin::Generated {
        info!("Generated {} mock samples", pool.len());
    }

    let endpoint = Endpoint::for_emitter(&config.emitter);
    let emitter = SessionEmitter::new(settings, pool, MonotonicClock::new())
        .context("Invalid pacing settings")?;
    let summary = emitter
        .run_session(&endpoint)
        .with_context(|| format!("Session on {} failed", endpoint.address))?;

    if origin == PoolOrigin::Generated && config.samples.save_generated {
        let path = &config.samples.save_path;
        emitter
            .pool()
            .save_json(path)
            .with_context(|| format!("Failed to save mock samples to {}", path.display()))?;
    }

    Ok(summary)
}

/// Receive one session and return its report.
pub fn run_receiver(config: &GazeConfig) -> Result<ReceiveReport> {
    let endpoint = Endpoint::for_receiver(&config.receiver);
    let receiver = SessionReceiver::new(
        ReceiverSettings::from_config(&config.receiver),
        MonotonicClock::new(),
    );
    receiver
        .receive_session(&endpoint)
        .with_context(|| format!("Receiving from {} failed", endpoint.address))
}
