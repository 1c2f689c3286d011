// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Gaze sample pool
//!
//! The emitter cycles through a fixed, non-empty pool of `(x, y)` samples.
//! Pools come from a JSON file (`[{"x": 1, "y": 2}, ...]`) or are generated
//! with uniformly random integer coordinates.

use std::fs;
use std::ops::Range;
use std::path::Path;

use gaze_config::SamplesConfig;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, info};

use crate::error::{Result, StreamError};

/// One gaze coordinate pair
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Sample {
    pub x: f64,
    pub y: f64,
}

impl Sample {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Fixed, ordered, never-empty set of samples consumed cyclically.
#[derive(Debug, Clone, PartialEq)]
pub struct SamplePool {
    samples: Vec<Sample>,
}

impl SamplePool {
    /// # Errors
    ///
    /// `StreamError::MalformedInput` when `samples` is empty
    pub fn new(samples: Vec<Sample>) -> Result<Self> {
        if samples.is_empty() {
            return Err(StreamError::MalformedInput(
                "sample pool must hold at least one sample".to_string(),
            ));
        }
        Ok(Self { samples })
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    /// Never true; pools are non-empty by construction.
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Sample used on tick `index`: pool element `index mod len`.
    pub fn get(&self, index: usize) -> Sample {
        self.samples[index % self.samples.len()]
    }

    pub fn as_slice(&self) -> &[Sample] {
        &self.samples
    }

    /// Endless iterator walking the pool in order and wrapping to the start.
    pub fn cycle(&self) -> CyclicSamples<'_> {
        CyclicSamples {
            pool: self,
            next_index: 0,
        }
    }

    /// Parse a pool from JSON text.
    ///
    /// Every element must be an object with numeric `x` and `y`; extra fields are ignored.
    pub fn from_json_str(text: &str) -> Result<Self> {
        let value: Value = serde_json::from_str(text)
            .map_err(|e| StreamError::MalformedInput(format!("invalid JSON: {}", e)))?;

        let entries = value.as_array().ok_or_else(|| {
            StreamError::MalformedInput("sample data must be a JSON array of {x, y}".to_string())
        })?;
        if entries.is_empty() {
            return Err(StreamError::MalformedInput(
                "sample data must have a length of at least 1".to_string(),
            ));
        }

        let samples = entries
            .iter()
            .enumerate()
            .map(|(i, entry)| -> Result<Sample> {
                let coord = |name: &str| {
                    entry.get(name).and_then(Value::as_f64).ok_or_else(|| {
                        StreamError::MalformedInput(format!(
                            "element {} must be an object with numeric 'x' and 'y'",
                            i
                        ))
                    })
                };
                Ok(Sample::new(coord("x")?, coord("y")?))
            })
            .collect::<Result<Vec<_>>>()?;

        Self::new(samples)
    }

    /// Load a pool from a JSON file.
    pub fn load_json(path: &Path) -> Result<Self> {
        info!("Loading sample data from {}", path.display());
        let text = fs::read_to_string(path).map_err(|e| {
            StreamError::MalformedInput(format!("cannot read {}: {}", path.display(), e))
        })?;
        let pool = Self::from_json_str(&text)?;
        debug!(samples = pool.len(), "Sample pool loaded");
        Ok(pool)
    }

    /// Write the pool as a JSON array of `{x, y}` objects.
    pub fn save_json(&self, path: &Path) -> Result<()> {
        let text = serde_json::to_string(&self.samples)
            .map_err(|e| StreamError::MalformedInput(format!("cannot encode samples: {}", e)))?;
        fs::write(path, text).map_err(|e| {
            StreamError::MalformedInput(format!("cannot write {}: {}", path.display(), e))
        })?;
        info!("Saved {} samples to {}", self.len(), path.display());
        Ok(())
    }

    /// Generate a random pool.
    ///
    /// With a seed the result is reproducible; without one it is seeded from OS entropy.
    pub fn generate(spec: &MockSampleSpec) -> Result<Self> {
        if spec.x.is_empty() || spec.y.is_empty() {
            return Err(StreamError::MalformedInput(
                "mock coordinate ranges must not be empty".to_string(),
            ));
        }
        let mut rng = match spec.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        let samples = (0..spec.size)
            .map(|_| {
                Sample::new(
                    rng.gen_range(spec.x.clone()) as f64,
                    rng.gen_range(spec.y.clone()) as f64,
                )
            })
            .collect();
        let pool = Self::new(samples)?;
        debug!(samples = pool.len(), seed = ?spec.seed, "Generated mock sample pool");
        Ok(pool)
    }
}

/// Cyclic view over a [`SamplePool`]; see [`SamplePool::cycle`].
#[derive(Debug, Clone)]
pub struct CyclicSamples<'a> {
    pool: &'a SamplePool,
    next_index: usize,
}

impl Iterator for CyclicSamples<'_> {
    type Item = Sample;

    fn next(&mut self) -> Option<Sample> {
        let sample = self.pool.samples[self.next_index];
        self.next_index = (self.next_index + 1) % self.pool.samples.len();
        Some(sample)
    }
}

/// Parameters for a generated pool. Ranges are half-open integer ranges.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MockSampleSpec {
    pub size: usize,
    pub x: Range<i64>,
    pub y: Range<i64>,
    pub seed: Option<u64>,
}

impl Default for MockSampleSpec {
    fn default() -> Self {
        Self::from_config(&SamplesConfig::default())
    }
}

impl MockSampleSpec {
    pub fn from_config(config: &SamplesConfig) -> Self {
        Self {
            size: config.mock_size,
            x: config.x_min..config.x_max,
            y: config.y_min..config.y_max,
            seed: config.seed,
        }
    }
}

/// Where the emitter's pool came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PoolOrigin {
    File,
    Generated,
}

/// Resolve the pool described by `config`: load `data_file` if set, otherwise generate one.
///
/// Loading happens before any network activity so malformed input aborts early.
pub fn resolve_pool(config: &SamplesConfig) -> Result<(SamplePool, PoolOrigin)> {
    match &config.data_file {
        Some(path) => Ok((SamplePool::load_json(path)?, PoolOrigin::File)),
        None => Ok((
            SamplePool::generate(&MockSampleSpec::from_config(config))?,
            PoolOrigin::Generated,
        )),
    }
}
