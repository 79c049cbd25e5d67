//! Batch evaluation configuration.
//!
//! [`BatchConfig`] selects the execution strategy and the shape of the
//! parallel partitioning. The output of a run never depends on it.

use std::fmt;

use crate::error::ConfigError;

/// Smallest automatically derived chunk, in records.
pub const MIN_AUTO_CHUNK: usize = 1024;

/// Chunks per worker when the chunk size is derived.
pub const CHUNKS_PER_WORKER: usize = 4;

/// Execution strategy for a batch run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum Strategy {
    /// One thread, records in order.
    Sequential,

    /// Contiguous chunks on a worker pool, reassembled by position.
    Parallel,
}

impl Default for Strategy {
    fn default() -> Self {
        if cfg!(feature = "parallel") {
            Strategy::Parallel
        } else {
            Strategy::Sequential
        }
    }
}

impl Strategy {
    pub fn as_str(self) -> &'static str {
        match self {
            Strategy::Sequential => "sequential",
            Strategy::Parallel => "parallel",
        }
    }
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Configuration for a [`BatchEvaluator`](super::BatchEvaluator).
///
/// # Defaults
///
/// ```
/// use offer_engine::batch::{BatchConfig, Strategy};
///
/// let config = BatchConfig::default();
/// assert_eq!(config.workers, None);
/// assert_eq!(config.chunk_size, None);
/// # #[cfg(feature = "parallel")]
/// assert_eq!(config.strategy, Strategy::Parallel);
/// ```
///
/// # Builder Pattern
///
/// ```
/// use offer_engine::batch::BatchConfig;
///
/// let config = BatchConfig::parallel()
///     .with_workers(8)
///     .with_chunk_size(16_384);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct BatchConfig {
    /// How records are scheduled.
    pub strategy: Strategy,

    /// Size of the dedicated worker pool.
    ///
    /// `None` runs on rayon's global pool, one worker per core.
    /// Ignored by the sequential strategy.
    pub workers: Option<usize>,

    /// Records per parallel chunk.
    ///
    /// `None` derives `ceil(n / (workers * CHUNKS_PER_WORKER))`, floored at
    /// [`MIN_AUTO_CHUNK`].
    pub chunk_size: Option<usize>,
}

impl BatchConfig {
    /// Single-threaded, in-order evaluation.
    pub fn sequential() -> Self {
        Self {
            strategy: Strategy::Sequential,
            ..Self::default()
        }
    }

    /// Chunked evaluation on a worker pool.
    pub fn parallel() -> Self {
        Self {
            strategy: Strategy::Parallel,
            ..Self::default()
        }
    }

    /// Sets the strategy.
    pub fn with_strategy(mut self, strategy: Strategy) -> Self {
        self.strategy = strategy;
        self
    }

    /// Sets a fixed worker pool size.
    pub fn with_workers(mut self, workers: usize) -> Self {
        self.workers = Some(workers);
        self
    }

    /// Sets a fixed chunk size.
    pub fn with_chunk_size(mut self, chunk_size: usize) -> Self {
        self.chunk_size = Some(chunk_size);
        self
    }

    /// Validates the configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.workers == Some(0) {
            return Err(ConfigError::ZeroWorkers);
        }
        if self.chunk_size == Some(0) {
            return Err(ConfigError::ZeroChunkSize);
        }
        if self.strategy == Strategy::Parallel && !cfg!(feature = "parallel") {
            return Err(ConfigError::ParallelUnavailable);
        }
        Ok(())
    }

    /// Chunk size for a batch of `len` records spread over `workers`.
    pub fn resolve_chunk_size(&self, len: usize, workers: usize) -> usize {
        match self.chunk_size {
            Some(size) => size,
            None => len
                .div_ceil(workers.max(1) * CHUNKS_PER_WORKER)
                .max(MIN_AUTO_CHUNK),
        }
    }
}
