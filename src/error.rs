//! Error types.
//!
//! Every error in this crate is raised before a batch starts: while a
//! [`RuleSet`](crate::ruleset::RuleSet) is built, while a
//! [`BatchConfig`](crate::batch::BatchConfig) is validated, or while the
//! boundary layer reads input. Matching and batch evaluation are total.

use thiserror::Error;

/// Faults in rule documents or batch configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("rule {index}: has_spent_money must be -1, 0 or 1, got {value}")]
    InvalidSpendCondition { index: usize, value: i64 },
    #[error("rule {index}: {field} lower bound {min} exceeds upper bound {max}")]
    InvertedBounds {
        index: usize,
        field: &'static str,
        min: i32,
        max: i32,
    },
    #[error("rule {index}: weight must be finite, got {weight}")]
    NonFiniteWeight { index: usize, weight: f64 },
    #[error("rule {index}: unknown offer label {label:?}")]
    UnknownOffer { index: usize, label: String },
    #[error("workers must be at least 1")]
    ZeroWorkers,
    #[error("chunk_size must be at least 1")]
    ZeroChunkSize,
    #[error("parallel strategy requested but the `parallel` feature is disabled")]
    ParallelUnavailable,
    #[error("failed to build worker pool: {0}")]
    ThreadPool(String),
}

/// Faults in player records, detected before they reach the evaluator.
#[derive(Debug, Error)]
pub enum InputError {
    #[error("record {index}: has_spent_money must be 0 or 1, got {value}")]
    InvalidSpendFlag { index: usize, value: i64 },
    #[error("record {index}: {message}")]
    Malformed { index: usize, message: String },
}

/// Errors raised by the file boundary layer.
#[cfg(feature = "io")]
#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Input(#[from] InputError),
    #[error("failed to access {path}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse rules from {path}")]
    Json {
        path: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("failed to write csv to {path}")]
    Csv {
        path: String,
        #[source]
        source: csv::Error,
    },
}

#[cfg(feature = "io")]
impl Error {
    pub(crate) fn from_io(path: impl AsRef<std::path::Path>, source: std::io::Error) -> Self {
        Error::Io {
            path: path.as_ref().display().to_string(),
            source,
        }
    }

    pub(crate) fn from_csv(path: impl AsRef<std::path::Path>, source: csv::Error) -> Self {
        Error::Csv {
            path: path.as_ref().display().to_string(),
            source,
        }
    }
}
