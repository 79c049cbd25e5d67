//! Batch evaluation.
//!
//! Drives the Matcher over a full record set and produces one
//! [`MatchResult`] per record, in input order.
//!
//! - **Sequential**: a single in-order pass.
//! - **Parallel**: the record slice is split into contiguous chunks that a
//!   rayon pool processes independently. Each chunk writes into the output
//!   slice at the same offset, so assembly follows record position rather
//!   than completion order and no locking is needed.
//!
//! Both strategies produce identical output for the same input.
//!
//! # Key Types
//!
//! - [`BatchConfig`]: strategy, pool size, chunk size
//! - [`BatchEvaluator`]: validated evaluator owning its worker pool
//! - [`MatchResult`]: `(record_id, offer)` output value

mod config;
mod runner;
mod types;

pub use config::{BatchConfig, Strategy, CHUNKS_PER_WORKER, MIN_AUTO_CHUNK};
pub use runner::{evaluate, BatchEvaluator};
pub use types::MatchResult;
