//! Weighted eligibility-rule matching for promotional offers.
//!
//! Assigns one offer to each player record by matching it against an
//! ordered set of range-and-spend rules and keeping the heaviest match:
//!
//! - **RuleSet** ([`ruleset`]): immutable, ordered rules built once from
//!   rule documents.
//! - **Matcher** ([`matching`]): pure best-rule selection for one record,
//!   with first-seen tie-breaking.
//! - **OfferCatalog** ([`catalog`]): maps the winning rule index to an
//!   offer label, or the default offer when nothing matches.
//! - **BatchEvaluator** ([`batch`]): runs the Matcher over millions of
//!   records, sequentially or on a rayon pool, with order-preserving
//!   output.
//! - **MetricsRecorder** ([`metrics`]): timing and offer distribution of
//!   batch runs.
//!
//! With the `io` feature, [`io`] reads the JSON rule configuration and the
//! player CSV and writes the decision CSV. [`synth`] generates the
//! demonstration rule set and seeded player populations.
//!
//! # Example
//!
//! ```
//! use offer_engine::{build_ruleset, evaluate, Record, RuleDocument, Strategy};
//! use offer_engine::catalog::OfferLabel;
//!
//! let rules = build_ruleset(vec![RuleDocument {
//!     min_level: 1,
//!     max_level: 10,
//!     max_days_since_last_purchase: 5,
//!     max_matches_lost: 3,
//!     has_spent_money: -1,
//!     weight: 1.0,
//!     ..RuleDocument::default()
//! }])?;
//!
//! let results = evaluate(&[Record::new(7, 5, 2, 1, true)], &rules, Strategy::Sequential)?;
//! assert_eq!(results[0].record_id, 7);
//! assert_eq!(results[0].offer, OfferLabel::Discount);
//! # Ok::<(), offer_engine::ConfigError>(())
//! ```

pub mod batch;
pub mod catalog;
pub mod error;
#[cfg(feature = "io")]
pub mod io;
pub mod matching;
pub mod metrics;
pub mod ruleset;
pub mod synth;

pub use batch::{evaluate, BatchConfig, BatchEvaluator, MatchResult, Strategy};
pub use catalog::{LabelPolicy, OfferCatalog, OfferLabel};
pub use error::{ConfigError, InputError};
pub use matching::{match_record, Record, RecordId};
pub use ruleset::{build_ruleset, Rule, RuleDocument, RuleIndex, RuleSet, SpendCondition};

#[cfg(feature = "io")]
pub use error::Error;
