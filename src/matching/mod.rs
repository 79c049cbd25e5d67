//! Record-to-rule matching.
//!
//! [`match_record`] is the whole decision for one record: filter the rules
//! whose range and spend conditions hold, then keep the heaviest. Equal
//! weights resolve to the lower rule index, so the result depends only on
//! the record and the rule order.
//!
//! The function is pure and allocation-free; any number of threads may call
//! it against the same [`RuleSet`](crate::ruleset::RuleSet).

mod engine;
mod types;

pub use engine::{candidates, match_record};
pub use types::{Record, RecordId};
