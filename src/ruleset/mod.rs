//! Eligibility rules.
//!
//! A [`RuleSet`] is an ordered, immutable collection of [`Rule`] values built
//! once from [`RuleDocument`]s and then shared read-only by every evaluator.
//! A rule's [`index`](Rule::index) is its position in the set; it drives both
//! the first-seen tie-break and the index-based offer rotation.

mod document;
mod types;

pub use document::{build_ruleset, RuleDocument, RulesConfig};
pub use types::{Rule, RuleIndex, RuleSet, SpendCondition, ValidityWindow};
