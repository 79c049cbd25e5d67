//! Best-rule selection for a single record.

use super::types::Record;
use crate::ruleset::{Rule, RuleIndex, RuleSet};

/// Returns the index of the winning rule for `record`, or `None` when no
/// rule is a candidate.
///
/// Rules are scanned in index order. The winner is the candidate with the
/// greatest weight; on equal weight the earlier rule is kept.
///
/// # Examples
///
/// ```
/// use offer_engine::matching::{match_record, Record};
/// use offer_engine::ruleset::{build_ruleset, RuleDocument};
///
/// let rules = build_ruleset(vec![RuleDocument {
///     min_level: 1,
///     max_level: 10,
///     max_days_since_last_purchase: 5,
///     max_matches_lost: 3,
///     has_spent_money: -1,
///     weight: 1.0,
///     ..RuleDocument::default()
/// }])
/// .unwrap();
///
/// assert_eq!(match_record(&Record::new(1, 5, 2, 1, true), &rules), Some(0));
/// assert_eq!(match_record(&Record::new(2, 99, 2, 1, true), &rules), None);
/// ```
#[inline]
pub fn match_record(record: &Record, ruleset: &RuleSet) -> Option<RuleIndex> {
    select_best(record, ruleset.rules())
}

/// Scans `rules` and keeps the strictly heaviest candidate.
#[inline]
fn select_best(record: &Record, rules: &[Rule]) -> Option<RuleIndex> {
    let mut best: Option<(RuleIndex, f64)> = None;

    for rule in rules {
        if !rule.is_candidate(record) {
            continue;
        }
        let heavier = match best {
            Some((_, weight)) => rule.weight > weight,
            None => true,
        };
        if heavier {
            best = Some((rule.index, rule.weight));
        }
    }

    best.map(|(index, _)| index)
}

/// Returns every candidate rule for `record` in index order.
///
/// Allocates; meant for inspection and tests, not the batch path.
pub fn candidates(record: &Record, ruleset: &RuleSet) -> Vec<RuleIndex> {
    ruleset
        .iter()
        .filter(|rule| rule.is_candidate(record))
        .map(|rule| rule.index)
        .collect()
}
