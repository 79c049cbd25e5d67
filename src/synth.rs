//! Synthetic rule sets and player populations.
//!
//! The demonstration rule set tiles level, recency, and loss windows so
//! that most players match several overlapping rules with different
//! weights. Player populations are drawn from a seeded RNG, so every run
//! with the same seed produces the same records.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::catalog::OfferLabel;
use crate::error::ConfigError;
use crate::matching::Record;
use crate::ruleset::{build_ruleset, RuleDocument, RuleSet};

/// Size of the demonstration rule set.
pub const DEMO_RULE_COUNT: usize = 150;

/// End of the always-open validity window used by demo rules.
pub const DEMO_END_TIME: i64 = 9_999_999_999;

/// Returns `n` demonstration rule documents.
///
/// Rule `i` covers levels `(i % 10) + 1 ..= (i % 10) + 11`, a five-day
/// recency window starting at `(i % 5) * 2`, a three-loss window starting
/// at `i % 3`, and weighs `1.0 + (i % 10) * 0.1`. The spend condition
/// cycles through spent, not spent, and any.
pub fn demo_rule_documents(n: usize) -> Vec<RuleDocument> {
    (0..n)
        .map(|i| {
            let min_level = (i % 10) as i32 + 1;
            let min_days = (i % 5) as i32 * 2;
            let min_matches = (i % 3) as i32;
            RuleDocument {
                min_level,
                max_level: min_level + 10,
                min_days_since_last_purchase: min_days,
                max_days_since_last_purchase: min_days + 5,
                min_matches_lost: min_matches,
                max_matches_lost: min_matches + 3,
                has_spent_money: match i % 3 {
                    0 => 1,
                    1 => 0,
                    _ => -1,
                },
                offer: Some(OfferLabel::ROTATION[i % 4].as_str().to_string()),
                weight: 1.0 + (i % 10) as f64 * 0.1,
                start_time: 0,
                end_time: DEMO_END_TIME,
            }
        })
        .collect()
}

/// Builds the demonstration rule set of `n` rules.
pub fn demo_ruleset(n: usize) -> Result<RuleSet, ConfigError> {
    build_ruleset(demo_rule_documents(n))
}

/// Draws `n` player records with ids `1..=n`.
///
/// Levels are uniform in `1..=50`, days since last purchase in `0..=30`,
/// matches lost in `0..=10`, and spending is a fair coin.
pub fn random_records(n: usize, seed: u64) -> Vec<Record> {
    let mut rng = StdRng::seed_from_u64(seed);
    (0..n)
        .map(|i| Record {
            id: i as u64 + 1,
            level: rng.random_range(1..=50),
            days_since_last_purchase: rng.random_range(0..=30),
            matches_lost: rng.random_range(0..=10),
            has_spent_money: rng.random_bool(0.5),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ruleset::SpendCondition;

    #[test]
    fn test_demo_rule_shape() {
        let ruleset = demo_ruleset(DEMO_RULE_COUNT).unwrap();
        assert_eq!(ruleset.len(), 150);

        let r = ruleset.get(13).unwrap();
        assert_eq!((r.min_level, r.max_level), (4, 14));
        assert_eq!(
            (r.min_days_since_last_purchase, r.max_days_since_last_purchase),
            (6, 11)
        );
        assert_eq!((r.min_matches_lost, r.max_matches_lost), (1, 4));
        assert_eq!(r.spend_condition, SpendCondition::RequireNotSpent);
        assert!((r.weight - 1.3).abs() < 1e-10);
        assert_eq!(r.configured_offer, Some(OfferLabel::FirstPurchaseBonus));
    }

    #[test]
    fn test_random_records_reproducible() {
        let a = random_records(500, 42);
        let b = random_records(500, 42);
        assert_eq!(a, b);
        assert_ne!(a, random_records(500, 43));
    }

    #[test]
    fn test_random_records_ranges() {
        let records = random_records(2_000, 7);
        assert_eq!(records.first().map(|r| r.id), Some(1));
        assert_eq!(records.last().map(|r| r.id), Some(2_000));
        for r in &records {
            assert!((1..=50).contains(&r.level));
            assert!((0..=30).contains(&r.days_since_last_purchase));
            assert!((0..=10).contains(&r.matches_lost));
        }
        assert!(records.iter().any(|r| r.has_spent_money));
        assert!(records.iter().any(|r| !r.has_spent_money));
    }
}
