//! Batch evaluation over a record set.
//!
//! [`BatchEvaluator`] runs the Matcher over every record and resolves the
//! winning rule to an offer. Each record's result is written to the output
//! slot at the record's own position, so the output order is the input
//! order under every strategy.

use tracing::debug;

#[cfg(feature = "parallel")]
use rayon::prelude::*;

use super::config::{BatchConfig, Strategy};
use super::types::MatchResult;
use crate::catalog::OfferCatalog;
use crate::error::ConfigError;
use crate::matching::{match_record, Record};
use crate::ruleset::{RuleIndex, RuleSet};

/// Evaluates record batches against a [`RuleSet`].
///
/// The evaluator owns its worker pool (when a fixed size is configured)
/// and reuses it across runs. It holds no per-run state: evaluating the
/// same input twice yields the same output.
///
/// # Usage
///
/// ```
/// use offer_engine::batch::{BatchConfig, BatchEvaluator};
/// use offer_engine::catalog::OfferLabel;
/// use offer_engine::matching::Record;
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
/// let records = vec![Record::new(1, 5, 2, 1, true), Record::new(2, 99, 2, 1, true)];
///
/// let evaluator = BatchEvaluator::new(BatchConfig::sequential()).unwrap();
/// let results = evaluator.evaluate(&records, &rules);
/// assert_eq!(results[0].offer, OfferLabel::Discount);
/// assert_eq!(results[1].offer, OfferLabel::Default);
/// ```
#[derive(Debug)]
pub struct BatchEvaluator {
    config: BatchConfig,
    catalog: OfferCatalog,
    #[cfg(feature = "parallel")]
    pool: Option<rayon::ThreadPool>,
}

impl BatchEvaluator {
    /// Validates `config` and builds the worker pool it asks for.
    pub fn new(config: BatchConfig) -> Result<Self, ConfigError> {
        config.validate()?;

        #[cfg(feature = "parallel")]
        let pool = match (config.strategy, config.workers) {
            (Strategy::Parallel, Some(workers)) => Some(
                rayon::ThreadPoolBuilder::new()
                    .num_threads(workers)
                    .thread_name(|i| format!("offer-worker-{i}"))
                    .build()
                    .map_err(|err| ConfigError::ThreadPool(err.to_string()))?,
            ),
            _ => None,
        };

        Ok(Self {
            config,
            catalog: OfferCatalog::default(),
            #[cfg(feature = "parallel")]
            pool,
        })
    }

    /// A sequential evaluator. Never fails.
    pub fn sequential() -> Self {
        Self {
            config: BatchConfig::sequential(),
            catalog: OfferCatalog::default(),
            #[cfg(feature = "parallel")]
            pool: None,
        }
    }

    /// Replaces the offer catalog.
    pub fn with_catalog(mut self, catalog: OfferCatalog) -> Self {
        self.catalog = catalog;
        self
    }

    pub fn config(&self) -> &BatchConfig {
        &self.config
    }

    pub fn catalog(&self) -> &OfferCatalog {
        &self.catalog
    }

    /// Number of threads a run of this evaluator uses.
    pub fn workers(&self) -> usize {
        match self.config.strategy {
            Strategy::Sequential => 1,
            Strategy::Parallel => self.pool_size(),
        }
    }

    /// Decides the offer for every record, in input order.
    pub fn evaluate(&self, records: &[Record], ruleset: &RuleSet) -> Vec<MatchResult> {
        debug!(
            records = records.len(),
            rules = ruleset.len(),
            strategy = %self.config.strategy,
            "evaluating batch"
        );
        let catalog = &self.catalog;
        let mut results = vec![MatchResult::default(); records.len()];
        self.fill(records, &mut results, |record| {
            MatchResult::new(record.id, catalog.label_for(match_record(record, ruleset)))
        });
        results
    }

    /// Returns the winning rule index for every record, in input order.
    pub fn winners(&self, records: &[Record], ruleset: &RuleSet) -> Vec<Option<RuleIndex>> {
        let mut winners = vec![None; records.len()];
        self.fill(records, &mut winners, |record| match_record(record, ruleset));
        winners
    }

    /// Writes `f(records[i])` into `out[i]` for every `i`.
    fn fill<T, F>(&self, records: &[Record], out: &mut [T], f: F)
    where
        T: Send,
        F: Fn(&Record) -> T + Sync,
    {
        debug_assert_eq!(records.len(), out.len());
        match self.config.strategy {
            Strategy::Sequential => fill_slots(records, out, &f),
            Strategy::Parallel => self.fill_parallel(records, out, &f),
        }
    }

    #[cfg(feature = "parallel")]
    fn fill_parallel<T, F>(&self, records: &[Record], out: &mut [T], f: &F)
    where
        T: Send,
        F: Fn(&Record) -> T + Sync,
    {
        let workers = self.pool_size();
        let chunk_size = self.config.resolve_chunk_size(records.len(), workers);
        debug!(workers, chunk_size, "partitioned batch");

        match &self.pool {
            Some(pool) => pool.install(|| fill_chunks(records, out, chunk_size, f)),
            None => fill_chunks(records, out, chunk_size, f),
        }
    }

    #[cfg(not(feature = "parallel"))]
    fn fill_parallel<T, F>(&self, records: &[Record], out: &mut [T], f: &F)
    where
        F: Fn(&Record) -> T,
    {
        // `BatchConfig::validate` rejects this strategy without the feature.
        fill_slots(records, out, f);
    }

    #[cfg(feature = "parallel")]
    fn pool_size(&self) -> usize {
        self.pool
            .as_ref()
            .map_or_else(rayon::current_num_threads, |pool| pool.current_num_threads())
    }

    #[cfg(not(feature = "parallel"))]
    fn pool_size(&self) -> usize {
        1
    }
}

impl Default for BatchEvaluator {
    fn default() -> Self {
        Self::sequential()
    }
}

/// Evaluates `records` with `strategy` and the default catalog.
pub fn evaluate(
    records: &[Record],
    ruleset: &RuleSet,
    strategy: Strategy,
) -> Result<Vec<MatchResult>, ConfigError> {
    let evaluator = BatchEvaluator::new(BatchConfig::default().with_strategy(strategy))?;
    Ok(evaluator.evaluate(records, ruleset))
}

fn fill_slots<T, F>(records: &[Record], out: &mut [T], f: &F)
where
    F: Fn(&Record) -> T,
{
    for (slot, record) in out.iter_mut().zip(records) {
        *slot = f(record);
    }
}

/// Pairs each input chunk with the output chunk at the same offset.
#[cfg(feature = "parallel")]
fn fill_chunks<T, F>(records: &[Record], out: &mut [T], chunk_size: usize, f: &F)
where
    T: Send,
    F: Fn(&Record) -> T + Sync,
{
    out.par_chunks_mut(chunk_size)
        .zip(records.par_chunks(chunk_size))
        .for_each(|(slots, chunk)| fill_slots(chunk, slots, f));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{OfferCatalog, OfferLabel};
    use crate::ruleset::{build_ruleset, RuleDocument};
    use crate::synth::{demo_ruleset, random_records, DEMO_RULE_COUNT};

    fn scenario_rules() -> RuleSet {
        build_ruleset(vec![RuleDocument {
            min_level: 1,
            max_level: 10,
            min_days_since_last_purchase: 0,
            max_days_since_last_purchase: 5,
            min_matches_lost: 0,
            max_matches_lost: 3,
            has_spent_money: -1,
            weight: 1.0,
            ..RuleDocument::default()
        }])
        .unwrap()
    }

    #[test]
    fn test_one_result_per_record_in_order() {
        let rules = demo_ruleset(DEMO_RULE_COUNT).unwrap();
        let records = random_records(5_000, 1);
        let results = BatchEvaluator::sequential().evaluate(&records, &rules);

        assert_eq!(results.len(), records.len());
        for (record, result) in records.iter().zip(&results) {
            assert_eq!(record.id, result.record_id);
        }
    }

    #[test]
    fn test_default_offer_when_nothing_matches() {
        let rules = scenario_rules();
        let records = vec![
            Record::new(10, 99, 2, 1, true),
            Record::new(11, 5, 2, 1, false),
            Record::new(12, 0, 0, 0, false),
        ];
        let results = BatchEvaluator::sequential().evaluate(&records, &rules);
        let offers: Vec<OfferLabel> = results.iter().map(|r| r.offer).collect();
        assert_eq!(
            offers,
            vec![OfferLabel::Default, OfferLabel::Discount, OfferLabel::Default]
        );
    }

    #[test]
    fn test_empty_batch() {
        let rules = scenario_rules();
        assert!(BatchEvaluator::sequential().evaluate(&[], &rules).is_empty());
    }

    #[test]
    fn test_winners_agree_with_offers() {
        let rules = demo_ruleset(DEMO_RULE_COUNT).unwrap();
        let records = random_records(2_000, 3);
        let evaluator = BatchEvaluator::sequential();
        let catalog = OfferCatalog::default();

        let winners = evaluator.winners(&records, &rules);
        let results = evaluator.evaluate(&records, &rules);
        for (winner, result) in winners.iter().zip(&results) {
            assert_eq!(catalog.label_for(*winner), result.offer);
        }
    }

    #[test]
    fn test_configured_catalog_under_demo_rules_matches_rotation() {
        // Demo rules name the same offer the rotation would pick.
        let rules = demo_ruleset(DEMO_RULE_COUNT).unwrap();
        let records = random_records(2_000, 5);
        let modulo = BatchEvaluator::sequential().evaluate(&records, &rules);
        let configured = BatchEvaluator::sequential()
            .with_catalog(OfferCatalog::configured(&rules))
            .evaluate(&records, &rules);
        assert_eq!(modulo, configured);
    }

    #[test]
    fn test_idempotent() {
        let rules = demo_ruleset(DEMO_RULE_COUNT).unwrap();
        let records = random_records(3_000, 9);
        let evaluator = BatchEvaluator::sequential();
        assert_eq!(
            evaluator.evaluate(&records, &rules),
            evaluator.evaluate(&records, &rules)
        );
    }

    #[test]
    fn test_crate_level_evaluate() {
        let rules = scenario_rules();
        let results = evaluate(&[Record::new(1, 5, 2, 1, true)], &rules, Strategy::Sequential)
            .unwrap();
        assert_eq!(results, vec![MatchResult::new(1, OfferLabel::Discount)]);
    }

    #[test]
    fn test_invalid_config_rejected_before_evaluation() {
        assert!(matches!(
            BatchEvaluator::new(BatchConfig::sequential().with_workers(0)),
            Err(ConfigError::ZeroWorkers)
        ));
    }

    #[cfg(feature = "parallel")]
    mod parallel {
        use super::*;
        use proptest::prelude::{any, prop_assert_eq, proptest, ProptestConfig};
        use proptest::strategy::Strategy as PropStrategy;

        #[test]
        fn test_parallel_matches_sequential() {
            let rules = demo_ruleset(DEMO_RULE_COUNT).unwrap();
            let records = random_records(100_000, 42);

            let sequential = BatchEvaluator::sequential().evaluate(&records, &rules);
            let parallel = BatchEvaluator::new(BatchConfig::parallel().with_workers(8))
                .unwrap()
                .evaluate(&records, &rules);
            assert_eq!(sequential, parallel);
        }

        #[test]
        fn test_uneven_chunks_preserve_order() {
            let rules = demo_ruleset(DEMO_RULE_COUNT).unwrap();
            let records = random_records(10_007, 11);
            let sequential = BatchEvaluator::sequential().evaluate(&records, &rules);

            for chunk in [1, 3, 1000, 10_007, 50_000] {
                let evaluator =
                    BatchEvaluator::new(BatchConfig::parallel().with_workers(3).with_chunk_size(chunk))
                        .unwrap();
                assert_eq!(evaluator.evaluate(&records, &rules), sequential, "chunk {chunk}");
            }
        }

        #[test]
        fn test_fixed_pool_size() {
            let evaluator = BatchEvaluator::new(BatchConfig::parallel().with_workers(2)).unwrap();
            assert_eq!(evaluator.workers(), 2);
            assert_eq!(BatchEvaluator::sequential().workers(), 1);
        }

        #[test]
        fn test_global_pool_runs() {
            let rules = scenario_rules();
            let records = vec![Record::new(1, 5, 2, 1, true); 3];
            let results = evaluate(&records, &rules, Strategy::Parallel).unwrap();
            assert!(results.iter().all(|r| r.offer == OfferLabel::Discount));
        }

        fn arb_rule() -> impl PropStrategy<Value = RuleDocument> {
            (0i32..20, 0i32..10, 0i32..15, 0i32..8, 0i32..5, 0i32..4, -1i64..=1, 0u8..5)
                .prop_map(|(lvl, lvl_span, days, days_span, lost, lost_span, spent, w)| {
                    RuleDocument {
                        min_level: lvl,
                        max_level: lvl + lvl_span,
                        min_days_since_last_purchase: days,
                        max_days_since_last_purchase: days + days_span,
                        min_matches_lost: lost,
                        max_matches_lost: lost + lost_span,
                        has_spent_money: spent,
                        weight: f64::from(w) * 0.5,
                        ..RuleDocument::default()
                    }
                })
        }

        fn arb_record() -> impl PropStrategy<Value = Record> {
            (any::<u64>(), 0i32..30, 0i32..25, 0i32..10, any::<bool>())
                .prop_map(|(id, level, days, lost, spent)| Record::new(id, level, days, lost, spent))
        }

        proptest! {
            #![proptest_config(ProptestConfig::with_cases(64))]

            #[test]
            fn prop_strategies_agree(
                docs in proptest::collection::vec(arb_rule(), 0..40),
                records in proptest::collection::vec(arb_record(), 0..400),
                chunk in 1usize..64,
            ) {
                let rules = build_ruleset(docs).unwrap();
                let sequential = BatchEvaluator::sequential().evaluate(&records, &rules);
                let parallel = BatchEvaluator::new(
                    BatchConfig::parallel().with_workers(4).with_chunk_size(chunk),
                )
                .unwrap()
                .evaluate(&records, &rules);
                prop_assert_eq!(sequential, parallel);
            }
        }
    }
}
