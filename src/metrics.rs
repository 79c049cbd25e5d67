//! Timing and distribution summaries for batch runs.
//!
//! [`MetricsRecorder`] wraps evaluator calls and keeps one
//! [`EvaluationMetrics`] per run so that strategies can be compared.
//! Nothing here affects evaluation results.

use std::collections::BTreeMap;
use std::time::Instant;

use tracing::info;

use crate::batch::{BatchEvaluator, MatchResult, Strategy};
use crate::catalog::OfferLabel;
use crate::matching::Record;
use crate::ruleset::RuleSet;

/// Measurements of one batch run.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct EvaluationMetrics {
    pub strategy: Strategy,
    pub num_players: usize,
    pub num_rules: usize,
    pub duration_seconds: f64,
}

impl EvaluationMetrics {
    /// Records evaluated per second, or `None` for an instantaneous run.
    pub fn throughput(&self) -> Option<f64> {
        (self.duration_seconds > 0.0).then(|| self.num_players as f64 / self.duration_seconds)
    }
}

/// Collects [`EvaluationMetrics`] across runs.
///
/// # Usage
///
/// ```
/// use offer_engine::batch::BatchEvaluator;
/// use offer_engine::metrics::MetricsRecorder;
/// use offer_engine::synth::{demo_ruleset, random_records};
///
/// let rules = demo_ruleset(150).unwrap();
/// let records = random_records(1_000, 42);
///
/// let mut recorder = MetricsRecorder::new();
/// let results = recorder.evaluate(&BatchEvaluator::sequential(), &records, &rules);
/// assert_eq!(results.len(), 1_000);
/// assert_eq!(recorder.runs()[0].num_rules, 150);
/// ```
#[derive(Debug, Clone, Default)]
pub struct MetricsRecorder {
    runs: Vec<EvaluationMetrics>,
}

impl MetricsRecorder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Runs `evaluator` and records how long it took.
    pub fn evaluate(
        &mut self,
        evaluator: &BatchEvaluator,
        records: &[Record],
        ruleset: &RuleSet,
    ) -> Vec<MatchResult> {
        let start = Instant::now();
        let results = evaluator.evaluate(records, ruleset);
        let duration_seconds = start.elapsed().as_secs_f64();

        let metrics = EvaluationMetrics {
            strategy: evaluator.config().strategy,
            num_players: records.len(),
            num_rules: ruleset.len(),
            duration_seconds,
        };
        info!(
            strategy = %metrics.strategy,
            players = metrics.num_players,
            rules = metrics.num_rules,
            duration_seconds,
            "batch evaluated"
        );
        self.runs.push(metrics);
        results
    }

    /// All recorded runs, oldest first.
    pub fn runs(&self) -> &[EvaluationMetrics] {
        &self.runs
    }

    /// The most recent run with `strategy`.
    pub fn latest(&self, strategy: Strategy) -> Option<&EvaluationMetrics> {
        self.runs.iter().rev().find(|m| m.strategy == strategy)
    }

    /// How many times faster the latest `candidate` run was than the latest
    /// `baseline` run.
    ///
    /// Returns `None` if either strategy has not been recorded or the
    /// candidate took no measurable time.
    pub fn speedup(&self, baseline: Strategy, candidate: Strategy) -> Option<f64> {
        let base = self.latest(baseline)?;
        let cand = self.latest(candidate)?;
        (cand.duration_seconds > 0.0).then(|| base.duration_seconds / cand.duration_seconds)
    }

    /// Consumes the recorder, returning its runs.
    pub fn into_runs(self) -> Vec<EvaluationMetrics> {
        self.runs
    }
}

/// Number of records assigned each offer.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OfferDistribution {
    counts: BTreeMap<OfferLabel, usize>,
}

impl OfferDistribution {
    /// Counts the offers in `results`.
    pub fn from_results(results: &[MatchResult]) -> Self {
        let mut counts = BTreeMap::new();
        for result in results {
            *counts.entry(result.offer).or_insert(0) += 1;
        }
        Self { counts }
    }

    pub fn count(&self, label: OfferLabel) -> usize {
        self.counts.get(&label).copied().unwrap_or(0)
    }

    pub fn total(&self) -> usize {
        self.counts.values().sum()
    }

    /// Labels with their counts, most frequent first; ties by label order.
    pub fn ranked(&self) -> Vec<(OfferLabel, usize)> {
        let mut ranked: Vec<_> = self.counts.iter().map(|(&l, &c)| (l, c)).collect();
        ranked.sort_by(|a, b| b.1.cmp(&a.1).then(a.0.cmp(&b.0)));
        ranked
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::synth::{demo_ruleset, random_records, DEMO_RULE_COUNT};

    fn metrics(strategy: Strategy, secs: f64) -> EvaluationMetrics {
        EvaluationMetrics {
            strategy,
            num_players: 1_000,
            num_rules: 10,
            duration_seconds: secs,
        }
    }

    #[test]
    fn test_recorder_tracks_runs() {
        let rules = demo_ruleset(DEMO_RULE_COUNT).unwrap();
        let records = random_records(500, 1);
        let evaluator = BatchEvaluator::sequential();

        let mut recorder = MetricsRecorder::new();
        let first = recorder.evaluate(&evaluator, &records, &rules);
        let second = recorder.evaluate(&evaluator, &records, &rules);

        assert_eq!(first, second);
        assert_eq!(recorder.runs().len(), 2);
        let run = recorder.latest(Strategy::Sequential).unwrap();
        assert_eq!(run.num_players, 500);
        assert_eq!(run.num_rules, DEMO_RULE_COUNT);
        assert!(run.duration_seconds >= 0.0);
        assert!(recorder.latest(Strategy::Parallel).is_none());
    }

    #[test]
    fn test_speedup() {
        let recorder = MetricsRecorder {
            runs: vec![
                metrics(Strategy::Sequential, 4.0),
                metrics(Strategy::Parallel, 1.0),
            ],
        };
        let speedup = recorder
            .speedup(Strategy::Sequential, Strategy::Parallel)
            .unwrap();
        assert!((speedup - 4.0).abs() < 1e-10);
        assert!(MetricsRecorder::new()
            .speedup(Strategy::Sequential, Strategy::Parallel)
            .is_none());
    }

    #[test]
    fn test_throughput() {
        assert_eq!(metrics(Strategy::Sequential, 0.5).throughput(), Some(2_000.0));
        assert_eq!(metrics(Strategy::Sequential, 0.0).throughput(), None);
    }

    #[test]
    fn test_distribution() {
        let results = vec![
            MatchResult::new(1, OfferLabel::Discount),
            MatchResult::new(2, OfferLabel::Default),
            MatchResult::new(3, OfferLabel::Default),
            MatchResult::new(4, OfferLabel::SpecialReward),
        ];
        let dist = OfferDistribution::from_results(&results);
        assert_eq!(dist.total(), 4);
        assert_eq!(dist.count(OfferLabel::Default), 2);
        assert_eq!(dist.count(OfferLabel::RegularOffer), 0);
        assert_eq!(
            dist.ranked(),
            vec![
                (OfferLabel::Default, 2),
                (OfferLabel::Discount, 1),
                (OfferLabel::SpecialReward, 1),
            ]
        );
    }
}
