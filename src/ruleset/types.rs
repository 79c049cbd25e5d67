//! Rule values and the immutable rule collection.

use crate::catalog::OfferLabel;
use crate::matching::Record;

/// Position of a rule within its [`RuleSet`].
pub type RuleIndex = usize;

/// Spending requirement of a rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SpendCondition {
    /// Only records that have spent money.
    RequireSpent,
    /// Only records that have never spent money.
    RequireNotSpent,
    /// Spending is not considered.
    #[default]
    Any,
}

impl SpendCondition {
    /// Decodes the document encoding: `1`, `0`, or `-1`.
    pub fn from_code(code: i64) -> Option<Self> {
        match code {
            1 => Some(SpendCondition::RequireSpent),
            0 => Some(SpendCondition::RequireNotSpent),
            -1 => Some(SpendCondition::Any),
            _ => None,
        }
    }

    /// Returns the document encoding of this condition.
    pub fn code(self) -> i64 {
        match self {
            SpendCondition::RequireSpent => 1,
            SpendCondition::RequireNotSpent => 0,
            SpendCondition::Any => -1,
        }
    }

    #[inline]
    pub fn admits(self, has_spent_money: bool) -> bool {
        match self {
            SpendCondition::Any => true,
            SpendCondition::RequireSpent => has_spent_money,
            SpendCondition::RequireNotSpent => !has_spent_money,
        }
    }
}

/// Activation window in epoch seconds.
///
/// Carried with every rule but not consulted when matching.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ValidityWindow {
    pub start: i64,
    pub end: i64,
}

/// An eligibility predicate with a priority weight.
///
/// All bounds are inclusive.
#[derive(Debug, Clone, PartialEq)]
pub struct Rule {
    pub min_level: i32,
    pub max_level: i32,
    pub min_days_since_last_purchase: i32,
    pub max_days_since_last_purchase: i32,
    pub min_matches_lost: i32,
    pub max_matches_lost: i32,
    pub spend_condition: SpendCondition,
    /// Priority; the highest-weighted candidate wins.
    pub weight: f64,
    pub validity_window: ValidityWindow,
    /// Offer named in the rule document, used only by
    /// [`LabelPolicy::Configured`](crate::catalog::LabelPolicy::Configured).
    pub configured_offer: Option<OfferLabel>,
    /// Position within the owning rule set.
    pub index: RuleIndex,
}

impl Rule {
    /// Returns `true` if every condition of this rule holds for `record`.
    #[inline]
    pub fn is_candidate(&self, record: &Record) -> bool {
        (self.min_level..=self.max_level).contains(&record.level)
            && (self.min_days_since_last_purchase..=self.max_days_since_last_purchase)
                .contains(&record.days_since_last_purchase)
            && (self.min_matches_lost..=self.max_matches_lost).contains(&record.matches_lost)
            && self.spend_condition.admits(record.has_spent_money)
    }
}

/// Ordered, immutable collection of rules.
///
/// Built once with [`build_ruleset`](super::build_ruleset) and shared by
/// reference across every worker of a batch run.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RuleSet {
    rules: Vec<Rule>,
}

impl RuleSet {
    pub(crate) fn from_rules(rules: Vec<Rule>) -> Self {
        debug_assert!(rules.iter().enumerate().all(|(i, r)| r.index == i));
        Self { rules }
    }

    /// Number of rules.
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    /// Whether the set contains no rules.
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Returns the rule at `index`.
    pub fn get(&self, index: RuleIndex) -> Option<&Rule> {
        self.rules.get(index)
    }

    /// Borrows the rules in index order.
    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    /// Iterates over the rules in index order.
    pub fn iter(&self) -> std::slice::Iter<'_, Rule> {
        self.rules.iter()
    }
}

impl<'a> IntoIterator for &'a RuleSet {
    type Item = &'a Rule;
    type IntoIter = std::slice::Iter<'a, Rule>;

    fn into_iter(self) -> Self::IntoIter {
        self.rules.iter()
    }
}
