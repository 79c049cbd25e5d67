//! Rule documents and rule set construction.

use tracing::{debug, warn};

use super::types::{Rule, RuleSet, SpendCondition, ValidityWindow};
use crate::catalog::OfferLabel;
use crate::error::ConfigError;

/// One rule object as it appears in the rule configuration.
///
/// Field names follow the configuration file. `has_spent_money` uses the
/// `1` / `0` / `-1` encoding of [`SpendCondition`].
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RuleDocument {
    pub min_level: i32,
    pub max_level: i32,
    pub min_days_since_last_purchase: i32,
    pub max_days_since_last_purchase: i32,
    pub min_matches_lost: i32,
    pub max_matches_lost: i32,
    pub has_spent_money: i64,
    #[cfg_attr(feature = "serde", serde(default, skip_serializing_if = "Option::is_none"))]
    pub offer: Option<String>,
    pub weight: f64,
    #[cfg_attr(feature = "serde", serde(default))]
    pub start_time: i64,
    #[cfg_attr(feature = "serde", serde(default = "default_end_time"))]
    pub end_time: i64,
}

#[cfg(feature = "serde")]
fn default_end_time() -> i64 {
    i64::MAX
}

/// Top-level rule configuration: `{"rules": [...]}`.
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RulesConfig {
    pub rules: Vec<RuleDocument>,
}

impl RuleDocument {
    /// Converts this document into the rule at position `index`.
    pub fn into_rule(self, index: usize) -> Result<Rule, ConfigError> {
        let spend_condition = SpendCondition::from_code(self.has_spent_money).ok_or(
            ConfigError::InvalidSpendCondition {
                index,
                value: self.has_spent_money,
            },
        )?;

        for (field, min, max) in [
            ("level", self.min_level, self.max_level),
            (
                "days_since_last_purchase",
                self.min_days_since_last_purchase,
                self.max_days_since_last_purchase,
            ),
            ("matches_lost", self.min_matches_lost, self.max_matches_lost),
        ] {
            if min > max {
                return Err(ConfigError::InvertedBounds {
                    index,
                    field,
                    min,
                    max,
                });
            }
        }

        if !self.weight.is_finite() {
            return Err(ConfigError::NonFiniteWeight {
                index,
                weight: self.weight,
            });
        }

        let configured_offer = match self.offer {
            Some(label) => Some(
                label
                    .parse::<OfferLabel>()
                    .map_err(|_| ConfigError::UnknownOffer { index, label })?,
            ),
            None => None,
        };

        if self.start_time > self.end_time {
            warn!(
                rule = index,
                start = self.start_time,
                end = self.end_time,
                "validity window starts after it ends"
            );
        }

        Ok(Rule {
            min_level: self.min_level,
            max_level: self.max_level,
            min_days_since_last_purchase: self.min_days_since_last_purchase,
            max_days_since_last_purchase: self.max_days_since_last_purchase,
            min_matches_lost: self.min_matches_lost,
            max_matches_lost: self.max_matches_lost,
            spend_condition,
            weight: self.weight,
            validity_window: ValidityWindow {
                start: self.start_time,
                end: self.end_time,
            },
            configured_offer,
            index,
        })
    }
}

impl From<&Rule> for RuleDocument {
    fn from(rule: &Rule) -> Self {
        Self {
            min_level: rule.min_level,
            max_level: rule.max_level,
            min_days_since_last_purchase: rule.min_days_since_last_purchase,
            max_days_since_last_purchase: rule.max_days_since_last_purchase,
            min_matches_lost: rule.min_matches_lost,
            max_matches_lost: rule.max_matches_lost,
            has_spent_money: rule.spend_condition.code(),
            offer: rule.configured_offer.map(|label| label.as_str().to_string()),
            weight: rule.weight,
            start_time: rule.validity_window.start,
            end_time: rule.validity_window.end,
        }
    }
}

/// Builds a [`RuleSet`] from rule documents, assigning indices in order.
///
/// Fails on the first malformed document; the error names its index.
///
/// # Examples
///
/// ```
/// use offer_engine::ruleset::{build_ruleset, RuleDocument};
///
/// let ruleset = build_ruleset(vec![RuleDocument {
///     min_level: 1,
///     max_level: 10,
///     max_days_since_last_purchase: 5,
///     max_matches_lost: 3,
///     has_spent_money: -1,
///     weight: 1.0,
///     ..RuleDocument::default()
/// }])
/// .unwrap();
/// assert_eq!(ruleset.len(), 1);
/// ```
pub fn build_ruleset<I>(documents: I) -> Result<RuleSet, ConfigError>
where
    I: IntoIterator<Item = RuleDocument>,
{
    let rules = documents
        .into_iter()
        .enumerate()
        .map(|(index, doc)| doc.into_rule(index))
        .collect::<Result<Vec<_>, _>>()?;

    if rules.is_empty() {
        warn!("rule set is empty; every record will receive the default offer");
    }
    debug!(rules = rules.len(), "rule set built");

    Ok(RuleSet::from_rules(rules))
}
