//! Offer labels and the rule-to-label policy.
//!
//! The label set is closed: four rotating offers plus the default offer
//! assigned when no rule matches. [`OfferCatalog`] turns the Matcher's
//! `Option<RuleIndex>` into an [`OfferLabel`] under an explicit
//! [`LabelPolicy`].

use std::fmt;
use std::str::FromStr;

use crate::ruleset::{RuleIndex, RuleSet};

/// A promotional offer assigned to a record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum OfferLabel {
    Discount,
    FirstPurchaseBonus,
    RegularOffer,
    SpecialReward,
    /// Assigned when no rule matches.
    #[default]
    #[cfg_attr(feature = "serde", serde(rename = "default_offer"))]
    Default,
}

impl OfferLabel {
    /// All labels, ordered by [`id`](Self::id).
    pub const ALL: [OfferLabel; 5] = [
        OfferLabel::Discount,
        OfferLabel::FirstPurchaseBonus,
        OfferLabel::RegularOffer,
        OfferLabel::SpecialReward,
        OfferLabel::Default,
    ];

    /// The labels a matching rule rotates through by index.
    pub const ROTATION: [OfferLabel; 4] = [
        OfferLabel::Discount,
        OfferLabel::FirstPurchaseBonus,
        OfferLabel::RegularOffer,
        OfferLabel::SpecialReward,
    ];

    /// Returns the wire name of this label.
    pub fn as_str(self) -> &'static str {
        match self {
            OfferLabel::Discount => "discount",
            OfferLabel::FirstPurchaseBonus => "first_purchase_bonus",
            OfferLabel::RegularOffer => "regular_offer",
            OfferLabel::SpecialReward => "special_reward",
            OfferLabel::Default => "default_offer",
        }
    }

    /// Numeric offer id: 0..=3 for the rotation, 4 for the default.
    pub fn id(self) -> u8 {
        self as u8
    }
}

impl fmt::Display for OfferLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Returned when a string names no known offer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownOfferLabel(pub String);

impl fmt::Display for UnknownOfferLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown offer label {:?}", self.0)
    }
}

impl std::error::Error for UnknownOfferLabel {}

impl FromStr for OfferLabel {
    type Err = UnknownOfferLabel;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        OfferLabel::ALL
            .into_iter()
            .find(|label| label.as_str() == s)
            .ok_or_else(|| UnknownOfferLabel(s.to_string()))
    }
}

/// How a winning rule index is mapped to a label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LabelPolicy {
    /// `OfferLabel::ROTATION[index % 4]`, ignoring any configured offer.
    #[default]
    IndexModulo,

    /// The rule's configured offer when present, else the index rotation.
    Configured,
}

/// Maps Matcher output to offer labels.
///
/// # Examples
///
/// ```
/// use offer_engine::catalog::{OfferCatalog, OfferLabel};
///
/// let catalog = OfferCatalog::default();
/// assert_eq!(catalog.label_for(Some(5)), OfferLabel::FirstPurchaseBonus);
/// assert_eq!(catalog.label_for(None), OfferLabel::Default);
/// ```
#[derive(Debug, Clone, Default)]
pub struct OfferCatalog {
    policy: LabelPolicy,
    configured: Vec<Option<OfferLabel>>,
}

impl OfferCatalog {
    /// Catalog using the index rotation only.
    pub fn index_modulo() -> Self {
        Self::default()
    }

    /// Catalog honoring the `offer` field of each rule document.
    pub fn configured(ruleset: &RuleSet) -> Self {
        Self {
            policy: LabelPolicy::Configured,
            configured: ruleset.iter().map(|rule| rule.configured_offer).collect(),
        }
    }

    /// Returns the active policy.
    pub fn policy(&self) -> LabelPolicy {
        self.policy
    }

    /// Resolves the label for a Matcher result.
    #[inline]
    pub fn label_for(&self, winner: Option<RuleIndex>) -> OfferLabel {
        match winner {
            None => OfferLabel::Default,
            Some(index) => self
                .configured
                .get(index)
                .copied()
                .flatten()
                .unwrap_or(OfferLabel::ROTATION[index % OfferLabel::ROTATION.len()]),
        }
    }
}
