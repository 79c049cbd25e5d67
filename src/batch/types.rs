//! Batch output values.

use crate::catalog::OfferLabel;
use crate::matching::RecordId;

/// The offer decided for one record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MatchResult {
    #[cfg_attr(feature = "serde", serde(rename = "player_id"))]
    pub record_id: RecordId,
    pub offer: OfferLabel,
}

impl MatchResult {
    pub fn new(record_id: RecordId, offer: OfferLabel) -> Self {
        Self { record_id, offer }
    }
}
