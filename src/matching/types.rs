//! Player records.

use crate::error::InputError;

/// Identifier of a player record.
pub type RecordId = u64;

/// A player profile to be matched against a [`RuleSet`](crate::ruleset::RuleSet).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Record {
    pub id: RecordId,
    pub level: i32,
    pub days_since_last_purchase: i32,
    pub matches_lost: i32,
    pub has_spent_money: bool,
}

impl Record {
    pub fn new(
        id: RecordId,
        level: i32,
        days_since_last_purchase: i32,
        matches_lost: i32,
        has_spent_money: bool,
    ) -> Self {
        Self {
            id,
            level,
            days_since_last_purchase,
            matches_lost,
            has_spent_money,
        }
    }

    /// Builds a record from the tabular encoding, where `has_spent_money`
    /// is `0` or `1`.
    ///
    /// `index` is the record's position in its batch and only appears in
    /// the error.
    pub fn from_flag(
        index: usize,
        id: RecordId,
        level: i32,
        days_since_last_purchase: i32,
        matches_lost: i32,
        has_spent_money: i64,
    ) -> Result<Self, InputError> {
        let spent = match has_spent_money {
            0 => false,
            1 => true,
            value => return Err(InputError::InvalidSpendFlag { index, value }),
        };
        Ok(Self::new(
            id,
            level,
            days_since_last_purchase,
            matches_lost,
            spent,
        ))
    }
}
