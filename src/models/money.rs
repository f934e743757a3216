//! Monetary amounts and percentages are persisted as integer hundredths so
//! that SQL aggregation stays exact.

use crate::error::DbError;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};

/// Rounds half away from zero to whole hundredths.
pub fn to_hundredths(amount: Decimal) -> Result<i64, DbError> {
    amount
        .round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
        .checked_mul(Decimal::ONE_HUNDRED)
        .and_then(|scaled| scaled.to_i64())
        .ok_or(DbError::Amount(amount))
}

pub fn from_hundredths(value: i64) -> Decimal {
    Decimal::new(value, 2)
}
