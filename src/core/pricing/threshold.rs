//! The dynamic profit threshold a route's raw score must clear before
//! sizing is attempted: `(1 + MIN_PROFIT) * Π(1 + fee_i) - 1`.

use rust_decimal::Decimal;

/// `fees` is one entry per leg (2 for direct, 3 for multi-leg, 4 for
/// cross).
pub fn dynamic_threshold(min_profit: Decimal, fees: &[Decimal]) -> Decimal {
    let fee_product = fees
        .iter()
        .fold(Decimal::ONE, |acc, fee| acc * (Decimal::ONE + *fee));
    (Decimal::ONE + min_profit) * fee_product - Decimal::ONE
}
