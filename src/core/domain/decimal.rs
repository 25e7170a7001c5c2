//! Fixed-precision rounding helpers.
//!
//! All venue rates and volumes are quantized through these three
//! functions before they ever reach an order request. Binary floats are
//! never used for money in this crate — everything here operates on
//! [`rust_decimal::Decimal`].

use rust_decimal::{Decimal, RoundingStrategy};

/// Round down (toward zero) to `dp` decimal places.
///
/// Used for order volumes: never claim to have more size than is
/// actually available.
pub fn round_down(x: Decimal, dp: u32) -> Decimal {
    x.trunc_with_scale(dp)
}

/// Round up (away from zero) to `dp` decimal places.
///
/// Used for the buy-side rate in `calc_rates`: rounding the buy rate up
/// and the sell rate down keeps both sides of the adjustment conservative
/// relative to the midpoint.
pub fn round_up(x: Decimal, dp: u32) -> Decimal {
    let truncated = x.trunc_with_scale(dp);
    if truncated == x {
        truncated
    } else {
        truncated + smallest_unit(dp)
    }
}

/// Round half-up to `dp` decimal places.
///
/// Used when quantizing a rate or volume for submission to a venue that
/// has already passed through `round_up`/`round_down` sizing — i.e. for
/// display and for the final `order()` call, which re-quantizes.
pub fn round_half_up(x: Decimal, dp: u32) -> Decimal {
    x.round_dp_with_strategy(dp, RoundingStrategy::MidpointAwayFromZero)
}

/// `10^-dp`, the smallest representable increment at `dp` decimal places.
pub fn smallest_unit(dp: u32) -> Decimal {
    Decimal::new(1, dp)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn round_down_truncates() {
        assert_eq!(round_down(dec!(1.23456), 2), dec!(1.23));
        assert_eq!(round_down(dec!(1.2), 2), dec!(1.20));
    }

    #[test]
    fn round_up_bumps_when_lossy() {
        assert_eq!(round_up(dec!(1.23001), 2), dec!(1.24));
        assert_eq!(round_up(dec!(1.23), 2), dec!(1.23));
    }

    #[test]
    fn round_half_up_rounds_midpoint_away_from_zero() {
        assert_eq!(round_half_up(dec!(1.235), 2), dec!(1.24));
        assert_eq!(round_half_up(dec!(1.234), 2), dec!(1.23));
    }

    #[test]
    fn smallest_unit_is_power_of_ten() {
        assert_eq!(smallest_unit(0), dec!(1));
        assert_eq!(smallest_unit(8), dec!(0.00000001));
    }

    #[test]
    fn round_down_zero_precision_truncates_to_integer() {
        assert_eq!(round_down(dec!(7.9), 0), dec!(7));
    }
}
