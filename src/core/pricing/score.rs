//! Raw arbitrage score per route family, computed from top-of-book only,
//! before fees are applied. Freshness gating happens at the call site
//! (the scanner), since it needs each book's `lastUpdate`, not just its
//! best price.

use rust_decimal::Decimal;

/// `bid_A / ask_B - 1`, A the higher-bid venue, B the lower-ask venue.
pub fn direct(bid_a: Decimal, ask_b: Decimal) -> Decimal {
    if ask_b.is_zero() {
        return Decimal::ZERO;
    }
    bid_a / ask_b - Decimal::ONE
}

/// `bid_{trade/buy_base on A} / (ask_{trade/sell_base on B} *
/// ask_{cross_pair on B}) - 1`.
pub fn multi_leg(bid_buy_base_a: Decimal, ask_sell_base_b: Decimal, ask_cross_pair_b: Decimal) -> Decimal {
    let denom = ask_sell_base_b * ask_cross_pair_b;
    if denom.is_zero() {
        return Decimal::ZERO;
    }
    bid_buy_base_a / denom - Decimal::ONE
}

/// `(bid_{x/base on A} * bid_{y/base on B}) / (ask_{y/base on A} *
/// ask_{x/base on B}) - 1`.
pub fn cross(
    bid_x_a: Decimal,
    bid_y_b: Decimal,
    ask_y_a: Decimal,
    ask_x_b: Decimal,
) -> Decimal {
    let denom = ask_y_a * ask_x_b;
    if denom.is_zero() {
        return Decimal::ZERO;
    }
    (bid_x_a * bid_y_b) / denom - Decimal::ONE
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn direct_score_is_ratio_minus_one() {
        assert_eq!(direct(dec!(100), dec!(99)), dec!(100) / dec!(99) - Decimal::ONE);
    }

    #[test]
    fn direct_score_zero_when_no_dislocation() {
        assert_eq!(direct(dec!(100), dec!(100)), Decimal::ZERO);
    }

    #[test]
    fn direct_score_zero_ask_guards_division() {
        assert_eq!(direct(dec!(100), Decimal::ZERO), Decimal::ZERO);
    }

    #[test]
    fn multi_leg_score_divides_by_both_legs() {
        let score = multi_leg(dec!(1), dec!(0.5), dec!(1.9));
        assert_eq!(score, dec!(1) / (dec!(0.5) * dec!(1.9)) - Decimal::ONE);
    }

    #[test]
    fn cross_score_combines_four_prices() {
        let score = cross(dec!(50), dec!(0.02), dec!(0.021), dec!(49));
        let expected = (dec!(50) * dec!(0.02)) / (dec!(0.021) * dec!(49)) - Decimal::ONE;
        assert_eq!(score, expected);
    }
}
