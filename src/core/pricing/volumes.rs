//! `calc_volumes`: sizes the trade within book depth, wallet balances, and
//! exchange minima, then quantizes both legs' quantities to their venues'
//! precision.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use crate::core::domain::decimal::round_down;
use crate::core::domain::Currency;

/// The 1/3 order-book-depth cap and the minimum-order-value margin.
const DEPTH_DIVISOR: Decimal = dec!(3);
const MIN_ORDER_VALUE_MARGIN: Decimal = dec!(1.25);

/// Stand-in minimum order value for a route whose base currency can't be
/// resolved to a real minimum at all. Large enough that no real order
/// size clears `sizing_succeeds`'s `* MIN_ORDER_VALUE_MARGIN` check, but
/// far under `Decimal::MAX` so that multiplication doesn't overflow.
pub const DISQUALIFIED_MIN_ORDER_VALUE: Decimal = dec!(1e20);

/// `min(book_value / 3, wallet_value)`, both already valued in the base
/// currency of the dominant leg.
pub fn order_size(book_value: Decimal, wallet_value: Decimal) -> Decimal {
    (book_value / DEPTH_DIVISOR).min(wallet_value)
}

/// Multi-leg sizing additionally caps on the `buy_base` available on the
/// venue that funds the cross leg.
pub fn order_size_multi_leg(book_value: Decimal, wallet_value: Decimal, cross_funding_value: Decimal) -> Decimal {
    order_size(book_value, wallet_value).min(cross_funding_value)
}

/// `true` if `order_size` clears `max(minOrderValue_A, minOrderValue_B) * 1.25`.
pub fn sizing_succeeds(order_size: Decimal, min_order_value_a: Decimal, min_order_value_b: Decimal) -> bool {
    order_size > min_order_value_a.max(min_order_value_b) * MIN_ORDER_VALUE_MARGIN
}

/// Quantize a direct route's matched trade quantity: round down at the
/// coarser (larger step, smaller precision number) of the two venues'
/// volume precisions first, then re-quantize to each venue's own
/// precision. Both legs trade the same quantity of the `trade` currency.
pub fn quantize_direct(trade_qty: Decimal, precision_a: u32, precision_b: u32) -> (Decimal, Decimal) {
    let coarse = precision_a.min(precision_b);
    let qty = round_down(trade_qty, coarse);
    (round_down(qty, precision_a), round_down(qty, precision_b))
}

/// Quantize a multi-leg or cross route's two differently-denominated
/// quantities: the primary leg's quantity is rounded down at the coarser
/// precision, then the secondary leg's quantity is derived by scaling
/// through `r` (the net rate ratio) and rounded down to its own
/// precision.
pub fn quantize_with_ratio(
    primary_qty: Decimal,
    r: Decimal,
    precision_primary: u32,
    precision_secondary: u32,
) -> (Decimal, Decimal) {
    let coarse = precision_primary.min(precision_secondary);
    let qty_primary = round_down(primary_qty, coarse);
    let qty_secondary = round_down(qty_primary * r, precision_secondary);
    (round_down(qty_primary, precision_primary), qty_secondary)
}

/// Resolve the minimum order value for `base`: `minOrderValueBTC` when
/// `base == BTC`; when `base == ETH`, `minOrderValueETH` if present,
/// else `minOrderValueBTC` (or `0.0001` if that's also absent) divided
/// by the venue's ETH/BTC best bid. Any other base, or an ETH base with
/// no `minOrderValueETH` and no ETH/BTC book, disqualifies the route
/// (`None`) rather than guessing.
pub fn resolve_min_order_value(
    base: &Currency,
    min_order_value_btc: Option<Decimal>,
    min_order_value_eth: Option<Decimal>,
    eth_btc_bid: Option<Decimal>,
) -> Option<Decimal> {
    if base.as_str() == "BTC" {
        return min_order_value_btc;
    }
    if base.as_str() == "ETH" {
        if let Some(mov_eth) = min_order_value_eth {
            return Some(mov_eth);
        }
        return match eth_btc_bid {
            Some(bid) if !bid.is_zero() => {
                Some(min_order_value_btc.unwrap_or(dec!(0.0001)) / bid)
            }
            _ => None,
        };
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn order_size_caps_at_a_third_of_book_depth() {
        assert_eq!(order_size(dec!(30), dec!(1000)), dec!(10));
    }

    #[test]
    fn order_size_caps_at_wallet_when_smaller() {
        assert_eq!(order_size(dec!(300), dec!(5)), dec!(5));
    }

    #[test]
    fn order_size_multi_leg_also_caps_at_cross_funding() {
        assert_eq!(order_size_multi_leg(dec!(300), dec!(1000), dec!(2)), dec!(2));
    }

    #[test]
    fn sizing_succeeds_requires_clearing_125_pct_margin() {
        assert!(sizing_succeeds(dec!(13), dec!(10), dec!(8)));
        assert!(!sizing_succeeds(dec!(12), dec!(10), dec!(8)));
        assert!(!sizing_succeeds(dec!(12.5), dec!(10), dec!(8)));
    }

    #[test]
    fn quantize_direct_matches_both_legs_to_the_coarser_precision_first() {
        let (qty_a, qty_b) = quantize_direct(dec!(1.23456789), 4, 6);
        assert_eq!(qty_a, dec!(1.2345));
        assert_eq!(qty_b, dec!(1.2345));
    }

    #[test]
    fn quantize_with_ratio_derives_secondary_leg_via_r() {
        let (primary, secondary) = quantize_with_ratio(dec!(10), dec!(0.05), 4, 6);
        assert_eq!(primary, dec!(10));
        assert_eq!(secondary, dec!(0.5));
    }

    #[test]
    fn resolve_min_order_value_uses_btc_field_for_btc_base() {
        let v = resolve_min_order_value(&Currency::new("BTC"), Some(dec!(0.0001)), None, None);
        assert_eq!(v, Some(dec!(0.0001)));
    }

    #[test]
    fn resolve_min_order_value_uses_eth_field_for_eth_base() {
        let v = resolve_min_order_value(&Currency::new("ETH"), None, Some(dec!(0.001)), None);
        assert_eq!(v, Some(dec!(0.001)));
    }

    #[test]
    fn resolve_min_order_value_falls_back_through_eth_btc_bid_when_eth_field_missing() {
        let v = resolve_min_order_value(
            &Currency::new("ETH"),
            Some(dec!(0.0003)),
            None,
            Some(dec!(0.06)),
        );
        assert_eq!(v, Some(dec!(0.0003) / dec!(0.06)));
    }

    #[test]
    fn resolve_min_order_value_eth_fallback_defaults_btc_numerator_when_absent() {
        let v = resolve_min_order_value(&Currency::new("ETH"), None, None, Some(dec!(0.05)));
        assert_eq!(v, Some(dec!(0.0001) / dec!(0.05)));
    }

    #[test]
    fn resolve_min_order_value_disqualifies_eth_base_with_no_fallback_rate() {
        let v = resolve_min_order_value(&Currency::new("ETH"), None, None, None);
        assert_eq!(v, None);
    }

    #[test]
    fn resolve_min_order_value_disqualifies_every_non_btc_non_eth_base() {
        let v = resolve_min_order_value(
            &Currency::new("USDT"),
            Some(dec!(0.0001)),
            Some(dec!(0.001)),
            Some(dec!(0.06)),
        );
        assert_eq!(v, None);
    }
}
