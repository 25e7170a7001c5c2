//! `calc_rates`: shifts the raw best-bid/best-ask pair inward by a third
//! of their fee-adjusted gap, so the executed rates still clear a profit
//! after both venues' fees.

use rust_decimal::Decimal;

use crate::core::domain::decimal::{round_down, round_up};

/// One leg's adjusted rate plus the fee-netted rate it was derived from.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AdjustedRate {
    pub rate: Decimal,
    pub net_rate: Decimal,
}

/// Direct-route rate adjustment: `A` is the higher-bid (sell-into) venue,
/// `B` the lower-ask (buy-from) venue in `calc_rates`' own naming the
/// buyer is `B` and the seller is `A` (named `buy_rate`/`sell_rate` here
/// to match the worker's side assignment: the BUY leg executes on `B`,
/// the SELL leg on `A`).
pub fn calc_rates_direct(
    buy_rate: Decimal,
    sell_rate: Decimal,
    fee_buy: Decimal,
    fee_sell: Decimal,
    rate_precision_buy: u32,
    rate_precision_sell: u32,
) -> (AdjustedRate, AdjustedRate) {
    let third = Decimal::new(1, 0) / Decimal::new(3, 0);

    let buy_rate_net = buy_rate / (Decimal::ONE + fee_buy);
    let sell_rate_net = sell_rate * (Decimal::ONE + fee_sell);
    let diff = buy_rate_net - sell_rate_net;

    let new_buy = round_up(
        (buy_rate_net - diff * third) * (Decimal::ONE + fee_buy),
        rate_precision_buy,
    );
    let new_sell = round_down(
        (sell_rate_net + diff * third) / (Decimal::ONE + fee_sell),
        rate_precision_sell,
    );

    (
        AdjustedRate {
            rate: new_buy,
            net_rate: buy_rate_net,
        },
        AdjustedRate {
            rate: new_sell,
            net_rate: sell_rate_net,
        },
    )
}

/// `r = net_sell / net_buy` for the direct route.
pub fn ratio_direct(buy_rate_net: Decimal, sell_rate_net: Decimal) -> Decimal {
    if buy_rate_net.is_zero() {
        return Decimal::ZERO;
    }
    sell_rate_net / buy_rate_net
}

/// Multi-leg rate adjustment. `diff` (the fee-netted buy/sell gap, same
/// as the direct case) is split three ways across the buy leg, the sell
/// leg, and the cross leg so all three quantities stay balanced.
pub fn calc_rates_multi_leg(
    buy_rate: Decimal,
    sell_rate: Decimal,
    cross_rate: Decimal,
    fee_buy: Decimal,
    fee_sell: Decimal,
    fee_cross: Decimal,
    rate_precision_buy: u32,
    rate_precision_sell: u32,
    rate_precision_cross: u32,
) -> (AdjustedRate, AdjustedRate, AdjustedRate) {
    let third = Decimal::new(1, 0) / Decimal::new(3, 0);

    let buy_rate_net = buy_rate / (Decimal::ONE + fee_buy);
    let sell_rate_net = sell_rate * (Decimal::ONE + fee_sell);
    let cross_rate_net = cross_rate * (Decimal::ONE + fee_cross);
    let diff = buy_rate_net - sell_rate_net * cross_rate_net;

    let new_buy = round_up(
        (buy_rate_net - diff * third) * (Decimal::ONE + fee_buy),
        rate_precision_buy,
    );
    let new_sell = round_down(
        (sell_rate_net + diff * third / cross_rate_net) / (Decimal::ONE + fee_sell),
        rate_precision_sell,
    );
    let new_cross = round_down(
        (cross_rate_net + diff * third / sell_rate_net) / (Decimal::ONE + fee_cross),
        rate_precision_cross,
    );

    (
        AdjustedRate {
            rate: new_buy,
            net_rate: buy_rate_net,
        },
        AdjustedRate {
            rate: new_sell,
            net_rate: sell_rate_net,
        },
        AdjustedRate {
            rate: new_cross,
            net_rate: cross_rate_net,
        },
    )
}

/// `r = (sell_rate_net * cross_rate_net) / buy_rate_net`.
pub fn ratio_multi_leg(buy_rate_net: Decimal, sell_rate_net: Decimal, cross_rate_net: Decimal) -> Decimal {
    if buy_rate_net.is_zero() {
        return Decimal::ZERO;
    }
    (sell_rate_net * cross_rate_net) / buy_rate_net
}

/// Cross-route rate adjustment across all four legs, the fee-netted gap
/// split four ways.
#[allow(clippy::too_many_arguments)]
pub fn calc_rates_cross(
    bid_x_a: Decimal,
    bid_y_b: Decimal,
    ask_y_a: Decimal,
    ask_x_b: Decimal,
    fee_x_a: Decimal,
    fee_y_b: Decimal,
    fee_y_a: Decimal,
    fee_x_b: Decimal,
    precision_x_a: u32,
    precision_y_b: u32,
    precision_y_a: u32,
    precision_x_b: u32,
) -> (AdjustedRate, AdjustedRate, AdjustedRate, AdjustedRate) {
    let quarter = Decimal::new(1, 0) / Decimal::new(4, 0);

    let bid_x_a_net = bid_x_a * (Decimal::ONE + fee_x_a);
    let bid_y_b_net = bid_y_b * (Decimal::ONE + fee_y_b);
    let ask_y_a_net = ask_y_a / (Decimal::ONE + fee_y_a);
    let ask_x_b_net = ask_x_b / (Decimal::ONE + fee_x_b);

    let diff = (bid_x_a_net * bid_y_b_net) - (ask_y_a_net * ask_x_b_net);
    let shift = diff * quarter;

    let new_bid_x_a = round_down((bid_x_a_net - shift) / (Decimal::ONE + fee_x_a), precision_x_a);
    let new_bid_y_b = round_down((bid_y_b_net - shift) / (Decimal::ONE + fee_y_b), precision_y_b);
    let new_ask_y_a = round_up((ask_y_a_net + shift) * (Decimal::ONE + fee_y_a), precision_y_a);
    let new_ask_x_b = round_up((ask_x_b_net + shift) * (Decimal::ONE + fee_x_b), precision_x_b);

    (
        AdjustedRate { rate: new_bid_x_a, net_rate: bid_x_a_net },
        AdjustedRate { rate: new_bid_y_b, net_rate: bid_y_b_net },
        AdjustedRate { rate: new_ask_y_a, net_rate: ask_y_a_net },
        AdjustedRate { rate: new_ask_x_b, net_rate: ask_x_b_net },
    )
}

/// `r = (bid_x_net * bid_y_net) / (ask_y_net * ask_x_net)`.
pub fn ratio_cross(
    bid_x_net: Decimal,
    bid_y_net: Decimal,
    ask_y_net: Decimal,
    ask_x_net: Decimal,
) -> Decimal {
    let denom = ask_y_net * ask_x_net;
    if denom.is_zero() {
        return Decimal::ZERO;
    }
    (bid_x_net * bid_y_net) / denom
}
