//! Per-route-family evaluation: pick the best venue ordering, gate on
//! freshness, score, threshold, adjust rates, and size the trade. Each
//! function returns `None` when the route can't be scored at all (a book
//! or market-info entry is missing) and `Some(Evaluation)` otherwise —
//! scoring below threshold or failing to size is still an `Evaluation`,
//! just one with `plan: None`.

use std::time::{SystemTime, UNIX_EPOCH};

use rust_decimal::Decimal;

use crate::core::domain::{
    BookSide, Currency, FollowUp, Market, MarketInfo, OrderBookEntry, Route, Side, TradeDescriptor,
};
use crate::core::pricing::{self, AdjustedRate};
use crate::core::store::BookKey;

use super::context::{Context, FRESHNESS_MAX_AGE_SECS};

/// Wall-clock seconds, used for freshness gating and `Opportunity::ts`.
pub fn now_secs() -> f64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs_f64())
        .unwrap_or(0.0)
}

/// One executable leg, resolved from an adjusted rate plus sized volume.
pub struct Plan {
    pub buy_exchange: String,
    pub sell_exchange: String,
    pub buy_td: TradeDescriptor,
    pub sell_td: TradeDescriptor,
    pub qty_a: Decimal,
    pub qty_b: Decimal,
    pub cross_rate: Option<Decimal>,
}

/// Outcome of evaluating one route on one tick, regardless of whether it
/// cleared the profit threshold or sizing.
pub struct Evaluation {
    pub buy_exchange: String,
    pub sell_exchange: String,
    pub raw_score: Decimal,
    pub plan: Option<Plan>,
}

fn fresh_book(ctx: &Context, exchange: &str, market: &Market, now: f64) -> Option<OrderBookEntry> {
    let book = ctx.books.get(&BookKey::new(exchange, market.clone()))?;
    if book.is_fresh(now, FRESHNESS_MAX_AGE_SECS) {
        Some(book)
    } else {
        None
    }
}

fn market_info(ctx: &Context, exchange: &str, market: &Market) -> Option<MarketInfo> {
    ctx.market_info.get(exchange, market)
}

/// ETH/BTC best bid on `exchange`, used as the `minOrderValue` fallback
/// divisor per §4.4. `None` when the book is absent or stale.
fn eth_btc_bid(ctx: &Context, exchange: &str, now: f64) -> Option<Decimal> {
    let market = Market::new(Currency::new("ETH"), Currency::new("BTC"));
    fresh_book(ctx, exchange, &market, now).and_then(|b| b.best_bid().map(|l| l.price))
}

fn resolved_min_order_value(ctx: &Context, exchange: &str, base: &Currency, info: &MarketInfo, now: f64) -> Decimal {
    pricing::resolve_min_order_value(
        base,
        info.min_order_value_btc,
        info.min_order_value_eth,
        eth_btc_bid(ctx, exchange, now),
    )
    .unwrap_or(pricing::DISQUALIFIED_MIN_ORDER_VALUE)
}

/// Evaluate a direct route across every ordered venue pair, returning the
/// best-scoring ordering.
pub fn evaluate_direct(ctx: &Context, market: &Market, now: f64) -> Option<Evaluation> {
    let mut best: Option<Evaluation> = None;

    for (sell_exchange, buy_exchange) in ctx.venue_pairs() {
        let book_a = match fresh_book(ctx, &sell_exchange, market, now) {
            Some(b) => b,
            None => continue,
        };
        let book_b = match fresh_book(ctx, &buy_exchange, market, now) {
            Some(b) => b,
            None => continue,
        };
        let (Some(bid_a), Some(ask_b)) = (book_a.best_bid(), book_b.best_ask()) else {
            continue;
        };

        let raw_score = pricing::direct(bid_a.price, ask_b.price);
        if best.as_ref().map(|b| raw_score > b.raw_score).unwrap_or(true) {
            let info_a = market_info(ctx, &sell_exchange, market);
            let info_b = market_info(ctx, &buy_exchange, market);

            let plan = match (info_a, info_b) {
                (Some(info_a), Some(info_b)) => size_direct(
                    ctx, market, &sell_exchange, &buy_exchange, &book_a, &book_b, &info_a, &info_b, raw_score, now,
                ),
                _ => None,
            };

            best = Some(Evaluation {
                buy_exchange: buy_exchange.clone(),
                sell_exchange: sell_exchange.clone(),
                raw_score,
                plan,
            });
        }
    }

    best
}

#[allow(clippy::too_many_arguments)]
fn size_direct(
    ctx: &Context,
    market: &Market,
    sell_exchange: &str,
    buy_exchange: &str,
    book_a: &OrderBookEntry,
    book_b: &OrderBookEntry,
    info_a: &MarketInfo,
    info_b: &MarketInfo,
    raw_score: Decimal,
    now: f64,
) -> Option<Plan> {
    let threshold = pricing::dynamic_threshold(ctx.min_profit, &[info_a.trade_fee, info_b.trade_fee]);
    if raw_score <= threshold {
        return None;
    }

    let bid_a = book_a.best_bid()?.price;
    let ask_b = book_b.best_ask()?.price;

    let (AdjustedRate { rate: new_buy, .. }, AdjustedRate { rate: new_sell, .. }) =
        pricing::calc_rates_direct(ask_b, bid_a, info_b.trade_fee, info_a.trade_fee, info_b.rate_precision, info_a.rate_precision);

    let min_order_value_a = resolved_min_order_value(ctx, sell_exchange, market.base(), info_a, now);
    let min_order_value_b = resolved_min_order_value(ctx, buy_exchange, market.base(), info_b, now);

    let book_value = book_a
        .value_to_rate(BookSide::Bid, new_sell)
        .min(book_b.value_to_rate(BookSide::Ask, new_buy));

    let (trade_a, trade_b) = ctx.wallets.get_pair(sell_exchange, buy_exchange);
    let wallet_value_a = trade_a.map(|w| w.available(market.trade()) * new_sell).unwrap_or(Decimal::ZERO);
    let wallet_value_b = trade_b.map(|w| w.available(market.base())).unwrap_or(Decimal::ZERO);

    let size = pricing::order_size(book_value, wallet_value_a.min(wallet_value_b));
    if !pricing::sizing_succeeds(size, min_order_value_a, min_order_value_b) {
        return None;
    }

    let trade_qty = if new_sell.is_zero() { Decimal::ZERO } else { size / new_sell };
    let (qty_a, qty_b) = pricing::quantize_direct(trade_qty, info_a.volume_precision, info_b.volume_precision);
    if qty_a.is_zero() || qty_b.is_zero() {
        return None;
    }

    let sell_td = TradeDescriptor {
        exchange: sell_exchange.to_string(),
        market: market.clone(),
        side: Side::Sell,
        rate: new_sell,
        volume: qty_a,
        min_order_value: min_order_value_a,
        rate_precision: info_a.rate_precision,
        volume_precision: info_a.volume_precision,
        follow_up: None,
    };
    let buy_td = TradeDescriptor {
        exchange: buy_exchange.to_string(),
        market: market.clone(),
        side: Side::Buy,
        rate: new_buy,
        volume: qty_b,
        min_order_value: min_order_value_b,
        rate_precision: info_b.rate_precision,
        volume_precision: info_b.volume_precision,
        follow_up: None,
    };

    Some(Plan {
        buy_exchange: buy_exchange.to_string(),
        sell_exchange: sell_exchange.to_string(),
        buy_td,
        sell_td,
        qty_a,
        qty_b,
        cross_rate: None,
    })
}

/// Evaluate a multi-leg route across every ordered (sell-venue, buy-venue)
/// pair. `buy_market`'s bid is read on the sell venue, `sell_market`'s and
/// `cross_pair`'s asks on the buy venue.
pub fn evaluate_multi_leg(
    ctx: &Context,
    buy_market: &Market,
    sell_market: &Market,
    cross_pair: &Market,
    now: f64,
) -> Option<Evaluation> {
    let mut best: Option<Evaluation> = None;

    for (venue_a, venue_b) in ctx.venue_pairs() {
        let book_buy_market_a = match fresh_book(ctx, &venue_a, buy_market, now) {
            Some(b) => b,
            None => continue,
        };
        let book_sell_market_b = match fresh_book(ctx, &venue_b, sell_market, now) {
            Some(b) => b,
            None => continue,
        };
        let book_cross_b = match fresh_book(ctx, &venue_b, cross_pair, now) {
            Some(b) => b,
            None => continue,
        };
        let (Some(bid), Some(ask1), Some(ask2)) =
            (book_buy_market_a.best_bid(), book_sell_market_b.best_ask(), book_cross_b.best_ask())
        else {
            continue;
        };

        let raw_score = pricing::multi_leg(bid.price, ask1.price, ask2.price);
        if best.as_ref().map(|b| raw_score > b.raw_score).unwrap_or(true) {
            let info_buy_market_a = market_info(ctx, &venue_a, buy_market);
            let info_sell_market_b = market_info(ctx, &venue_b, sell_market);
            let info_cross_b = market_info(ctx, &venue_b, cross_pair);

            let plan = match (info_buy_market_a, info_sell_market_b, info_cross_b) {
                (Some(ia), Some(ib), Some(ic)) => size_multi_leg(
                    ctx, buy_market, sell_market, cross_pair, &venue_a, &venue_b,
                    &book_buy_market_a, &book_sell_market_b, &book_cross_b, &ia, &ib, &ic, raw_score, now,
                ),
                _ => None,
            };

            best = Some(Evaluation {
                buy_exchange: venue_b.clone(),
                sell_exchange: venue_a.clone(),
                raw_score,
                plan,
            });
        }
    }

    best
}

#[allow(clippy::too_many_arguments)]
fn size_multi_leg(
    ctx: &Context,
    buy_market: &Market,
    sell_market: &Market,
    cross_pair: &Market,
    venue_a: &str,
    venue_b: &str,
    book_buy_market_a: &OrderBookEntry,
    book_sell_market_b: &OrderBookEntry,
    book_cross_b: &OrderBookEntry,
    info_a: &MarketInfo,
    info_b: &MarketInfo,
    info_cross: &MarketInfo,
    raw_score: Decimal,
    now: f64,
) -> Option<Plan> {
    let threshold = pricing::dynamic_threshold(
        ctx.min_profit,
        &[info_a.trade_fee, info_b.trade_fee, info_cross.trade_fee],
    );
    if raw_score <= threshold {
        return None;
    }

    let bid = book_buy_market_a.best_bid()?.price;
    let ask_sell = book_sell_market_b.best_ask()?.price;
    let ask_cross = book_cross_b.best_ask()?.price;

    let (buy_adj, sell_adj, cross_adj) = pricing::calc_rates_multi_leg(
        ask_sell, bid, ask_cross,
        info_b.trade_fee, info_a.trade_fee, info_cross.trade_fee,
        info_b.rate_precision, info_a.rate_precision, info_cross.rate_precision,
    );

    let min_order_value_a = resolved_min_order_value(ctx, venue_a, buy_market.base(), info_a, now);
    let min_order_value_b = resolved_min_order_value(ctx, venue_b, sell_market.base(), info_b, now);

    let book_value = book_buy_market_a
        .value_to_rate(BookSide::Bid, sell_adj.rate)
        .min(book_sell_market_b.value_to_rate(BookSide::Ask, buy_adj.rate));

    let (wallet_a, wallet_b) = ctx.wallets.get_pair(venue_a, venue_b);
    let wallet_value_a = wallet_a.map(|w| w.available(buy_market.trade()) * sell_adj.rate).unwrap_or(Decimal::ZERO);
    let cross_funding_value = wallet_b.map(|w| w.available(cross_pair.base())).unwrap_or(Decimal::ZERO);

    let size = pricing::order_size_multi_leg(book_value, wallet_value_a, cross_funding_value);
    if !pricing::sizing_succeeds(size, min_order_value_a, min_order_value_b) {
        return None;
    }

    let trade_qty = if sell_adj.rate.is_zero() { Decimal::ZERO } else { size / sell_adj.rate };
    let (qty_a, qty_b) = pricing::quantize_direct(trade_qty, info_a.volume_precision, info_b.volume_precision);
    if qty_a.is_zero() || qty_b.is_zero() {
        return None;
    }

    let sell_td = TradeDescriptor {
        exchange: venue_a.to_string(),
        market: buy_market.clone(),
        side: Side::Sell,
        rate: sell_adj.rate,
        volume: qty_a,
        min_order_value: min_order_value_a,
        rate_precision: info_a.rate_precision,
        volume_precision: info_a.volume_precision,
        follow_up: None,
    };
    let buy_td = TradeDescriptor {
        exchange: venue_b.to_string(),
        market: sell_market.clone(),
        side: Side::Buy,
        rate: buy_adj.rate,
        volume: qty_b,
        min_order_value: min_order_value_b,
        rate_precision: info_b.rate_precision,
        volume_precision: info_b.volume_precision,
        follow_up: Some(FollowUp {
            side: Side::Buy,
            market: cross_pair.clone(),
            rate: cross_adj.rate,
        }),
    };

    Some(Plan {
        buy_exchange: venue_b.to_string(),
        sell_exchange: venue_a.to_string(),
        buy_td,
        sell_td,
        qty_a,
        qty_b,
        cross_rate: Some(cross_adj.rate),
    })
}

/// Evaluate a cross route across every ordered venue pair.
pub fn evaluate_cross(
    ctx: &Context,
    market_x: &Market,
    market_y: &Market,
    now: f64,
) -> Option<Evaluation> {
    let mut best: Option<Evaluation> = None;

    for (venue_a, venue_b) in ctx.venue_pairs() {
        let book_x_a = match fresh_book(ctx, &venue_a, market_x, now) {
            Some(b) => b,
            None => continue,
        };
        let book_y_b = match fresh_book(ctx, &venue_b, market_y, now) {
            Some(b) => b,
            None => continue,
        };
        let book_y_a = match fresh_book(ctx, &venue_a, market_y, now) {
            Some(b) => b,
            None => continue,
        };
        let book_x_b = match fresh_book(ctx, &venue_b, market_x, now) {
            Some(b) => b,
            None => continue,
        };
        let (Some(bid_x_a), Some(bid_y_b), Some(ask_y_a), Some(ask_x_b)) =
            (book_x_a.best_bid(), book_y_b.best_bid(), book_y_a.best_ask(), book_x_b.best_ask())
        else {
            continue;
        };

        let raw_score = pricing::cross(bid_x_a.price, bid_y_b.price, ask_y_a.price, ask_x_b.price);
        if best.as_ref().map(|b| raw_score > b.raw_score).unwrap_or(true) {
            let info_x_a = market_info(ctx, &venue_a, market_x);
            let info_y_b = market_info(ctx, &venue_b, market_y);
            let info_y_a = market_info(ctx, &venue_a, market_y);
            let info_x_b = market_info(ctx, &venue_b, market_x);

            let plan = match (info_x_a, info_y_b, info_y_a, info_x_b) {
                (Some(ixa), Some(iyb), Some(iya), Some(ixb)) => size_cross(
                    ctx, market_x, market_y, &venue_a, &venue_b,
                    &book_x_a, &book_y_b, &book_y_a, &book_x_b,
                    &ixa, &iyb, &iya, &ixb, raw_score, now,
                ),
                _ => None,
            };

            best = Some(Evaluation {
                buy_exchange: venue_b.clone(),
                sell_exchange: venue_a.clone(),
                raw_score,
                plan,
            });
        }
    }

    best
}

#[allow(clippy::too_many_arguments)]
fn size_cross(
    ctx: &Context,
    market_x: &Market,
    market_y: &Market,
    venue_a: &str,
    venue_b: &str,
    book_x_a: &OrderBookEntry,
    book_y_b: &OrderBookEntry,
    book_y_a: &OrderBookEntry,
    book_x_b: &OrderBookEntry,
    info_x_a: &MarketInfo,
    info_y_b: &MarketInfo,
    info_y_a: &MarketInfo,
    info_x_b: &MarketInfo,
    raw_score: Decimal,
    now: f64,
) -> Option<Plan> {
    let threshold = pricing::dynamic_threshold(
        ctx.min_profit,
        &[info_x_a.trade_fee, info_y_b.trade_fee, info_y_a.trade_fee, info_x_b.trade_fee],
    );
    if raw_score <= threshold {
        return None;
    }

    let bid_x_a = book_x_a.best_bid()?.price;
    let bid_y_b = book_y_b.best_bid()?.price;
    let ask_y_a = book_y_a.best_ask()?.price;
    let ask_x_b = book_x_b.best_ask()?.price;

    let (adj_bid_x_a, adj_bid_y_b, adj_ask_y_a, adj_ask_x_b) = pricing::calc_rates_cross(
        bid_x_a, bid_y_b, ask_y_a, ask_x_b,
        info_x_a.trade_fee, info_y_b.trade_fee, info_y_a.trade_fee, info_x_b.trade_fee,
        info_x_a.rate_precision, info_y_b.rate_precision, info_y_a.rate_precision, info_x_b.rate_precision,
    );

    let min_order_value_a = resolved_min_order_value(ctx, venue_a, market_x.base(), info_x_a, now);
    let min_order_value_b = resolved_min_order_value(ctx, venue_b, market_y.base(), info_y_b, now);

    let book_value = book_x_a
        .value_to_rate(BookSide::Bid, adj_bid_x_a.rate)
        .min(book_y_b.value_to_rate(BookSide::Bid, adj_bid_y_b.rate));

    let (wallet_a, wallet_b) = ctx.wallets.get_pair(venue_a, venue_b);
    let wallet_value_a = wallet_a.map(|w| w.available(market_x.trade()) * adj_bid_x_a.rate).unwrap_or(Decimal::ZERO);
    let wallet_value_b = wallet_b.map(|w| w.available(market_y.trade()) * adj_bid_y_b.rate).unwrap_or(Decimal::ZERO);

    let size = pricing::order_size(book_value, wallet_value_a.min(wallet_value_b));
    if !pricing::sizing_succeeds(size, min_order_value_a, min_order_value_b) {
        return None;
    }

    let qty_x = if adj_bid_x_a.rate.is_zero() { Decimal::ZERO } else { size / adj_bid_x_a.rate };
    let qty_y = if adj_bid_y_b.rate.is_zero() { Decimal::ZERO } else { size / adj_bid_y_b.rate };
    let (qty_a, _) = pricing::quantize_direct(qty_x, info_x_a.volume_precision, info_x_a.volume_precision);
    let (qty_b, _) = pricing::quantize_direct(qty_y, info_y_b.volume_precision, info_y_b.volume_precision);
    if qty_a.is_zero() || qty_b.is_zero() {
        return None;
    }

    let sell_td = TradeDescriptor {
        exchange: venue_a.to_string(),
        market: market_x.clone(),
        side: Side::Sell,
        rate: adj_bid_x_a.rate,
        volume: qty_a,
        min_order_value: min_order_value_a,
        rate_precision: info_x_a.rate_precision,
        volume_precision: info_x_a.volume_precision,
        follow_up: Some(FollowUp {
            side: Side::Buy,
            market: market_y.clone(),
            rate: adj_ask_y_a.rate,
        }),
    };
    let buy_td = TradeDescriptor {
        exchange: venue_b.to_string(),
        market: market_y.clone(),
        side: Side::Sell,
        rate: adj_bid_y_b.rate,
        volume: qty_b,
        min_order_value: min_order_value_b,
        rate_precision: info_y_b.rate_precision,
        volume_precision: info_y_b.volume_precision,
        follow_up: Some(FollowUp {
            side: Side::Buy,
            market: market_x.clone(),
            rate: adj_ask_x_b.rate,
        }),
    };

    Some(Plan {
        buy_exchange: venue_b.to_string(),
        sell_exchange: venue_a.to_string(),
        buy_td,
        sell_td,
        qty_a,
        qty_b,
        cross_rate: None,
    })
}

/// Dispatch on route shape.
pub fn evaluate_route(ctx: &Context, route: &Route, now: f64) -> Option<Evaluation> {
    match route {
        Route::Direct { market } => evaluate_direct(ctx, market, now),
        Route::MultiLeg {
            buy_market,
            sell_market,
            cross_pair,
            ..
        } => evaluate_multi_leg(ctx, buy_market, sell_market, cross_pair, now),
        Route::Cross {
            market_x, market_y, ..
        } => evaluate_cross(ctx, market_x, market_y, now),
    }
}
