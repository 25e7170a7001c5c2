//! The retry-and-chase worker loop: places a limit order, waits a tick,
//! cancels, reads back the fill, walks the rate inward, and repeats until
//! the remaining order value drops below the venue minimum or retries are
//! exhausted.

use std::sync::Arc;
use std::time::Duration;

use rust_decimal::Decimal;
use tracing::{debug, error, warn};

use crate::core::domain::decimal::{round_down, smallest_unit};
use crate::core::domain::{FollowUp, Side, TradeDescriptor};
use crate::core::exchange::{ExchangeAdapter, OrderId};

/// A worker retries at most this many times before abandoning the
/// remainder of a leg.
pub const MAX_RETRIES: u32 = 5;

/// The fraction of the current rate walked inward on every retry,
/// floored at the smallest representable increment for the venue's rate
/// precision.
const RATE_WALK_FRACTION: Decimal = rust_decimal_macros::dec!(0.001);

/// One executed (possibly partial) fill, carrying the venue's own order
/// id so it can be persisted as an `order_details` row.
#[derive(Debug, Clone, PartialEq)]
pub struct FilledLeg {
    pub rate: Decimal,
    pub volume: Decimal,
    pub order_id: OrderId,
}

/// Runs the primary leg's retry loop, then its follow-up leg (if any)
/// with the same loop. Never returns an `Err` for a failed or partially
/// filled leg — a leg that fills nothing just yields no `FilledLeg`s;
/// callers decide whether that's a problem.
pub async fn run_worker(adapter: Arc<dyn ExchangeAdapter>, mut td: TradeDescriptor) -> Vec<FilledLeg> {
    let follow_up = td.follow_up.take();
    let mut fills = chase_fill(adapter.as_ref(), &td).await;

    if let Some(follow_up) = follow_up {
        let volume = resolve_follow_up_volume(&td, &fills, &follow_up);
        if volume > Decimal::ZERO {
            let follow_up_td = TradeDescriptor {
                exchange: td.exchange.clone(),
                market: follow_up.market.clone(),
                side: follow_up.side,
                rate: follow_up.rate,
                volume,
                min_order_value: td.min_order_value,
                rate_precision: td.rate_precision,
                volume_precision: td.volume_precision,
                follow_up: None,
            };
            let follow_up_fills = chase_fill(adapter.as_ref(), &follow_up_td).await;
            fills.extend(follow_up_fills);
        } else {
            warn!(
                exchange = adapter.name(),
                "follow-up leg skipped: primary leg produced no proceeds"
            );
        }
    }

    fills
}

/// Primary/follow-up proceeds bridging, per the three follow-up rules:
/// SELL-then-BUY converts proceeds through the follow-up's rate,
/// BUY-then-BUY carries proceeds straight through in the follow-up's
/// trade currency, SELL-then-SELL re-sells the total primary volume.
fn resolve_follow_up_volume(td: &TradeDescriptor, fills: &[FilledLeg], follow_up: &FollowUp) -> Decimal {
    let proceeds: Decimal = fills.iter().map(|f| f.rate * f.volume).sum();
    let total_volume: Decimal = fills.iter().map(|f| f.volume).sum();

    match (td.side, follow_up.side) {
        (Side::Sell, Side::Buy) => {
            if follow_up.rate.is_zero() {
                Decimal::ZERO
            } else {
                round_down(proceeds / follow_up.rate, td.volume_precision)
            }
        }
        (Side::Buy, Side::Buy) => round_down(proceeds, td.volume_precision),
        (Side::Sell, Side::Sell) => round_down(total_volume, td.volume_precision),
        (Side::Buy, Side::Sell) => round_down(total_volume, td.volume_precision),
    }
}

async fn chase_fill(adapter: &dyn ExchangeAdapter, td: &TradeDescriptor) -> Vec<FilledLeg> {
    let mut fills = Vec::new();
    let mut rate = td.rate;
    let mut volume = td.volume;
    let mut order_value = td.order_value();
    let mut retries = 0u32;

    while volume * rate > td.min_order_value && retries < MAX_RETRIES {
        let placed = adapter.place_order(&td.market, rate, volume, td.side).await;

        let order_id = match placed {
            Ok(id) => id,
            Err(e) => {
                let backoff = backoff_for(retries);
                warn!(
                    exchange = adapter.name(),
                    retry = retries,
                    backoff_secs = backoff.as_secs(),
                    error = %e,
                    "order placement failed, backing off"
                );
                tokio::time::sleep(backoff).await;
                retries += 1;
                continue;
            }
        };

        tokio::time::sleep(Duration::from_secs(1)).await;

        if let Err(e) = adapter.cancel_order(&order_id, &td.market).await {
            debug!(exchange = adapter.name(), error = %e, "cancel after chase tick failed (order likely already filled)");
        }

        let status = match adapter.get_order_data(&order_id, &td.market).await {
            Ok(status) => status,
            Err(e) => {
                error!(exchange = adapter.name(), error = %e, "order status query failed");
                retries += 1;
                continue;
            }
        };

        if status.filled_qty > Decimal::ZERO {
            fills.push(FilledLeg {
                rate,
                volume: status.filled_qty,
                order_id: order_id.clone(),
            });
            order_value -= rate * status.filled_qty;
        }

        let step = (rate * RATE_WALK_FRACTION).max(smallest_unit(td.rate_precision));
        rate = match td.side {
            Side::Buy => rate + step,
            Side::Sell => rate - step,
        };

        volume = match td.side {
            Side::Buy => {
                if rate.is_zero() {
                    Decimal::ZERO
                } else {
                    round_down(order_value / rate, td.volume_precision)
                }
            }
            Side::Sell => round_down(status.quantity_remaining, td.volume_precision),
        };
    }

    fills
}

fn backoff_for(retry: u32) -> Duration {
    let secs = 2u64.saturating_pow(retry).min(30);
    Duration::from_secs(secs)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::domain::{Currency, Market};
    use rust_decimal_macros::dec;

    fn market() -> Market {
        Market::new(Currency::new("ETH"), Currency::new("BTC"))
    }

    #[test]
    fn backoff_doubles_then_caps_at_30() {
        assert_eq!(backoff_for(0), Duration::from_secs(1));
        assert_eq!(backoff_for(1), Duration::from_secs(2));
        assert_eq!(backoff_for(4), Duration::from_secs(16));
        assert_eq!(backoff_for(5), Duration::from_secs(30));
        assert_eq!(backoff_for(10), Duration::from_secs(30));
    }

    fn fill(rate: Decimal, volume: Decimal) -> FilledLeg {
        FilledLeg { rate, volume, order_id: OrderId::new("test-order") }
    }

    fn td(side: Side, follow_up: Option<FollowUp>) -> TradeDescriptor {
        TradeDescriptor {
            exchange: "binance".into(),
            market: market(),
            side,
            rate: dec!(0.05),
            volume: dec!(2),
            min_order_value: dec!(0.001),
            rate_precision: 6,
            volume_precision: 4,
            follow_up,
        }
    }

    #[test]
    fn follow_up_sell_then_buy_converts_proceeds_through_follow_up_rate() {
        let primary = td(Side::Sell, None);
        let fills = vec![fill(dec!(0.05), dec!(2))];
        let follow_up = FollowUp {
            side: Side::Buy,
            market: Market::new(Currency::new("XRP"), Currency::new("BTC")),
            rate: dec!(0.2),
        };
        let volume = resolve_follow_up_volume(&primary, &fills, &follow_up);
        assert_eq!(volume, round_down(dec!(0.10) / dec!(0.2), primary.volume_precision));
    }

    #[test]
    fn follow_up_buy_then_buy_carries_proceeds_through() {
        let primary = td(Side::Buy, None);
        let fills = vec![fill(dec!(0.05), dec!(2))];
        let follow_up = FollowUp {
            side: Side::Buy,
            market: Market::new(Currency::new("XRP"), Currency::new("ETH")),
            rate: dec!(0.2),
        };
        let volume = resolve_follow_up_volume(&primary, &fills, &follow_up);
        assert_eq!(volume, round_down(dec!(0.10), primary.volume_precision));
    }

    #[test]
    fn follow_up_sell_then_sell_resells_total_primary_volume() {
        let primary = td(Side::Sell, None);
        let fills = vec![fill(dec!(0.05), dec!(1)), fill(dec!(0.049), dec!(1))];
        let follow_up = FollowUp {
            side: Side::Sell,
            market: Market::new(Currency::new("XRP"), Currency::new("BTC")),
            rate: dec!(0.2),
        };
        let volume = resolve_follow_up_volume(&primary, &fills, &follow_up);
        assert_eq!(volume, round_down(dec!(2), primary.volume_precision));
    }

    use std::collections::HashSet;
    use std::sync::atomic::{AtomicU32, Ordering};

    use async_trait::async_trait;

    use crate::core::domain::{Currency, MarketInfo, Wallet};
    use crate::core::exchange::{ExchangeAdapter, OrderId, OrderStatus};
    use crate::error::{Error, Result};

    /// A venue that rejects every order placement, used to drive
    /// `chase_fill` to full retry exhaustion.
    struct FailingAdapter {
        attempts: AtomicU32,
    }

    impl FailingAdapter {
        fn new() -> Self {
            Self { attempts: AtomicU32::new(0) }
        }
    }

    #[async_trait]
    impl ExchangeAdapter for FailingAdapter {
        fn name(&self) -> &'static str {
            "failing"
        }

        async fn get_balances(&self) -> Result<Wallet> {
            unimplemented!()
        }

        async fn get_market_info(
            &self,
            _markets: &[Market],
        ) -> Result<std::collections::HashMap<Market, MarketInfo>> {
            unimplemented!()
        }

        async fn place_order(&self, _market: &Market, _rate: Decimal, _volume: Decimal, _side: Side) -> Result<OrderId> {
            self.attempts.fetch_add(1, Ordering::SeqCst);
            Err(Error::Transient { exchange: self.name().to_string(), message: "connection reset".to_string() })
        }

        async fn cancel_order(&self, _order_id: &OrderId, _market: &Market) -> Result<()> {
            unimplemented!()
        }

        async fn get_order_data(&self, _order_id: &OrderId, _market: &Market) -> Result<OrderStatus> {
            unimplemented!()
        }

        async fn discover_pairs(&self) -> Result<HashSet<(Currency, Currency)>> {
            unimplemented!()
        }
    }

    #[tokio::test(start_paused = true)]
    async fn chase_fill_gives_up_after_max_retries_with_no_fills() {
        let adapter = FailingAdapter::new();
        let td = td(Side::Sell, None);

        let fills = chase_fill(&adapter, &td).await;

        assert!(fills.is_empty());
        assert_eq!(adapter.attempts.load(Ordering::SeqCst), MAX_RETRIES);
    }

    /// A venue that never rejects a placement and dribbles out a small
    /// partial fill every tick, used to prove the retry counter only
    /// tracks placement failures, not successful chase ticks.
    struct SlowFillAdapter {
        attempts: AtomicU32,
    }

    impl SlowFillAdapter {
        fn new() -> Self {
            Self { attempts: AtomicU32::new(0) }
        }
    }

    #[async_trait]
    impl ExchangeAdapter for SlowFillAdapter {
        fn name(&self) -> &'static str {
            "slow-fill"
        }

        async fn get_balances(&self) -> Result<Wallet> {
            unimplemented!()
        }

        async fn get_market_info(
            &self,
            _markets: &[Market],
        ) -> Result<std::collections::HashMap<Market, MarketInfo>> {
            unimplemented!()
        }

        async fn place_order(&self, _market: &Market, _rate: Decimal, _volume: Decimal, _side: Side) -> Result<OrderId> {
            self.attempts.fetch_add(1, Ordering::SeqCst);
            Ok(OrderId::new("slow-fill-order"))
        }

        async fn cancel_order(&self, _order_id: &OrderId, _market: &Market) -> Result<()> {
            Ok(())
        }

        async fn get_order_data(&self, order_id: &OrderId, _market: &Market) -> Result<OrderStatus> {
            let n = self.attempts.load(Ordering::SeqCst) as i64;
            let remaining = (dec!(2) - dec!(0.3) * Decimal::from(n)).max(Decimal::ZERO);
            Ok(OrderStatus {
                order_id: order_id.clone(),
                filled_qty: dec!(0.1),
                quantity_remaining: remaining,
                is_open: remaining > Decimal::ZERO,
            })
        }

        async fn discover_pairs(&self) -> Result<HashSet<(Currency, Currency)>> {
            unimplemented!()
        }
    }

    #[tokio::test(start_paused = true)]
    async fn chase_fill_keeps_chasing_past_max_retries_when_every_tick_fills_something() {
        let adapter = SlowFillAdapter::new();
        let td = td(Side::Sell, None);

        let fills = chase_fill(&adapter, &td).await;

        let attempts = adapter.attempts.load(Ordering::SeqCst);
        assert!(
            attempts > MAX_RETRIES,
            "a leg with no placement failures must not be capped at MAX_RETRIES ticks, got {attempts}"
        );
        assert_eq!(fills.len(), attempts as usize);
    }
}
