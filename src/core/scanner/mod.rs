//! The scan loop: every [`TICK_INTERVAL_MS`], re-evaluate every route,
//! publish its live comparison, log any candidate, and — outside dry-run
//! — hand a cleared, sized candidate off to the execution coordinator.

mod context;
mod evaluate;

pub use context::{Context, FRESHNESS_MAX_AGE_SECS, TICK_INTERVAL_MS};
pub use evaluate::{evaluate_route, now_secs, Evaluation, Plan};

use std::sync::Arc;
use std::time::Duration;

use rust_decimal::Decimal;
use tokio::sync::watch;
use tracing::{info, warn};

use crate::core::domain::{Opportunity, Route, RouteType};
use crate::core::execution::{run_worker, FilledLeg, Rendezvous, DIRECT_TIMEOUT, FOLLOW_UP_TIMEOUT};
use crate::core::persistence::{NewBalanceRow, NewOrderDetailRow, NewOrderRow};

/// Drives the scan loop until `shutdown` fires. Each route in the current
/// snapshot is evaluated independently and in sequence: the route list is
/// small enough (single digits to low hundreds) that a tick comfortably
/// fits inside the 100ms interval without fanning out workers per route.
pub async fn run(ctx: Arc<Context>, mut shutdown: watch::Receiver<bool>) {
    let mut interval = tokio::time::interval(Duration::from_millis(TICK_INTERVAL_MS));

    loop {
        tokio::select! {
            _ = interval.tick() => {
                tick(&ctx).await;
            }
            _ = shutdown.changed() => {
                if *shutdown.borrow() {
                    info!("scanner shutting down");
                    return;
                }
            }
        }
    }
}

async fn tick(ctx: &Arc<Context>) {
    let routes = ctx.routes.snapshot();
    let now = now_secs();
    *ctx.last_tick.write() = now;

    for route in routes.iter() {
        let Some(eval) = evaluate_route(ctx, route, now) else {
            continue;
        };

        ctx.live.publish(route.clone(), eval.buy_exchange.clone(), eval.sell_exchange.clone(), eval.raw_score);

        let Some(plan) = eval.plan else {
            continue;
        };

        let mut opportunity = build_opportunity(route, &eval.buy_exchange, &eval.sell_exchange, eval.raw_score, &plan, now, ctx.dry_run);

        if !ctx.dry_run {
            opportunity.executed = execute(ctx, &plan).await;
        }

        if let Err(e) = ctx.persistence.record_opportunity(&opportunity) {
            warn!(error = %e, "failed to persist opportunity");
        }
        ctx.opportunities.append(opportunity);
    }
}

fn build_opportunity(
    route: &Route,
    buy_exchange: &str,
    sell_exchange: &str,
    raw_score: Decimal,
    plan: &evaluate::Plan,
    now: f64,
    dry_run: bool,
) -> Opportunity {
    let route_type = match route {
        Route::Direct { .. } => RouteType::Direct,
        Route::MultiLeg { .. } => RouteType::MultiLeg,
        Route::Cross { .. } => RouteType::Cross,
    };
    let route_label = route.markets().iter().map(|m| m.label()).collect::<Vec<_>>().join("/");

    Opportunity {
        ts: now,
        route_type,
        route_label,
        buy_exchange: buy_exchange.to_string(),
        sell_exchange: sell_exchange.to_string(),
        spread_pct: raw_score,
        buy_rate: plan.buy_td.rate,
        sell_rate: plan.sell_td.rate,
        cross_rate: plan.cross_rate,
        qty_a: plan.qty_a,
        qty_b: plan.qty_b,
        executed: false,
        dry_run,
    }
}

/// Hands both legs to the coordinator, waits on the appropriate timeout,
/// then refreshes both venues' wallets and records what happened.
/// Returns whether the coordinator dispatched both legs and the
/// rendezvous completed without timing out; a worker exhausting its own
/// retries still counts as executed, since the coordinator itself saw no
/// exception. On a timeout the two worker tasks are left running
/// detached — the scanner moves on to the next route rather than
/// blocking on their eventual completion — and whatever they fill is
/// still persisted once they finish.
async fn execute(ctx: &Arc<Context>, plan: &evaluate::Plan) -> bool {
    let Some(sell_adapter) = ctx.adapter(&plan.sell_td.exchange) else {
        warn!(exchange = %plan.sell_td.exchange, "no adapter registered for sell leg");
        return false;
    };
    let Some(buy_adapter) = ctx.adapter(&plan.buy_td.exchange) else {
        warn!(exchange = %plan.buy_td.exchange, "no adapter registered for buy leg");
        return false;
    };

    let has_follow_up = plan.sell_td.follow_up.is_some() || plan.buy_td.follow_up.is_some();
    let timeout = if has_follow_up { FOLLOW_UP_TIMEOUT } else { DIRECT_TIMEOUT };

    let rendezvous = Arc::new(Rendezvous::new());
    rendezvous.signal_start();

    let sell_td = plan.sell_td.clone();
    let buy_td = plan.buy_td.clone();

    let r1 = rendezvous.clone();
    let worker_one = tokio::spawn(async move {
        let fills = run_worker(sell_adapter, sell_td).await;
        r1.signal_worker_one();
        fills
    });

    let r2 = rendezvous.clone();
    let worker_two = tokio::spawn(async move {
        let fills = run_worker(buy_adapter, buy_td).await;
        r2.signal_worker_two();
        fills
    });

    let completed = rendezvous.await_completion(timeout).await.is_ok();

    let market_label = combined_market_label(plan);
    let sell_exchange = plan.sell_td.exchange.clone();
    let buy_exchange = plan.buy_td.exchange.clone();

    if completed {
        let sell_fills = worker_one.await.unwrap_or_default();
        let buy_fills = worker_two.await.unwrap_or_default();
        record_and_refresh(ctx, &market_label, &sell_exchange, sell_fills, &buy_exchange, buy_fills).await;
    } else {
        warn!("execution timed out; workers left to finish in the background");
        let ctx = ctx.clone();
        tokio::spawn(async move {
            let sell_fills = worker_one.await.unwrap_or_default();
            let buy_fills = worker_two.await.unwrap_or_default();
            record_and_refresh(&ctx, &market_label, &sell_exchange, sell_fills, &buy_exchange, buy_fills).await;
        });
    }

    completed
}

fn combined_market_label(plan: &evaluate::Plan) -> String {
    let sell_label = plan.sell_td.market.label();
    let buy_label = plan.buy_td.market.label();
    if sell_label == buy_label {
        sell_label
    } else {
        format!("{sell_label}/{buy_label}")
    }
}

fn order_details(exchange: &str, fills: &[FilledLeg], side_label: &str) -> Vec<NewOrderDetailRow> {
    fills
        .iter()
        .map(|fill| NewOrderDetailRow {
            order_id: 0,
            volume: fill.volume.to_string(),
            rate: fill.rate.to_string(),
            orig_id: fill.order_id.as_str().to_string(),
            exchange: exchange.to_string(),
            side: side_label.to_string(),
        })
        .collect()
}

/// Records the order and its filled sub-legs, then refreshes both
/// venues' wallets and records the resulting balances — §4.4's "refresh
/// wallets... and record the legs" and §7's "never swallow financial
/// state" policy.
async fn record_and_refresh(
    ctx: &Arc<Context>,
    market_label: &str,
    sell_exchange: &str,
    sell_fills: Vec<FilledLeg>,
    buy_exchange: &str,
    buy_fills: Vec<FilledLeg>,
) {
    let mut details = order_details(sell_exchange, &sell_fills, "sell");
    details.extend(order_details(buy_exchange, &buy_fills, "buy"));

    if !details.is_empty() {
        let order = NewOrderRow {
            ts: now_secs().to_string(),
            market: market_label.to_string(),
        };
        if let Err(e) = ctx.persistence.record_order(&order, &details) {
            warn!(error = %e, "failed to persist executed order");
        }
    }

    refresh_wallets(ctx, &[sell_exchange.to_string(), buy_exchange.to_string()]).await;
}

/// §4.6: sleep 1s, then poll `get_balances` up to 3 times (1s spacing)
/// per venue, keeping the first successful read and persisting it.
async fn refresh_wallets(ctx: &Arc<Context>, exchanges: &[String]) {
    tokio::time::sleep(Duration::from_secs(1)).await;

    let mut balance_rows = Vec::new();
    let ts = now_secs().to_string();

    for exchange in exchanges {
        let Some(adapter) = ctx.adapter(exchange) else { continue };

        for attempt in 0..3 {
            match adapter.get_balances().await {
                Ok(wallet) => {
                    for currency in wallet.currencies() {
                        balance_rows.push(NewBalanceRow {
                            currency: currency.as_str().to_string(),
                            balance: wallet.available(currency).to_string(),
                            ts: ts.clone(),
                        });
                    }
                    ctx.wallets.replace(exchange.clone(), wallet);
                    break;
                }
                Err(e) => {
                    warn!(exchange = %exchange, attempt, error = %e, "wallet refresh failed");
                    tokio::time::sleep(Duration::from_secs(1)).await;
                }
            }
        }
    }

    if !balance_rows.is_empty() {
        if let Err(e) = ctx.persistence.record_balances(&balance_rows) {
            warn!(error = %e, "failed to persist refreshed balances");
        }
    }
}
