//! Control-plane status: a point-in-time summary of the locked stores a
//! real HTTP `/status` endpoint would serve, instead written to a JSON
//! file on a fixed interval and read back by the `status` CLI subcommand.
//! The running engine is the writer, a separate one-shot invocation is
//! the reader, and staleness is judged by `updated_at` rather than an
//! IPC round-trip.

use std::fs;
use std::io;
use std::path::Path;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::{HistogramBuckets, LiveStore, OpportunityStore, RouteList, WalletStore};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RouteStatus {
    pub label: String,
    pub buy_exchange: String,
    pub sell_exchange: String,
    pub last_score: Decimal,
    pub highest_seen: Decimal,
    pub histogram: HistogramBuckets,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WalletSummary {
    pub exchange: String,
    pub balances: Vec<(String, Decimal)>,
}

/// Everything a status read needs, flattened to plain types so it can be
/// serialized without pulling `serde` onto every domain type.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusSnapshot {
    pub route_count: usize,
    pub routes: Vec<RouteStatus>,
    pub wallets: Vec<WalletSummary>,
    pub opportunities_logged: usize,
    pub last_tick: f64,
}

impl StatusSnapshot {
    pub fn capture(
        routes: &RouteList,
        live: &LiveStore,
        wallets: &WalletStore,
        opportunities: &OpportunityStore,
        last_tick: f64,
    ) -> Self {
        let routes_snapshot = routes.snapshot();
        let route_labels: std::collections::HashMap<_, _> = routes_snapshot
            .iter()
            .map(|route| {
                let label = route.markets().iter().map(|m| m.label()).collect::<Vec<_>>().join("/");
                (route.clone(), label)
            })
            .collect();

        let routes = live
            .entries()
            .into_iter()
            .map(|(route, comparison)| RouteStatus {
                label: route_labels.get(&route).cloned().unwrap_or_default(),
                buy_exchange: comparison.buy_exchange,
                sell_exchange: comparison.sell_exchange,
                last_score: comparison.score,
                highest_seen: comparison.highest_seen,
                histogram: comparison.histogram,
            })
            .collect();

        let wallets = wallets
            .all()
            .into_iter()
            .map(|(exchange, wallet)| WalletSummary {
                exchange,
                balances: wallet
                    .currencies()
                    .map(|c| (c.as_str().to_string(), wallet.available(c)))
                    .collect(),
            })
            .collect();

        Self {
            route_count: routes_snapshot.len(),
            routes,
            wallets,
            opportunities_logged: opportunities.len(),
            last_tick,
        }
    }
}

/// On-disk envelope: the snapshot plus the writer's identity, so the
/// reader can tell a stale file left behind by a crashed process from a
/// live one that simply hasn't ticked in a while.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusFile {
    pub pid: u32,
    pub started_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub snapshot: StatusSnapshot,
}

impl StatusFile {
    pub fn new(started_at: DateTime<Utc>, snapshot: StatusSnapshot) -> Self {
        Self {
            pid: std::process::id(),
            started_at,
            updated_at: Utc::now(),
            snapshot,
        }
    }

    /// Write atomically: serialize to a sibling `.tmp` file, then rename
    /// over the target, so a reader never observes a half-written file.
    pub fn write_to(&self, path: &Path) -> io::Result<()> {
        let tmp_path = path.with_extension("tmp");
        let body = serde_json::to_string_pretty(self).map_err(io::Error::other)?;
        fs::write(&tmp_path, body)?;
        fs::rename(&tmp_path, path)
    }

    pub fn read_from(path: &Path) -> Option<Self> {
        let body = fs::read_to_string(path).ok()?;
        serde_json::from_str(&body).ok()
    }
}
