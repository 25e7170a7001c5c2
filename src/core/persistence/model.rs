//! Row types for the append-only persistence schema. Decimal and
//! timestamp fields are stored as `Text`: `rust_decimal`'s diesel
//! integration is a separate opt-in feature this crate's dependency
//! stack doesn't carry, and round-tripping through `Decimal::to_string()`
//! / `str::parse` keeps every figure exact (see DESIGN.md).

use diesel::prelude::*;

use super::schema::{balances, order_details, orders, opportunities};

#[derive(Insertable, Debug, Clone)]
#[diesel(table_name = opportunities)]
pub struct NewOpportunityRow {
    pub ts: String,
    pub route_type: String,
    pub route_label: String,
    pub buy_exchange: String,
    pub sell_exchange: String,
    pub spread_pct: String,
    pub buy_rate: String,
    pub sell_rate: String,
    pub cross_rate: Option<String>,
    pub qty_a: String,
    pub qty_b: String,
    pub executed: bool,
    pub dry_run: bool,
}

#[derive(Queryable, Selectable, Debug, Clone)]
#[diesel(table_name = opportunities)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct OpportunityRow {
    pub id: i32,
    pub ts: String,
    pub route_type: String,
    pub route_label: String,
    pub buy_exchange: String,
    pub sell_exchange: String,
    pub spread_pct: String,
    pub buy_rate: String,
    pub sell_rate: String,
    pub cross_rate: Option<String>,
    pub qty_a: String,
    pub qty_b: String,
    pub executed: bool,
    pub dry_run: bool,
}

#[derive(Insertable, Debug, Clone)]
#[diesel(table_name = orders)]
pub struct NewOrderRow {
    pub ts: String,
    pub market: String,
}

#[derive(Queryable, Selectable, Debug, Clone)]
#[diesel(table_name = orders)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct OrderRow {
    pub id: i32,
    pub ts: String,
    pub market: String,
}

/// One filled sub-leg, foreign to `orders` via `order_id`.
#[derive(Insertable, Debug, Clone)]
#[diesel(table_name = order_details)]
pub struct NewOrderDetailRow {
    pub order_id: i32,
    pub volume: String,
    pub rate: String,
    pub orig_id: String,
    pub exchange: String,
    pub side: String,
}

#[derive(Insertable, Debug, Clone)]
#[diesel(table_name = balances)]
pub struct NewBalanceRow {
    pub currency: String,
    pub balance: String,
    pub ts: String,
}
