//! The in-process record of one scan-tick's candidate arbitrage, written
//! to the opportunity store on every tick regardless of dry-run mode.

use rust_decimal::Decimal;

/// Discriminates which route family an [`Opportunity`] was built from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteType {
    Direct,
    MultiLeg,
    Cross,
}

impl RouteType {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Direct => "direct",
            Self::MultiLeg => "multi_leg",
            Self::Cross => "cross",
        }
    }
}

/// One row of the append-only opportunity log. Field names mirror the
/// persistence schema's `opportunities` table.
#[derive(Debug, Clone)]
pub struct Opportunity {
    pub ts: f64,
    pub route_type: RouteType,
    pub route_label: String,
    pub buy_exchange: String,
    pub sell_exchange: String,
    pub spread_pct: Decimal,
    pub buy_rate: Decimal,
    pub sell_rate: Decimal,
    pub cross_rate: Option<Decimal>,
    pub qty_a: Decimal,
    pub qty_b: Decimal,
    pub executed: bool,
    pub dry_run: bool,
}

impl Opportunity {
    /// `true` if sizing succeeded, regardless of whether execution was
    /// actually attempted (`executed`).
    pub fn sized(&self) -> bool {
        self.qty_a > Decimal::ZERO && self.qty_b > Decimal::ZERO
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn sample(qty_a: Decimal, qty_b: Decimal) -> Opportunity {
        Opportunity {
            ts: 0.0,
            route_type: RouteType::Direct,
            route_label: "ETHBTC".into(),
            buy_exchange: "kraken".into(),
            sell_exchange: "binance".into(),
            spread_pct: dec!(0.01),
            buy_rate: dec!(0.05),
            sell_rate: dec!(0.0505),
            cross_rate: None,
            qty_a,
            qty_b,
            executed: false,
            dry_run: true,
        }
    }

    #[test]
    fn route_type_labels() {
        assert_eq!(RouteType::Direct.as_str(), "direct");
        assert_eq!(RouteType::MultiLeg.as_str(), "multi_leg");
        assert_eq!(RouteType::Cross.as_str(), "cross");
    }

    #[test]
    fn sized_requires_both_quantities_positive() {
        assert!(sample(dec!(1), dec!(1)).sized());
        assert!(!sample(dec!(0), dec!(1)).sized());
        assert!(!sample(dec!(1), dec!(0)).sized());
    }
}
