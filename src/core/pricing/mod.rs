//! Pure arbitrage math: raw scoring, the dynamic profit threshold,
//! fee-netted rate adjustment, and trade sizing. No module here touches a
//! store or a network call, which is what makes the whole stack testable
//! without mocks.

mod rates;
mod score;
mod threshold;
mod volumes;

pub use rates::{
    calc_rates_cross, calc_rates_direct, calc_rates_multi_leg, ratio_cross, ratio_direct,
    ratio_multi_leg, AdjustedRate,
};
pub use score::{cross, direct, multi_leg};
pub use threshold::dynamic_threshold;
pub use volumes::{
    order_size, order_size_multi_leg, quantize_direct, quantize_with_ratio,
    resolve_min_order_value, sizing_succeeds, DISQUALIFIED_MIN_ORDER_VALUE,
};
