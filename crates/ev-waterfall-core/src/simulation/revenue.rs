use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::config::{OperatingInput, SimulationConfig};
use crate::types::*;

/// Which tariff applies in a given month.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PriceRegime {
    Promo,
    Normal,
}

/// Revenue and operating cost for one month.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MonthlyFinancials {
    pub price_regime: PriceRegime,
    /// Energy sold across all chargers (kWh)
    pub volume_kwh: Decimal,
    pub revenue: Money,
    pub operating_expense: Money,
    /// Always exactly `revenue - operating_expense`
    pub operating_profit: Money,
}

/// Figures for elapsed `month`: the promotional tariff through `promo_months`,
/// the normal tariff afterwards.
pub fn monthly_financials(month: Months, config: &SimulationConfig) -> MonthlyFinancials {
    let regime = if month <= config.operations().promo_months {
        PriceRegime::Promo
    } else {
        PriceRegime::Normal
    };
    *config.financials(regime)
}

/// Revenue for `units` chargers and the fixed/variable costs of running them
/// under one tariff, or `None` when an amount leaves the `Decimal` range.
///
/// Volume uses the configured days-per-month convention, not calendar months,
/// so every month with the same tariff produces the same figures.
pub(crate) fn price_month(
    price_regime: PriceRegime,
    ops: &OperatingInput,
    units: Decimal,
) -> Option<MonthlyFinancials> {
    let price = match price_regime {
        PriceRegime::Promo => ops.promo_price,
        PriceRegime::Normal => ops.normal_price,
    };

    let volume_kwh = ops
        .daily_kwh_per_unit
        .checked_mul(ops.day_count.days_per_month())?
        .checked_mul(units)?;
    let revenue = volume_kwh.checked_mul(price)?.round_dp(MONEY_DP);

    let grid_base = ops
        .grid_base_rate
        .checked_mul(ops.contracted_kw_per_unit)?
        .checked_mul(units)?;
    let energy = volume_kwh.checked_mul(ops.energy_cost_per_kwh)?;
    let comm = ops.comm_fee_per_unit.checked_mul(units)?;
    let maintenance = ops.maintenance_per_unit.checked_mul(units)?;
    let operating_expense = grid_base
        .checked_add(energy)?
        .checked_add(comm)?
        .checked_add(maintenance)?
        .round_dp(MONEY_DP);

    Some(MonthlyFinancials {
        price_regime,
        volume_kwh,
        revenue,
        operating_expense,
        operating_profit: revenue.checked_sub(operating_expense)?,
    })
}
