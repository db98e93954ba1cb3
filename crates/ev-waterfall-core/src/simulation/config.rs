use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use super::revenue::{price_month, MonthlyFinancials, PriceRegime};
use crate::error::EvWaterfallError;
use crate::types::*;
use crate::EvWaterfallResult;

/// Longest horizon accepted (20 years).
pub const MAX_HORIZON_MONTHS: Months = 240;

/// Highest annual discount rate accepted (15%).
pub const MAX_DISCOUNT_RATE: Rate = dec!(0.15);

/// Configured phases, excluding the implicit open-ended exclusive phase.
pub const MAX_PHASES: usize = 3;

/// Most chargers accepted in one scenario.
pub const MAX_UNIT_COUNT: u32 = 100_000;

/// Largest per-unit cost, price, quantity or principal accepted.
pub const MAX_AMOUNT: Money = dec!(1000000000000000);

/// Largest monthly revenue or operating expense a scenario may produce.
///
/// Keeps horizon-long cumulative balances well inside `Decimal` range.
pub const MAX_MONTHLY_AMOUNT: Money = dec!(1000000000000000000000000);

/// Highest amortizing target return accepted (1000%).
pub const MAX_TARGET_RETURN: Rate = dec!(10);

// ---------------------------------------------------------------------------
// Input types
// ---------------------------------------------------------------------------

/// Per-unit capital cost structure.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CapitalInput {
    /// Site and grid-connection cost per charger
    pub infra_cost_per_unit: Money,
    /// Hardware cost per charger
    pub charger_cost_per_unit: Money,
    /// Public subsidy received per charger
    pub subsidy_per_unit: Money,
    /// Number of chargers installed
    pub unit_count: u32,
}

/// Days-per-month convention for converting daily throughput to monthly volume.
///
/// The two conventions are not numerically interchangeable.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DayCount {
    /// 365 / 12 days per month
    #[default]
    AverageMonth,
    /// Flat 30 days per month
    ThirtyDay,
}

impl DayCount {
    pub fn days_per_month(self) -> Decimal {
        match self {
            DayCount::AverageMonth => dec!(365) / dec!(12),
            DayCount::ThirtyDay => dec!(30),
        }
    }
}

/// Pricing and operating-cost parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OperatingInput {
    /// Months (from month 1) billed at the promotional price
    pub promo_months: Months,
    /// Promotional price per kWh
    pub promo_price: Money,
    /// Normal price per kWh
    pub normal_price: Money,
    /// Average energy delivered per charger per day (kWh)
    pub daily_kwh_per_unit: Decimal,
    /// Energy purchase cost per kWh
    pub energy_cost_per_kwh: Money,
    /// Grid base charge per contracted kW per month
    pub grid_base_rate: Money,
    /// Contracted capacity per charger (kW)
    pub contracted_kw_per_unit: Decimal,
    /// Communication / admin fee per charger per month
    #[serde(default)]
    pub comm_fee_per_unit: Money,
    /// Maintenance fee per charger per month
    pub maintenance_per_unit: Money,
    #[serde(default)]
    pub day_count: DayCount,
}

/// Length of a phase or horizon, in months or whole years.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PhaseDuration {
    Months(Months),
    Years(u32),
}

impl PhaseDuration {
    pub fn months(self) -> Option<Months> {
        match self {
            PhaseDuration::Months(m) => Some(m),
            PhaseDuration::Years(y) => y.checked_mul(12),
        }
    }
}

/// How the investor is paid while a phase is active.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PayoutRule {
    /// Fixed monthly interest on principal, independent of operating profit
    InterestOnly { annual_rate: Rate },
    /// Share of positive operating profit; losses stay with the company
    ProfitShare { share: Rate },
    /// Constant monthly payment that brings total payouts to
    /// `principal * (1 + target_return)`
    AmortizingTarget {
        target_return: Rate,
        /// Deduct interest scheduled in earlier interest-only phases from the target
        #[serde(default = "default_true")]
        net_of_prior_interest: bool,
    },
    /// Company keeps all operating profit
    Exclusive,
}

fn default_true() -> bool {
    true
}

impl PayoutRule {
    /// Whether the investor is owed anything while this rule applies.
    pub fn pays_investor(&self) -> bool {
        !matches!(self, PayoutRule::Exclusive)
    }
}

/// A single configured financing phase.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PhaseDefinition {
    pub label: String,
    pub duration: PhaseDuration,
    pub rule: PayoutRule,
}

/// Total simulation horizon policy.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Horizon {
    /// Horizon equals the sum of the configured phase durations
    #[default]
    FromPhases,
    /// Independent horizon in months; truncates or extends the phases
    Months(Months),
    /// Independent horizon in whole years
    Years(u32),
}

/// When the one-off principal repayment happens.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RepaymentTiming {
    /// At elapsed month n
    Month(Months),
    /// In the last month of year n
    Year(u32),
    /// In the last month of the configured phase at this index
    EndOfPhase(usize),
}

/// Complete user-supplied scenario, before validation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationInput {
    pub capital: CapitalInput,
    /// Amount raised from the investor
    pub investor_principal: Money,
    /// Ordered financing phases (1 to 3)
    pub phases: Vec<PhaseDefinition>,
    #[serde(default)]
    pub horizon: Horizon,
    /// Optional one-off transfer of the principal back to the investor
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub principal_repayment: Option<RepaymentTiming>,
    pub operations: OperatingInput,
    /// Annual discount rate for NPV
    pub discount_rate: Rate,
    #[serde(default)]
    pub currency: Currency,
}

impl Default for SimulationInput {
    /// Interest, profit share, then exclusive, with the principal repaid at the
    /// end of year 5 of a 7-year horizon.
    fn default() -> Self {
        SimulationInput {
            capital: CapitalInput {
                infra_cost_per_unit: dec!(2700000),
                charger_cost_per_unit: dec!(600000),
                subsidy_per_unit: dec!(1800000),
                unit_count: 1,
            },
            investor_principal: dec!(2000000),
            phases: vec![
                PhaseDefinition {
                    label: "Interest".into(),
                    duration: PhaseDuration::Years(3),
                    rule: PayoutRule::InterestOnly {
                        annual_rate: dec!(0.05),
                    },
                },
                PhaseDefinition {
                    label: "Profit share".into(),
                    duration: PhaseDuration::Years(2),
                    rule: PayoutRule::ProfitShare { share: dec!(0.50) },
                },
            ],
            horizon: Horizon::Years(7),
            principal_repayment: Some(RepaymentTiming::Year(5)),
            operations: OperatingInput {
                promo_months: 6,
                promo_price: dec!(168),
                normal_price: dec!(288),
                daily_kwh_per_unit: dec!(20),
                energy_cost_per_kwh: dec!(150),
                grid_base_rate: dec!(2390),
                contracted_kw_per_unit: dec!(7),
                comm_fee_per_unit: Decimal::ZERO,
                maintenance_per_unit: dec!(10000),
                day_count: DayCount::AverageMonth,
            },
            discount_rate: dec!(0.05),
            currency: Currency::KRW,
        }
    }
}

// ---------------------------------------------------------------------------
// Validated configuration
// ---------------------------------------------------------------------------

/// Validated, immutable scenario with its derived quantities.
///
/// Built once per run by [`SimulationConfig::new`]; the engine only reads it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SimulationConfig {
    input: SimulationInput,
    phase_months: Vec<Months>,
    total_months: Months,
    repayment_month: Option<Months>,
    net_capex: Money,
    company_initial_outlay: Money,
    promo_financials: MonthlyFinancials,
    normal_financials: MonthlyFinancials,
}

impl SimulationConfig {
    /// Validate the input domain and derive capex, funding gap, phase lengths,
    /// horizon and repayment month.
    ///
    /// Inconsistent-but-computable scenarios (horizon shorter than the
    /// repayment schedule, repayment after the horizon) are accepted here and
    /// flagged by the engine.
    pub fn new(input: SimulationInput) -> EvWaterfallResult<Self> {
        validate_capital(&input.capital)?;
        validate_operations(&input.operations)?;

        if input.investor_principal < Decimal::ZERO || input.investor_principal > MAX_AMOUNT {
            return Err(EvWaterfallError::invalid(
                "investor_principal",
                format!("Investor principal must be between 0 and {MAX_AMOUNT}"),
            ));
        }
        if input.discount_rate < Decimal::ZERO || input.discount_rate > MAX_DISCOUNT_RATE {
            return Err(EvWaterfallError::invalid(
                "discount_rate",
                "Discount rate must be between 0 and 0.15",
            ));
        }

        let phase_months = validate_phases(&input.phases)?;
        let phase_total: Months = phase_months.iter().sum();

        let total_months = match input.horizon {
            Horizon::FromPhases => phase_total,
            Horizon::Months(m) => m,
            Horizon::Years(y) => y.checked_mul(12).ok_or_else(|| {
                EvWaterfallError::invalid("horizon", "Horizon in years is too large")
            })?,
        };
        if total_months == 0 || total_months > MAX_HORIZON_MONTHS {
            return Err(EvWaterfallError::invalid(
                "horizon",
                format!("Horizon must be between 1 and {MAX_HORIZON_MONTHS} months, got {total_months}"),
            ));
        }

        let repayment_month = match input.principal_repayment {
            None => None,
            Some(timing) => Some(resolve_repayment_month(timing, &input.phases, &phase_months)?),
        };
        if repayment_month.is_some()
            && input
                .phases
                .iter()
                .any(|p| matches!(p.rule, PayoutRule::AmortizingTarget { .. }))
        {
            return Err(EvWaterfallError::invalid(
                "principal_repayment",
                "A one-off principal repayment cannot be combined with an amortizing target phase",
            ));
        }

        let capital = &input.capital;
        let units = Decimal::from(capital.unit_count);
        let net_capex = capital
            .infra_cost_per_unit
            .checked_add(capital.charger_cost_per_unit)
            .and_then(|cost| cost.checked_sub(capital.subsidy_per_unit))
            .and_then(|cost| cost.checked_mul(units))
            .ok_or_else(|| EvWaterfallError::invalid("capital", "Net capex is out of range"))?;
        let company_initial_outlay = net_capex
            .checked_sub(input.investor_principal)
            .ok_or_else(|| EvWaterfallError::invalid("capital", "Funding gap is out of range"))?;

        let promo_financials = price_regime(PriceRegime::Promo, &input.operations, units)?;
        let normal_financials = price_regime(PriceRegime::Normal, &input.operations, units)?;

        Ok(SimulationConfig {
            input,
            phase_months,
            total_months,
            repayment_month,
            net_capex,
            company_initial_outlay,
            promo_financials,
            normal_financials,
        })
    }

    pub fn input(&self) -> &SimulationInput {
        &self.input
    }

    pub fn capital(&self) -> &CapitalInput {
        &self.input.capital
    }

    pub fn operations(&self) -> &OperatingInput {
        &self.input.operations
    }

    pub fn phases(&self) -> &[PhaseDefinition] {
        &self.input.phases
    }

    /// Length in months of each configured phase, in order.
    pub fn phase_months(&self) -> &[Months] {
        &self.phase_months
    }

    /// Sum of the configured phase durations.
    pub fn scheduled_months(&self) -> Months {
        self.phase_months.iter().sum()
    }

    pub fn total_months(&self) -> Months {
        self.total_months
    }

    pub fn investor_principal(&self) -> Money {
        self.input.investor_principal
    }

    pub fn unit_count(&self) -> Decimal {
        Decimal::from(self.input.capital.unit_count)
    }

    /// `(infra + charger - subsidy) * unit_count`
    pub fn net_capex(&self) -> Money {
        self.net_capex
    }

    /// `net_capex - investor_principal`; negative when the company starts with a surplus.
    pub fn company_initial_outlay(&self) -> Money {
        self.company_initial_outlay
    }

    /// Month carrying the one-off principal repayment, if configured.
    pub fn repayment_month(&self) -> Option<Months> {
        self.repayment_month
    }

    pub fn discount_rate(&self) -> Rate {
        self.input.discount_rate
    }

    /// Monthly figures under `regime`; every month with the same tariff is identical.
    pub fn financials(&self, regime: PriceRegime) -> &MonthlyFinancials {
        match regime {
            PriceRegime::Promo => &self.promo_financials,
            PriceRegime::Normal => &self.normal_financials,
        }
    }
}

fn price_regime(
    regime: PriceRegime,
    ops: &OperatingInput,
    units: Decimal,
) -> EvWaterfallResult<MonthlyFinancials> {
    price_month(regime, ops, units)
        .filter(|m| {
            m.revenue.abs() <= MAX_MONTHLY_AMOUNT && m.operating_expense.abs() <= MAX_MONTHLY_AMOUNT
        })
        .ok_or_else(|| {
            EvWaterfallError::invalid(
                "operations",
                format!("Monthly revenue and operating expense must not exceed {MAX_MONTHLY_AMOUNT}"),
            )
        })
}

fn validate_capital(capital: &CapitalInput) -> EvWaterfallResult<()> {
    let costs = [
        ("capital.infra_cost_per_unit", capital.infra_cost_per_unit),
        ("capital.charger_cost_per_unit", capital.charger_cost_per_unit),
        ("capital.subsidy_per_unit", capital.subsidy_per_unit),
    ];
    for (field, value) in costs {
        if value < Decimal::ZERO {
            return Err(EvWaterfallError::invalid(field, "Cost cannot be negative"));
        }
        if value > MAX_AMOUNT {
            return Err(EvWaterfallError::invalid(
                field,
                format!("Cost cannot exceed {MAX_AMOUNT}"),
            ));
        }
    }
    if capital.unit_count == 0 || capital.unit_count > MAX_UNIT_COUNT {
        return Err(EvWaterfallError::invalid(
            "capital.unit_count",
            format!("Between 1 and {MAX_UNIT_COUNT} chargers are required"),
        ));
    }
    Ok(())
}

fn validate_operations(ops: &OperatingInput) -> EvWaterfallResult<()> {
    if ops.promo_months > MAX_HORIZON_MONTHS {
        return Err(EvWaterfallError::invalid(
            "operations.promo_months",
            format!("Promotion cannot exceed {MAX_HORIZON_MONTHS} months"),
        ));
    }

    let values = [
        ("operations.promo_price", ops.promo_price),
        ("operations.normal_price", ops.normal_price),
        ("operations.daily_kwh_per_unit", ops.daily_kwh_per_unit),
        ("operations.energy_cost_per_kwh", ops.energy_cost_per_kwh),
        ("operations.grid_base_rate", ops.grid_base_rate),
        ("operations.contracted_kw_per_unit", ops.contracted_kw_per_unit),
        ("operations.comm_fee_per_unit", ops.comm_fee_per_unit),
        ("operations.maintenance_per_unit", ops.maintenance_per_unit),
    ];
    for (field, value) in values {
        if value < Decimal::ZERO {
            return Err(EvWaterfallError::invalid(field, "Value cannot be negative"));
        }
        if value > MAX_AMOUNT {
            return Err(EvWaterfallError::invalid(
                field,
                format!("Value cannot exceed {MAX_AMOUNT}"),
            ));
        }
    }
    Ok(())
}

fn validate_phases(phases: &[PhaseDefinition]) -> EvWaterfallResult<Vec<Months>> {
    if phases.is_empty() || phases.len() > MAX_PHASES {
        return Err(EvWaterfallError::invalid(
            "phases",
            format!("Between 1 and {MAX_PHASES} phases are required, got {}", phases.len()),
        ));
    }

    let mut months = Vec::with_capacity(phases.len());
    for (i, phase) in phases.iter().enumerate() {
        let m = phase.duration.months().ok_or_else(|| {
            EvWaterfallError::invalid(&format!("phases[{i}].duration"), "Duration is too large")
        })?;
        if m > MAX_HORIZON_MONTHS {
            return Err(EvWaterfallError::invalid(
                &format!("phases[{i}].duration"),
                format!("Phase cannot exceed {MAX_HORIZON_MONTHS} months"),
            ));
        }

        match &phase.rule {
            PayoutRule::InterestOnly { annual_rate } => {
                check_unit_interval(&format!("phases[{i}].annual_rate"), *annual_rate)?
            }
            PayoutRule::ProfitShare { share } => {
                check_unit_interval(&format!("phases[{i}].share"), *share)?
            }
            PayoutRule::AmortizingTarget { target_return, .. } => {
                if *target_return < Decimal::ZERO || *target_return > MAX_TARGET_RETURN {
                    return Err(EvWaterfallError::invalid(
                        &format!("phases[{i}].target_return"),
                        format!("Target return must be between 0 and {MAX_TARGET_RETURN}"),
                    ));
                }
            }
            PayoutRule::Exclusive => {}
        }
        months.push(m);
    }
    Ok(months)
}

fn check_unit_interval(field: &str, value: Rate) -> EvWaterfallResult<()> {
    if value < Decimal::ZERO || value > Decimal::ONE {
        return Err(EvWaterfallError::invalid(field, "Must be between 0 and 1"));
    }
    Ok(())
}

fn resolve_repayment_month(
    timing: RepaymentTiming,
    phases: &[PhaseDefinition],
    phase_months: &[Months],
) -> EvWaterfallResult<Months> {
    let month = match timing {
        RepaymentTiming::Month(m) => m,
        RepaymentTiming::Year(y) => y.checked_mul(12).unwrap_or(Months::MAX),
        RepaymentTiming::EndOfPhase(idx) => {
            if idx >= phases.len() {
                return Err(EvWaterfallError::invalid(
                    "principal_repayment",
                    format!("Phase index {idx} does not exist"),
                ));
            }
            phase_months[..=idx].iter().sum()
        }
    };
    if month == 0 {
        return Err(EvWaterfallError::invalid(
            "principal_repayment",
            "Repayment must fall in month 1 or later",
        ));
    }
    Ok(month)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_default_capex_and_surplus() {
        let config = SimulationConfig::new(SimulationInput::default()).unwrap();
        // 2,700,000 + 600,000 - 1,800,000 = 1,500,000
        assert_eq!(config.net_capex(), dec!(1500000));
        // Investor put in 2,000,000: company starts with a 500,000 surplus
        assert_eq!(config.company_initial_outlay(), dec!(-500000));
        assert_eq!(config.total_months(), 84);
        assert_eq!(config.phase_months(), &[36, 24]);
        assert_eq!(config.repayment_month(), Some(60));
    }

    #[test]
    fn test_horizon_from_phases() {
        let mut input = SimulationInput::default();
        input.horizon = Horizon::FromPhases;
        let config = SimulationConfig::new(input).unwrap();
        assert_eq!(config.total_months(), 60);
    }

    #[test]
    fn test_end_of_phase_repayment() {
        let mut input = SimulationInput::default();
        input.principal_repayment = Some(RepaymentTiming::EndOfPhase(0));
        let config = SimulationConfig::new(input).unwrap();
        assert_eq!(config.repayment_month(), Some(36));
    }

    #[test]
    fn test_zero_units_rejected() {
        let mut input = SimulationInput::default();
        input.capital.unit_count = 0;
        match SimulationConfig::new(input).unwrap_err() {
            EvWaterfallError::InvalidInput { field, .. } => assert_eq!(field, "capital.unit_count"),
            other => panic!("Expected InvalidInput, got: {other:?}"),
        }
    }

    #[test]
    fn test_negative_cost_rejected() {
        let mut input = SimulationInput::default();
        input.operations.maintenance_per_unit = dec!(-1);
        assert!(SimulationConfig::new(input).is_err());
    }

    #[test]
    fn test_too_many_phases_rejected() {
        let mut input = SimulationInput::default();
        let extra = input.phases[0].clone();
        input.phases.push(extra.clone());
        input.phases.push(extra);
        assert!(SimulationConfig::new(input).is_err());
    }

    #[test]
    fn test_no_phases_rejected() {
        let mut input = SimulationInput::default();
        input.phases.clear();
        assert!(SimulationConfig::new(input).is_err());
    }

    #[test]
    fn test_discount_rate_range() {
        let mut input = SimulationInput::default();
        input.discount_rate = dec!(0.20);
        assert!(SimulationConfig::new(input).is_err());
    }

    #[test]
    fn test_horizon_bounds() {
        let mut input = SimulationInput::default();
        input.horizon = Horizon::Years(21);
        assert!(SimulationConfig::new(input.clone()).is_err());
        input.horizon = Horizon::Months(0);
        assert!(SimulationConfig::new(input).is_err());
    }

    #[test]
    fn test_share_out_of_range_rejected() {
        let mut input = SimulationInput::default();
        input.phases[1].rule = PayoutRule::ProfitShare { share: dec!(1.5) };
        assert!(SimulationConfig::new(input).is_err());
    }

    #[test]
    fn test_repayment_with_amortizing_target_rejected() {
        let mut input = SimulationInput::default();
        input.phases[1].rule = PayoutRule::AmortizingTarget {
            target_return: dec!(0.20),
            net_of_prior_interest: true,
        };
        assert!(SimulationConfig::new(input).is_err());
    }

    #[test]
    fn test_repayment_at_missing_phase_rejected() {
        let mut input = SimulationInput::default();
        input.principal_repayment = Some(RepaymentTiming::EndOfPhase(5));
        assert!(SimulationConfig::new(input).is_err());
    }

    #[test]
    fn test_repayment_after_horizon_is_accepted() {
        let mut input = SimulationInput::default();
        input.principal_repayment = Some(RepaymentTiming::Year(10));
        let config = SimulationConfig::new(input).unwrap();
        assert_eq!(config.repayment_month(), Some(120));
    }

    #[test]
    fn test_duration_json_forms() {
        let months: PhaseDuration = serde_json::from_str(r#"{"months": 18}"#).unwrap();
        let years: PhaseDuration = serde_json::from_str(r#"{"years": 2}"#).unwrap();
        assert_eq!(months.months(), Some(18));
        assert_eq!(years.months(), Some(24));
    }

    #[test]
    fn test_promotion_longer_than_max_horizon_rejected() {
        let mut input = SimulationInput::default();
        input.operations.promo_months = u32::MAX;
        match SimulationConfig::new(input).unwrap_err() {
            EvWaterfallError::InvalidInput { field, .. } => {
                assert_eq!(field, "operations.promo_months")
            }
            other => panic!("Expected InvalidInput, got: {other:?}"),
        }
    }

    #[test]
    fn test_promotion_covering_whole_horizon_accepted() {
        let mut input = SimulationInput::default();
        input.operations.promo_months = MAX_HORIZON_MONTHS;
        let config = SimulationConfig::new(input).unwrap();
        assert_eq!(config.financials(PriceRegime::Promo).revenue, dec!(102200));
    }

    #[test]
    fn test_oversized_capital_rejected_without_overflow() {
        let mut input = SimulationInput::default();
        input.capital.infra_cost_per_unit = dec!(100000000000000000000);
        input.capital.unit_count = 4_000_000_000;
        assert!(matches!(
            SimulationConfig::new(input).unwrap_err(),
            EvWaterfallError::InvalidInput { .. }
        ));
    }

    #[test]
    fn test_unit_count_cap() {
        let mut input = SimulationInput::default();
        input.capital.unit_count = MAX_UNIT_COUNT + 1;
        match SimulationConfig::new(input).unwrap_err() {
            EvWaterfallError::InvalidInput { field, .. } => assert_eq!(field, "capital.unit_count"),
            other => panic!("Expected InvalidInput, got: {other:?}"),
        }
    }

    #[test]
    fn test_overflowing_monthly_revenue_rejected() {
        let mut input = SimulationInput::default();
        input.capital.unit_count = MAX_UNIT_COUNT;
        input.operations.daily_kwh_per_unit = MAX_AMOUNT;
        input.operations.normal_price = MAX_AMOUNT;
        match SimulationConfig::new(input).unwrap_err() {
            EvWaterfallError::InvalidInput { field, .. } => assert_eq!(field, "operations"),
            other => panic!("Expected InvalidInput, got: {other:?}"),
        }
    }

    #[test]
    fn test_oversized_principal_and_target_rejected() {
        let mut input = SimulationInput::default();
        input.investor_principal = MAX_AMOUNT + Decimal::ONE;
        assert!(SimulationConfig::new(input).is_err());

        let mut input = SimulationInput::default();
        input.principal_repayment = None;
        input.phases[1].rule = PayoutRule::AmortizingTarget {
            target_return: MAX_TARGET_RETURN + Decimal::ONE,
            net_of_prior_interest: true,
        };
        assert!(SimulationConfig::new(input).is_err());
    }

    #[test]
    fn test_payout_rule_json_forms() {
        let exclusive: PayoutRule = serde_json::from_str(r#""exclusive""#).unwrap();
        assert_eq!(exclusive, PayoutRule::Exclusive);

        let target: PayoutRule =
            serde_json::from_str(r#"{"amortizing_target": {"target_return": "0.2"}}"#).unwrap();
        assert_eq!(
            target,
            PayoutRule::AmortizingTarget {
                target_return: dec!(0.2),
                net_of_prior_interest: true,
            }
        );

        let interest = serde_json::to_value(PayoutRule::InterestOnly {
            annual_rate: dec!(0.05),
        })
        .unwrap();
        assert_eq!(interest, serde_json::json!({ "interest_only": { "annual_rate": "0.05" } }));

        let day_count: DayCount = serde_json::from_str(r#""thirty_day""#).unwrap();
        assert_eq!(day_count, DayCount::ThirtyDay);
    }

    #[test]
    fn test_negative_duration_fails_to_parse() {
        let parsed: Result<PhaseDuration, _> = serde_json::from_str(r#"{"months": -3}"#);
        assert!(parsed.is_err());
    }
}
