use log::{debug, warn};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use super::config::{PayoutRule, SimulationConfig};
use super::phases::{PhaseSchedule, PhaseSummary};
use super::revenue::{monthly_financials, PriceRegime};
use crate::types::*;

/// Unpaid obligations below this amount count as settled.
pub const SETTLEMENT_TOLERANCE: Money = dec!(0.01);

pub const NOTE_PRINCIPAL_REPAYMENT: &str = "principal repayment";
pub const NOTE_EXCLUSIVE_BEGINS: &str = "exclusive phase begins";

// ---------------------------------------------------------------------------
// Output types
// ---------------------------------------------------------------------------

/// One simulated month. Field order is the CSV column order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LedgerRow {
    pub month: Months,
    pub year: u32,
    pub month_in_year: u32,
    pub phase: String,
    pub revenue: Money,
    pub operating_expense: Money,
    pub operating_profit: Money,
    pub investor_flow: Money,
    pub company_flow: Money,
    pub cumulative_company_balance: Money,
    pub price_regime: PriceRegime,
    /// Principal moved from company to investor this month
    pub principal_transfer: Money,
    pub note: Option<String>,
}

/// What the investor was owed under fixed-payment rules and what was paid.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InvestorSettlement {
    pub principal: Money,
    /// Interest, amortizing instalments and one-off principal owed over the full schedule
    pub contracted_total: Money,
    /// Portion of `contracted_total` paid within the horizon
    pub contracted_paid: Money,
    /// Profit-share payouts received (contingent, not part of the contract total)
    pub profit_share_paid: Money,
    /// Everything the investor received over the horizon
    pub total_received: Money,
    /// `contracted_total - contracted_paid`, floored at zero
    pub shortfall: Money,
}

/// Company balance and operating highlights.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationSummary {
    pub net_capex: Money,
    pub company_initial_outlay: Money,
    pub total_months: Months,
    /// Sum of the configured phase durations
    pub scheduled_months: Months,
    /// Months after the last investor obligation (negative when the horizon cuts the schedule)
    pub debt_free_months: i64,
    /// Operating profit in a promotional month, when a promotion runs
    pub promo_operating_profit: Option<Money>,
    pub normal_operating_profit: Money,
    pub final_company_balance: Money,
    pub minimum_company_balance: Money,
    pub minimum_balance_month: Months,
    /// First month the balance is back at or above zero after its minimum, when it went negative
    pub recovery_month: Option<Months>,
}

/// Advisory status flags. None of them stop a run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SimulationFlags {
    /// Contracted investor payouts remain unpaid at the horizon
    pub debt_outstanding_at_horizon: bool,
    /// Company cumulative balance dips below zero at some month
    pub negative_minimum_balance: bool,
    /// The one-off principal repayment falls after the horizon and never happens
    pub repayment_after_horizon: bool,
    /// The horizon ends before the last investor obligation
    pub horizon_truncates_schedule: bool,
}

/// Everything one pass of the waterfall produces.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationRun {
    pub ledger: Vec<LedgerRow>,
    pub investor_cash_flows: CashFlowSeries,
    pub company_cash_flows: CashFlowSeries,
    pub phases: Vec<PhaseSummary>,
    pub settlement: InvestorSettlement,
    pub summary: SimulationSummary,
    pub flags: SimulationFlags,
    pub warnings: Vec<String>,
}

// ---------------------------------------------------------------------------
// Engine
// ---------------------------------------------------------------------------

/// Run the monthly waterfall for `config.total_months()` months.
///
/// Each month depends only on the static configuration and its own index;
/// the cumulative company balance is the only running state. The company
/// balance is seeded with the negated initial outlay, so a funding surplus
/// starts it positive.
pub fn run(config: &SimulationConfig) -> SimulationRun {
    let schedule = PhaseSchedule::new(config);
    let total_months = config.total_months();
    let principal = config.investor_principal();
    let repayment_month = config.repayment_month();
    let seed = -config.company_initial_outlay();

    let mut ledger = Vec::with_capacity(total_months as usize);
    let mut investor_flows = Vec::with_capacity(total_months as usize + 1);
    let mut company_flows = Vec::with_capacity(total_months as usize + 1);
    investor_flows.push(-principal);
    company_flows.push(seed);

    let mut balance = seed;
    let mut current_phase: Option<usize> = None;
    let mut contracted_paid = Decimal::ZERO;
    let mut profit_share_paid = Decimal::ZERO;

    for month in 1..=total_months {
        let financials = monthly_financials(month, config);
        let phase = schedule.active_phase(month);
        let mut notes: Vec<&str> = Vec::new();

        if current_phase != Some(phase.index) {
            debug!("month {month}: entering phase '{}'", phase.label);
            if current_phase.is_some() && phase.rule == PayoutRule::Exclusive {
                notes.push(NOTE_EXCLUSIVE_BEGINS);
            }
            current_phase = Some(phase.index);
        }

        let payout = phase.investor_payout(financials.operating_profit);
        match phase.rule {
            PayoutRule::ProfitShare { .. } => profit_share_paid += payout,
            _ => contracted_paid += payout,
        }

        let principal_transfer = if repayment_month == Some(month) {
            debug!("month {month}: principal of {principal} repaid to investor");
            notes.push(NOTE_PRINCIPAL_REPAYMENT);
            contracted_paid += principal;
            principal
        } else {
            Decimal::ZERO
        };

        let investor_flow = payout + principal_transfer;
        let company_flow = financials.operating_profit - payout - principal_transfer;
        balance += company_flow;

        investor_flows.push(investor_flow);
        company_flows.push(company_flow);
        ledger.push(LedgerRow {
            month,
            year: (month - 1) / 12 + 1,
            month_in_year: (month - 1) % 12 + 1,
            phase: phase.label.clone(),
            revenue: financials.revenue,
            operating_expense: financials.operating_expense,
            operating_profit: financials.operating_profit,
            investor_flow,
            company_flow,
            cumulative_company_balance: balance,
            price_regime: financials.price_regime,
            principal_transfer,
            note: if notes.is_empty() {
                None
            } else {
                Some(notes.join("; "))
            },
        });
    }

    let contracted_total = schedule.contracted_total()
        + if repayment_month.is_some() {
            principal
        } else {
            Decimal::ZERO
        };
    let settlement = InvestorSettlement {
        principal,
        contracted_total,
        contracted_paid,
        profit_share_paid,
        total_received: contracted_paid + profit_share_paid,
        shortfall: (contracted_total - contracted_paid).max(Decimal::ZERO),
    };

    let obligation_end = schedule
        .obligation_end_month()
        .max(repayment_month.unwrap_or(0));
    let summary = summarise(config, &ledger, obligation_end);

    let mut flags = SimulationFlags::default();
    let mut warnings = Vec::new();

    if obligation_end > total_months {
        flags.horizon_truncates_schedule = true;
        warnings.push(format!(
            "Investor schedule runs to month {obligation_end} but the horizon ends at month \
             {total_months}; {} months of payouts are cut off",
            obligation_end - total_months
        ));
    }
    if let Some(month) = repayment_month.filter(|m| *m > total_months) {
        flags.repayment_after_horizon = true;
        warnings.push(format!(
            "Principal repayment at month {month} falls after the {total_months}-month horizon \
             and is never made"
        ));
    }
    for phase in schedule.unfunded_targets() {
        warnings.push(format!(
            "Phase '{}' has zero length; its target of {} is never paid",
            phase.label,
            phase.contracted_total.normalize()
        ));
    }
    if settlement.shortfall > SETTLEMENT_TOLERANCE {
        flags.debt_outstanding_at_horizon = true;
        warnings.push(format!(
            "Investor obligations not fully repaid by the end of the horizon: {} of {} outstanding",
            settlement.shortfall.normalize(),
            settlement.contracted_total.normalize()
        ));
    }
    if summary.minimum_company_balance < Decimal::ZERO {
        flags.negative_minimum_balance = true;
        warnings.push(format!(
            "Company cumulative balance falls to {} at month {}",
            summary.minimum_company_balance.normalize(),
            summary.minimum_balance_month
        ));
    }
    for w in &warnings {
        warn!("{w}");
    }

    SimulationRun {
        ledger,
        investor_cash_flows: CashFlowSeries::new(Party::Investor, investor_flows),
        company_cash_flows: CashFlowSeries::new(Party::Company, company_flows),
        phases: schedule.summaries(total_months),
        settlement,
        summary,
        flags,
        warnings,
    }
}

fn summarise(
    config: &SimulationConfig,
    ledger: &[LedgerRow],
    obligation_end: Months,
) -> SimulationSummary {
    let seed = -config.company_initial_outlay();
    let total_months = config.total_months();

    let (minimum_balance_month, minimum_company_balance) = ledger
        .iter()
        .map(|row| (row.month, row.cumulative_company_balance))
        .fold((0, seed), |min, (month, bal)| if bal < min.1 { (month, bal) } else { min });

    let recovery_month = if minimum_company_balance < Decimal::ZERO {
        ledger
            .iter()
            .skip_while(|row| row.month <= minimum_balance_month)
            .find(|row| row.cumulative_company_balance >= Decimal::ZERO)
            .map(|row| row.month)
    } else {
        None
    };

    let promo_operating_profit = (config.operations().promo_months > 0)
        .then(|| config.financials(PriceRegime::Promo).operating_profit);
    let normal_operating_profit = config.financials(PriceRegime::Normal).operating_profit;

    SimulationSummary {
        net_capex: config.net_capex(),
        company_initial_outlay: config.company_initial_outlay(),
        total_months,
        scheduled_months: config.scheduled_months(),
        debt_free_months: i64::from(total_months) - i64::from(obligation_end),
        promo_operating_profit,
        normal_operating_profit,
        final_company_balance: ledger
            .last()
            .map(|row| row.cumulative_company_balance)
            .unwrap_or(seed),
        minimum_company_balance,
        minimum_balance_month,
        recovery_month,
    }
}
