use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use super::config::{PayoutRule, SimulationConfig};
use crate::types::*;

const MONTHS_PER_YEAR: Decimal = dec!(12);

/// Label used for the open-ended phase appended after the configured ones.
pub const TERMINAL_PHASE_LABEL: &str = "Exclusive";

impl PayoutRule {
    /// Investor payout for one month of this rule.
    ///
    /// `fixed_payout` is the precomputed constant for interest-only and
    /// amortizing rules; it is ignored by the others.
    pub fn investor_payout(&self, operating_profit: Money, fixed_payout: Money) -> Money {
        match self {
            PayoutRule::InterestOnly { .. } | PayoutRule::AmortizingTarget { .. } => fixed_payout,
            PayoutRule::ProfitShare { share } => {
                (operating_profit.max(Decimal::ZERO) * share).round_dp(MONEY_DP)
            }
            PayoutRule::Exclusive => Decimal::ZERO,
        }
    }

    /// One-line description for phase tables.
    pub fn describe(&self) -> String {
        match self {
            PayoutRule::InterestOnly { annual_rate } => {
                format!("Interest at {}% p.a. on principal", as_pct(*annual_rate))
            }
            PayoutRule::ProfitShare { share } => {
                format!("{}% of positive operating profit to investor", as_pct(*share))
            }
            PayoutRule::AmortizingTarget {
                target_return,
                net_of_prior_interest,
            } => {
                let basis = if *net_of_prior_interest {
                    "net of earlier interest"
                } else {
                    "on top of earlier interest"
                };
                format!(
                    "Equal instalments to {}% of principal, {basis}",
                    as_pct(Decimal::ONE + target_return)
                )
            }
            PayoutRule::Exclusive => "Company keeps 100% of operating profit".into(),
        }
    }
}

fn as_pct(rate: Rate) -> Decimal {
    (rate * dec!(100)).normalize()
}

/// A phase placed on the month axis.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScheduledPhase {
    /// Position in the configured list; the implicit terminal phase takes the next index
    pub index: usize,
    pub label: String,
    pub rule: PayoutRule,
    /// First month of the phase (1-based)
    pub start_month: Months,
    /// Last month of the phase, `None` for the open-ended terminal phase
    pub end_month: Option<Months>,
    /// Configured length (0 for the implicit terminal phase)
    pub months: Months,
    /// Constant monthly investor payout, `None` when it depends on operating profit
    pub fixed_payout: Option<Money>,
    /// Amount the investor is owed over the full phase (fixed-payment rules only)
    pub contracted_total: Money,
    /// Whether this phase was appended rather than configured
    pub implicit: bool,
}

impl ScheduledPhase {
    pub fn contains(&self, month: Months) -> bool {
        month >= self.start_month && self.end_month.map_or(true, |end| month <= end)
    }

    pub fn investor_payout(&self, operating_profit: Money) -> Money {
        self.rule
            .investor_payout(operating_profit, self.fixed_payout.unwrap_or(Decimal::ZERO))
    }
}

/// Row of the phase table reported with each run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PhaseSummary {
    pub label: String,
    pub start_month: Months,
    /// Last month the phase is active within the horizon
    pub end_month: Months,
    /// Configured length (horizon remainder for the terminal phase)
    pub scheduled_months: Months,
    /// Months actually simulated in this phase
    pub active_months: Months,
    pub monthly_payout: Option<Money>,
    pub contracted_total: Money,
    pub description: String,
}

/// Maps elapsed months to financing phases.
///
/// Phase i is active while `cum[i-1] < month <= cum[i]`. The last phase is
/// always an open-ended exclusive phase: either the configured final phase
/// when it is `Exclusive`, or an implicit one starting after the configured
/// phases end.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PhaseSchedule {
    phases: Vec<ScheduledPhase>,
}

impl PhaseSchedule {
    pub fn new(config: &SimulationConfig) -> Self {
        let principal = config.investor_principal();
        let definitions = config.phases();
        let mut phases = Vec::with_capacity(definitions.len() + 1);
        let mut cumulative: Months = 0;
        let mut prior_interest = Decimal::ZERO;

        for (index, (def, &months)) in definitions.iter().zip(config.phase_months()).enumerate() {
            let start_month = cumulative + 1;
            cumulative += months;
            let month_count = Decimal::from(months);

            // A zero-length phase pays nothing.
            let (fixed_payout, contracted_total) = match &def.rule {
                PayoutRule::InterestOnly { annual_rate } => {
                    let monthly = if months == 0 {
                        Decimal::ZERO
                    } else {
                        (principal * annual_rate / MONTHS_PER_YEAR).round_dp(MONEY_DP)
                    };
                    let total = monthly * month_count;
                    prior_interest += total;
                    (Some(monthly), total)
                }
                PayoutRule::AmortizingTarget {
                    target_return,
                    net_of_prior_interest,
                } => {
                    let target = principal * (Decimal::ONE + target_return);
                    let remaining = if *net_of_prior_interest {
                        (target - prior_interest).max(Decimal::ZERO)
                    } else {
                        target
                    };
                    // The unmet target of a zero-length phase stays visible through
                    // `contracted_total`.
                    let monthly = if months == 0 {
                        Decimal::ZERO
                    } else {
                        (remaining / month_count).round_dp(MONEY_DP)
                    };
                    (Some(monthly), remaining)
                }
                PayoutRule::ProfitShare { .. } => (None, Decimal::ZERO),
                PayoutRule::Exclusive => (Some(Decimal::ZERO), Decimal::ZERO),
            };

            phases.push(ScheduledPhase {
                index,
                label: def.label.clone(),
                rule: def.rule.clone(),
                start_month,
                end_month: Some(cumulative),
                months,
                fixed_payout,
                contracted_total,
                implicit: false,
            });
        }

        let ends_exclusive = phases
            .last()
            .is_some_and(|p: &ScheduledPhase| p.rule == PayoutRule::Exclusive);
        if ends_exclusive {
            if let Some(last) = phases.last_mut() {
                last.end_month = None;
            }
        } else {
            phases.push(ScheduledPhase {
                index: definitions.len(),
                label: TERMINAL_PHASE_LABEL.into(),
                rule: PayoutRule::Exclusive,
                start_month: cumulative + 1,
                end_month: None,
                months: 0,
                fixed_payout: Some(Decimal::ZERO),
                contracted_total: Decimal::ZERO,
                implicit: true,
            });
        }

        PhaseSchedule { phases }
    }

    /// Phase governing `month`. Zero-length phases are never returned.
    pub fn active_phase(&self, month: Months) -> &ScheduledPhase {
        self.phases
            .iter()
            .find(|p| p.months > 0 && p.contains(month))
            .unwrap_or_else(|| self.terminal())
    }

    /// The open-ended exclusive phase.
    pub fn terminal(&self) -> &ScheduledPhase {
        &self.phases[self.phases.len() - 1]
    }

    pub fn phases(&self) -> &[ScheduledPhase] {
        &self.phases
    }

    /// Sum of fixed-payment obligations across all configured phases,
    /// regardless of where the horizon ends.
    pub fn contracted_total(&self) -> Money {
        self.phases.iter().map(|p| p.contracted_total).sum()
    }

    /// Last month in which a configured phase still pays the investor.
    pub fn obligation_end_month(&self) -> Months {
        self.phases
            .iter()
            .filter(|p| p.rule.pays_investor() && p.months > 0)
            .filter_map(|p| p.end_month)
            .max()
            .unwrap_or(0)
    }

    /// Zero-length amortizing phases whose target can never be paid.
    pub fn unfunded_targets(&self) -> impl Iterator<Item = &ScheduledPhase> {
        self.phases.iter().filter(|p| {
            p.months == 0
                && matches!(p.rule, PayoutRule::AmortizingTarget { .. })
                && p.contracted_total > Decimal::ZERO
        })
    }

    /// Phase table clipped to a horizon of `total_months`.
    pub fn summaries(&self, total_months: Months) -> Vec<PhaseSummary> {
        self.phases
            .iter()
            .filter(|p| !p.implicit || p.start_month <= total_months)
            .map(|p| {
                let last = p.end_month.unwrap_or(total_months).min(total_months);
                let active_months = (last + 1).saturating_sub(p.start_month);
                let scheduled_months = match p.end_month {
                    Some(_) => p.months,
                    None => (total_months + 1).saturating_sub(p.start_month).max(p.months),
                };
                PhaseSummary {
                    label: p.label.clone(),
                    start_month: p.start_month,
                    end_month: last.max(p.start_month.saturating_sub(1)),
                    scheduled_months,
                    active_months,
                    monthly_payout: p.fixed_payout,
                    contracted_total: p.contracted_total,
                    description: p.rule.describe(),
                }
            })
            .collect()
    }
}
