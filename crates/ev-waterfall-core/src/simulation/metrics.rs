use std::time::Instant;

use log::debug;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::error::EvWaterfallError;
use crate::time_value::{annualize_monthly_rate, irr, monthly_rate, npv};
use crate::types::*;
use crate::EvWaterfallResult;

const IRR_GUESS: Rate = dec!(0.01);

/// IRR result. A failed solve is reported, not raised.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum IrrOutcome {
    Converged {
        /// Per-month rate of the monthly series
        monthly: Rate,
        /// `(1 + monthly)^12 - 1`
        annual: Rate,
    },
    NotConverged {
        reason: String,
    },
}

impl IrrOutcome {
    /// Annual IRR, or zero when the solve failed.
    pub fn annual_or_zero(&self) -> Rate {
        match self {
            IrrOutcome::Converged { annual, .. } => *annual,
            IrrOutcome::NotConverged { .. } => Decimal::ZERO,
        }
    }

    pub fn is_converged(&self) -> bool {
        matches!(self, IrrOutcome::Converged { .. })
    }
}

/// Return metrics for one party's monthly cash-flow series.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FinancialMetrics {
    /// `-flows[0]`, positive when the party paid in at time 0
    pub initial_investment: Money,
    /// Undiscounted sum of all flows
    pub total_net_flow: Money,
    /// Discounted at `discount_rate / 12` per month
    pub npv: Money,
    pub irr: IrrOutcome,
    /// `total_net_flow / initial_investment * 100`, zero when nothing was invested
    pub roi_pct: Decimal,
}

/// NPV, IRR and ROI of a monthly series discounted at an annual rate.
///
/// NPV uses the simple monthly rate `annual / 12`. IRR is solved per month and
/// compounded to an annual figure. IRR failures (no sign change, divergence)
/// land in [`IrrOutcome::NotConverged`] so the other metrics still come back.
pub fn evaluate(series: &CashFlowSeries, discount_rate_annual: Rate) -> EvWaterfallResult<FinancialMetrics> {
    if series.is_empty() {
        return Err(EvWaterfallError::InsufficientData(format!(
            "{:?} cash-flow series is empty",
            series.party
        )));
    }

    let flows = series.as_slice();
    let npv_value = npv(monthly_rate(discount_rate_annual), flows)?;

    let irr_outcome = match irr(flows, IRR_GUESS) {
        Ok(monthly) => match annualize_monthly_rate(monthly) {
            Ok(annual) => IrrOutcome::Converged { monthly, annual },
            Err(e) => IrrOutcome::NotConverged { reason: e.to_string() },
        },
        Err(e) => {
            debug!("{:?} IRR not available: {e}", series.party);
            IrrOutcome::NotConverged { reason: e.to_string() }
        }
    };

    let initial_investment = series.initial_investment();
    let total_net_flow = series.total();
    let roi_pct = if initial_investment > Decimal::ZERO {
        total_net_flow / initial_investment * dec!(100)
    } else {
        Decimal::ZERO
    };

    Ok(FinancialMetrics {
        initial_investment,
        total_net_flow,
        npv: npv_value,
        irr: irr_outcome,
        roi_pct,
    })
}

/// A standalone monthly series to score.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricsInput {
    /// Index 0 is the time of investment, index k is month k
    pub cash_flows: Vec<Money>,
    /// Annual discount rate, applied monthly as `discount_rate / 12`
    pub discount_rate: Rate,
    #[serde(default = "default_party")]
    pub party: Party,
}

fn default_party() -> Party {
    Party::Investor
}

/// Score an arbitrary monthly series, wrapped in the standard envelope.
pub fn analyze_cash_flows(input: &MetricsInput) -> EvWaterfallResult<ComputationOutput<FinancialMetrics>> {
    let start = Instant::now();

    if input.discount_rate < Decimal::ZERO {
        return Err(EvWaterfallError::InvalidInput {
            field: "discount_rate".into(),
            reason: "Discount rate cannot be negative".into(),
        });
    }

    let series = CashFlowSeries::new(input.party, input.cash_flows.clone());
    let metrics = evaluate(&series, input.discount_rate)?;

    let mut warnings = Vec::new();
    if let IrrOutcome::NotConverged { reason } = &metrics.irr {
        warnings.push(format!("IRR not available: {reason}"));
    }
    if metrics.initial_investment <= Decimal::ZERO {
        warnings.push("No initial investment at index 0; ROI reported as 0".into());
    }

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "Monthly cash-flow metrics (NPV, IRR, ROI)",
        &serde_json::json!({
            "periods": input.cash_flows.len(),
            "discount_rate": input.discount_rate.to_string(),
            "npv_monthly_rate": "discount_rate / 12",
            "irr_annualisation": "(1 + monthly)^12 - 1",
        }),
        warnings,
        elapsed,
        metrics,
    ))
}
