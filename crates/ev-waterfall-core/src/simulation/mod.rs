//! Monthly investment waterfall for a subsidised EV-charging deployment.
//!
//! [`config`] validates a scenario, [`revenue`] prices each month,
//! [`phases`] maps months to payout rules, [`engine`] splits operating profit
//! between investor and company, and [`metrics`] scores each party's series.

pub mod config;
pub mod engine;
#[cfg(feature = "export")]
pub mod export;
pub mod metrics;
pub mod phases;
pub mod presets;
pub mod revenue;

use std::time::Instant;

use serde::{Deserialize, Serialize};

use crate::types::*;
use crate::EvWaterfallResult;

pub use config::{SimulationConfig, SimulationInput};
pub use engine::{InvestorSettlement, LedgerRow, SimulationFlags, SimulationRun, SimulationSummary};
pub use metrics::{FinancialMetrics, IrrOutcome};
pub use phases::PhaseSummary;
pub use presets::Preset;

/// Result of a full scenario run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimulationOutput {
    pub summary: SimulationSummary,
    pub settlement: InvestorSettlement,
    pub flags: SimulationFlags,
    pub phases: Vec<PhaseSummary>,
    pub investor_metrics: FinancialMetrics,
    pub company_metrics: FinancialMetrics,
    pub ledger: Vec<LedgerRow>,
}

/// Validate `input`, run the waterfall and evaluate both parties.
pub fn simulate(input: &SimulationInput) -> EvWaterfallResult<ComputationOutput<SimulationOutput>> {
    let start = Instant::now();

    let config = SimulationConfig::new(input.clone())?;
    let run = engine::run(&config);

    let investor_metrics = metrics::evaluate(&run.investor_cash_flows, config.discount_rate())?;
    let company_metrics = metrics::evaluate(&run.company_cash_flows, config.discount_rate())?;

    let mut warnings = run.warnings;
    if let metrics::IrrOutcome::NotConverged { reason } = &investor_metrics.irr {
        warnings.push(format!("Investor IRR not available: {reason}"));
    }
    if let metrics::IrrOutcome::NotConverged { reason } = &company_metrics.irr {
        warnings.push(format!("Company IRR not available: {reason}"));
    }

    let output = SimulationOutput {
        summary: run.summary,
        settlement: run.settlement,
        flags: run.flags,
        phases: run.phases,
        investor_metrics,
        company_metrics,
        ledger: run.ledger,
    };

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "EV charging investment waterfall (monthly, phase-based payout)",
        &serde_json::json!({
            "net_capex": config.net_capex().to_string(),
            "investor_principal": config.investor_principal().to_string(),
            "unit_count": config.capital().unit_count,
            "num_phases": config.phases().len(),
            "total_months": config.total_months(),
            "discount_rate": config.discount_rate().to_string(),
            "npv_monthly_rate": "discount_rate / 12",
            "currency": input.currency,
        }),
        warnings,
        elapsed,
        output,
    ))
}
