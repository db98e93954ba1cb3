use clap::{Args, ValueEnum};
use rust_decimal::Decimal;
use serde_json::Value;

use ev_waterfall_core::simulation::metrics::{self, MetricsInput};
use ev_waterfall_core::Party;

use crate::input;

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum PartyArg {
    Investor,
    Company,
}

impl From<PartyArg> for Party {
    fn from(arg: PartyArg) -> Self {
        match arg {
            PartyArg::Investor => Party::Investor,
            PartyArg::Company => Party::Company,
        }
    }
}

/// Arguments for scoring a monthly cash-flow series
#[derive(Args)]
pub struct MetricsArgs {
    /// Path to a JSON or YAML file with `cash_flows` and `discount_rate`
    #[arg(long)]
    pub input: Option<String>,

    /// Monthly cash flows, index 0 first (comma-separated, e.g. "-100,30,30,50")
    #[arg(long, value_delimiter = ',', allow_hyphen_values = true)]
    pub cash_flows: Option<Vec<Decimal>>,

    /// Annual discount rate, applied monthly as rate / 12
    #[arg(long, default_value = "0.05")]
    pub discount_rate: Decimal,

    /// Whose series this is (labels the result only)
    #[arg(long, value_enum, default_value = "investor")]
    pub party: PartyArg,
}

pub fn run_metrics(args: MetricsArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let metrics_input: MetricsInput = if let Some(ref path) = args.input {
        input::file::read_input(path)?
    } else if let Some(flows) = args.cash_flows {
        MetricsInput {
            cash_flows: flows,
            discount_rate: args.discount_rate,
            party: args.party.into(),
        }
    } else if let Some(data) = input::stdin::read_stdin()? {
        data
    } else {
        return Err("--cash-flows is required (or provide --input / stdin)".into());
    };

    let result = metrics::analyze_cash_flows(&metrics_input)?;
    Ok(serde_json::to_value(result)?)
}
