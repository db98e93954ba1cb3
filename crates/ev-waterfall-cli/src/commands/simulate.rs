use clap::{Args, ValueEnum};
use rust_decimal::Decimal;
use serde_json::{json, Value};
use std::fs::File;
use std::io::BufWriter;

use ev_waterfall_core::simulation::config::{Horizon, SimulationInput};
use ev_waterfall_core::simulation::export::write_ledger_csv;
use ev_waterfall_core::simulation::{self, Preset};

use crate::input;

/// Built-in scenarios selectable with `--preset`
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum PresetArg {
    InterestShareRepay,
    AssembledPhases,
    TargetReturn,
    TargetOnTop,
}

impl From<PresetArg> for Preset {
    fn from(arg: PresetArg) -> Self {
        match arg {
            PresetArg::InterestShareRepay => Preset::InterestShareRepay,
            PresetArg::AssembledPhases => Preset::AssembledPhases,
            PresetArg::TargetReturn => Preset::TargetReturn,
            PresetArg::TargetOnTop => Preset::TargetOnTop,
        }
    }
}

/// Arguments for a waterfall simulation
#[derive(Args)]
pub struct SimulateArgs {
    /// Path to a JSON or YAML scenario file (overrides --preset and stdin)
    #[arg(long)]
    pub input: Option<String>,

    /// Start from a built-in scenario (overrides a document piped on stdin)
    #[arg(long, value_enum)]
    pub preset: Option<PresetArg>,

    /// Simulation horizon in years (overrides the scenario horizon)
    #[arg(long)]
    pub years: Option<u32>,

    /// Number of chargers installed
    #[arg(long)]
    pub units: Option<u32>,

    /// Principal raised from the investor
    #[arg(long)]
    pub investor_principal: Option<Decimal>,

    /// Annual discount rate for NPV (e.g. 0.05)
    #[arg(long)]
    pub discount_rate: Option<Decimal>,

    /// Also write the monthly ledger to this CSV file
    #[arg(long)]
    pub ledger_csv: Option<String>,

    /// Leave the monthly ledger out of the printed result
    #[arg(long)]
    pub no_ledger: bool,
}

pub fn run_simulate(args: SimulateArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let mut scenario = resolve_scenario(&args, input::stdin::read_stdin::<SimulationInput>)?;
    apply_overrides(&mut scenario, &args);

    let result = simulation::simulate(&scenario)?;

    if let Some(ref path) = args.ledger_csv {
        let file = File::create(path).map_err(|e| format!("Failed to create '{path}': {e}"))?;
        write_ledger_csv(BufWriter::new(file), &result.result.ledger)?;
        log::info!("ledger written to {path}");
    }

    let mut value = serde_json::to_value(result)?;
    if args.no_ledger {
        if let Some(Value::Object(res)) = value.get_mut("result") {
            res.remove("ledger");
        }
    }
    Ok(value)
}

/// Pick the base scenario: `--input`, then `--preset`, then piped stdin,
/// then the default scenario. Stdin is only read when no flag names one.
fn resolve_scenario<F>(
    args: &SimulateArgs,
    read_stdin: F,
) -> Result<SimulationInput, Box<dyn std::error::Error>>
where
    F: FnOnce() -> Result<Option<SimulationInput>, Box<dyn std::error::Error>>,
{
    if let Some(ref path) = args.input {
        return input::file::read_input(path);
    }
    if let Some(preset) = args.preset {
        return Ok(Preset::from(preset).input());
    }
    Ok(read_stdin()?.unwrap_or_default())
}

fn apply_overrides(scenario: &mut SimulationInput, args: &SimulateArgs) {
    if let Some(years) = args.years {
        scenario.horizon = Horizon::Years(years);
    }
    if let Some(units) = args.units {
        scenario.capital.unit_count = units;
    }
    if let Some(principal) = args.investor_principal {
        scenario.investor_principal = principal;
    }
    if let Some(rate) = args.discount_rate {
        scenario.discount_rate = rate;
    }
}

pub fn list_presets() -> Result<Value, Box<dyn std::error::Error>> {
    let presets: Vec<Value> = Preset::ALL
        .into_iter()
        .map(|p| json!({ "name": p.name(), "description": p.description() }))
        .collect();
    Ok(Value::Array(presets))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn args() -> SimulateArgs {
        SimulateArgs {
            input: None,
            preset: None,
            years: None,
            units: None,
            investor_principal: None,
            discount_rate: None,
            ledger_csv: None,
            no_ledger: false,
        }
    }

    #[test]
    fn test_overrides_apply_on_top_of_scenario() {
        let mut scenario = SimulationInput::default();
        let mut a = args();
        a.years = Some(10);
        a.units = Some(3);
        a.discount_rate = Some(dec!(0.08));
        apply_overrides(&mut scenario, &a);

        assert_eq!(scenario.horizon, Horizon::Years(10));
        assert_eq!(scenario.capital.unit_count, 3);
        assert_eq!(scenario.discount_rate, dec!(0.08));
        assert_eq!(scenario.investor_principal, dec!(2000000));
    }

    #[test]
    fn test_preset_takes_precedence_over_stdin() {
        let mut a = args();
        a.preset = Some(PresetArg::TargetReturn);
        let scenario = resolve_scenario(&a, || panic!("stdin must not be read")).unwrap();
        assert_eq!(scenario, Preset::TargetReturn.input());
    }

    #[test]
    fn test_stdin_used_without_flags() {
        let mut piped = SimulationInput::default();
        piped.capital.unit_count = 7;
        let scenario = resolve_scenario(&args(), || Ok(Some(piped.clone()))).unwrap();
        assert_eq!(scenario.capital.unit_count, 7);

        let scenario = resolve_scenario(&args(), || Ok(None)).unwrap();
        assert_eq!(scenario, SimulationInput::default());
    }

    #[test]
    fn test_preset_arg_names_match_core() {
        for (arg, preset) in [
            (PresetArg::InterestShareRepay, Preset::InterestShareRepay),
            (PresetArg::AssembledPhases, Preset::AssembledPhases),
            (PresetArg::TargetReturn, Preset::TargetReturn),
            (PresetArg::TargetOnTop, Preset::TargetOnTop),
        ] {
            let name = arg.to_possible_value().unwrap().get_name().to_string();
            assert_eq!(name, preset.name());
            assert_eq!(Preset::from(arg), preset);
        }
    }

    #[test]
    fn test_list_presets() {
        let value = list_presets().unwrap();
        assert_eq!(value.as_array().unwrap().len(), 4);
        assert_eq!(value[0]["name"], "interest-share-repay");
    }
}
