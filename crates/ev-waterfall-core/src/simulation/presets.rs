use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use super::config::*;
use crate::types::Currency;

/// Ready-made financing structures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Preset {
    /// 3y interest, 2y profit share, principal back at year 5, 7y horizon
    InterestShareRepay,
    /// 2y interest with principal back at its end, 3y profit share, 5y exclusive
    AssembledPhases,
    /// 2y interest then equal instalments up to 120% of principal, net of interest
    TargetReturn,
    /// 2y interest then instalments of 110% of principal on top of the interest
    TargetOnTop,
}

impl Preset {
    pub const ALL: [Preset; 4] = [
        Preset::InterestShareRepay,
        Preset::AssembledPhases,
        Preset::TargetReturn,
        Preset::TargetOnTop,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Preset::InterestShareRepay => "interest-share-repay",
            Preset::AssembledPhases => "assembled-phases",
            Preset::TargetReturn => "target-return",
            Preset::TargetOnTop => "target-on-top",
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            Preset::InterestShareRepay => {
                "3y interest at 5%, 2y 50/50 profit share, principal repaid at year 5, 7y horizon"
            }
            Preset::AssembledPhases => {
                "2y interest at 5% with principal repaid at its end, 3y 50/50 share, 5y exclusive"
            }
            Preset::TargetReturn => {
                "2y interest at 5%, then 3y instalments to 120% of principal net of interest"
            }
            Preset::TargetOnTop => {
                "2y interest at 5%, then 3y instalments of 110% of principal on top of interest"
            }
        }
    }

    pub fn input(self) -> SimulationInput {
        match self {
            Preset::InterestShareRepay => SimulationInput::default(),
            Preset::AssembledPhases => assembled_phases(),
            Preset::TargetReturn => target_return(dec!(900000), dec!(0.20), true),
            Preset::TargetOnTop => target_return(dec!(990000), dec!(0.10), false),
        }
    }
}

impl std::str::FromStr for Preset {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Preset::ALL
            .into_iter()
            .find(|p| p.name() == s)
            .ok_or_else(|| format!("unknown preset '{s}'"))
    }
}

/// Operating assumptions shared by the 30-day-month presets.
fn thirty_day_operations(daily_kwh: Decimal, promo_price: Decimal, normal_price: Decimal) -> OperatingInput {
    OperatingInput {
        promo_months: 6,
        promo_price,
        normal_price,
        daily_kwh_per_unit: daily_kwh,
        energy_cost_per_kwh: dec!(150),
        grid_base_rate: dec!(2390),
        contracted_kw_per_unit: dec!(7),
        comm_fee_per_unit: dec!(3000),
        maintenance_per_unit: dec!(10000),
        day_count: DayCount::ThirtyDay,
    }
}

fn interest_phase(years: u32) -> PhaseDefinition {
    PhaseDefinition {
        label: "Interest".into(),
        duration: PhaseDuration::Years(years),
        rule: PayoutRule::InterestOnly {
            annual_rate: dec!(0.05),
        },
    }
}

fn reduced_capex() -> CapitalInput {
    CapitalInput {
        infra_cost_per_unit: dec!(2100000),
        charger_cost_per_unit: dec!(600000),
        subsidy_per_unit: dec!(1800000),
        unit_count: 1,
    }
}

fn assembled_phases() -> SimulationInput {
    SimulationInput {
        capital: reduced_capex(),
        investor_principal: dec!(1080000),
        phases: vec![
            interest_phase(2),
            PhaseDefinition {
                label: "Profit share".into(),
                duration: PhaseDuration::Years(3),
                rule: PayoutRule::ProfitShare { share: dec!(0.50) },
            },
            PhaseDefinition {
                label: "Exclusive".into(),
                duration: PhaseDuration::Years(5),
                rule: PayoutRule::Exclusive,
            },
        ],
        horizon: Horizon::FromPhases,
        principal_repayment: Some(RepaymentTiming::EndOfPhase(0)),
        operations: thirty_day_operations(dec!(20), dec!(200), dec!(300)),
        discount_rate: dec!(0.05),
        currency: Currency::KRW,
    }
}

fn target_return(principal: Decimal, target: Decimal, net_of_prior_interest: bool) -> SimulationInput {
    SimulationInput {
        capital: reduced_capex(),
        investor_principal: principal,
        phases: vec![
            interest_phase(2),
            PhaseDefinition {
                label: "Repayment".into(),
                duration: PhaseDuration::Years(3),
                rule: PayoutRule::AmortizingTarget {
                    target_return: target,
                    net_of_prior_interest,
                },
            },
        ],
        horizon: Horizon::Years(6),
        principal_repayment: None,
        operations: thirty_day_operations(dec!(15), dec!(168), dec!(288)),
        discount_rate: dec!(0.05),
        currency: Currency::KRW,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::simulation::config::SimulationConfig;

    #[test]
    fn test_every_preset_validates() {
        for preset in Preset::ALL {
            let config = SimulationConfig::new(preset.input());
            assert!(config.is_ok(), "{}: {:?}", preset.name(), config.err());
        }
    }

    #[test]
    fn test_names_round_trip_through_from_str() {
        for preset in Preset::ALL {
            assert_eq!(preset.name().parse::<Preset>().unwrap(), preset);
        }
        assert!("nope".parse::<Preset>().is_err());
    }

    #[test]
    fn test_assembled_phases_horizon_from_phases() {
        let config = SimulationConfig::new(Preset::AssembledPhases.input()).unwrap();
        assert_eq!(config.total_months(), 120);
        assert_eq!(config.repayment_month(), Some(24));
    }

    #[test]
    fn test_target_presets_fund_capex_exactly() {
        let config = SimulationConfig::new(Preset::TargetReturn.input()).unwrap();
        assert_eq!(config.net_capex(), dec!(900000));
        assert_eq!(config.company_initial_outlay(), Decimal::ZERO);
        assert_eq!(config.total_months(), 72);
    }
}
