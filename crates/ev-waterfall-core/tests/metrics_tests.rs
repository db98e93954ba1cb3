use ev_waterfall_core::simulation::metrics::{evaluate, IrrOutcome};
use ev_waterfall_core::time_value::{irr, npv};
use ev_waterfall_core::{CashFlowSeries, EvWaterfallError, Party};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

// ===========================================================================
// NPV
// ===========================================================================

#[test]
fn test_npv_one_percent_per_month() {
    let series = CashFlowSeries::new(Party::Investor, vec![dec!(-100), dec!(101)]);
    let m = evaluate(&series, dec!(0.12)).unwrap();
    assert_eq!(m.npv, Decimal::ZERO);
}

#[test]
fn test_npv_index_zero_is_not_discounted() {
    let value = npv(dec!(0.5), &[dec!(-250)]).unwrap();
    assert_eq!(value, dec!(-250));
}

#[test]
fn test_npv_zero_discount_rate_is_plain_sum() {
    let series = CashFlowSeries::new(Party::Company, vec![dec!(-300), dec!(100), dec!(100), dec!(150)]);
    let m = evaluate(&series, Decimal::ZERO).unwrap();
    assert_eq!(m.npv, dec!(50));
    assert_eq!(m.total_net_flow, dec!(50));
}

// ===========================================================================
// IRR
// ===========================================================================

#[test]
fn test_irr_annualised_from_monthly() {
    // 12 monthly payments of 100 on 1,000 => about 2.92% a month
    let mut flows = vec![dec!(-1000)];
    flows.extend(std::iter::repeat(dec!(100)).take(12));
    let series = CashFlowSeries::new(Party::Investor, flows);

    match evaluate(&series, dec!(0.05)).unwrap().irr {
        IrrOutcome::Converged { monthly, annual } => {
            assert!((monthly - dec!(0.0292)).abs() < dec!(0.0001), "monthly {monthly}");
            assert!(annual > monthly * dec!(12));
        }
        other => panic!("expected convergence, got {other:?}"),
    }
}

#[test]
fn test_irr_sentinel_without_sign_change() {
    let series = CashFlowSeries::new(Party::Investor, vec![dec!(-100), dec!(-5), Decimal::ZERO]);
    let m = evaluate(&series, dec!(0.05)).unwrap();
    assert!(matches!(m.irr, IrrOutcome::NotConverged { .. }));
    assert_eq!(m.irr.annual_or_zero(), Decimal::ZERO);
}

#[test]
fn test_irr_direct_errors() {
    assert!(matches!(
        irr(&[dec!(10), dec!(10)], dec!(0.01)),
        Err(EvWaterfallError::FinancialImpossibility(_))
    ));
    assert!(matches!(
        irr(&[], dec!(0.01)),
        Err(EvWaterfallError::InsufficientData(_))
    ));
}

// ===========================================================================
// ROI
// ===========================================================================

#[test]
fn test_roi_zero_initial_investment() {
    let series = CashFlowSeries::new(Party::Company, vec![Decimal::ZERO, dec!(500), dec!(-200)]);
    let m = evaluate(&series, dec!(0.05)).unwrap();
    assert_eq!(m.initial_investment, Decimal::ZERO);
    assert_eq!(m.roi_pct, Decimal::ZERO);
}

#[test]
fn test_roi_negative_when_money_is_lost() {
    let series = CashFlowSeries::new(Party::Investor, vec![dec!(-1000), dec!(250), dec!(250)]);
    let m = evaluate(&series, dec!(0.05)).unwrap();
    assert_eq!(m.roi_pct, dec!(-50));
}
