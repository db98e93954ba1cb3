use rust_decimal::Decimal;
use rust_decimal::MathematicalOps;
use rust_decimal_macros::dec;

use crate::error::EvWaterfallError;
use crate::types::{Money, Rate};
use crate::EvWaterfallResult;

const CONVERGENCE_THRESHOLD: Decimal = dec!(0.0000001);
const RATE_TOLERANCE: Decimal = dec!(0.000000000001);
const MAX_IRR_ITERATIONS: u32 = 100;
const MONTHS_PER_YEAR: Decimal = dec!(12);

/// Net Present Value of a series of cash flows.
///
/// Index 0 is the undiscounted base period; index t is discounted by `(1 + rate)^t`.
pub fn npv(rate: Rate, cash_flows: &[Money]) -> EvWaterfallResult<Money> {
    if rate <= dec!(-1) {
        return Err(EvWaterfallError::InvalidInput {
            field: "rate".into(),
            reason: "Discount rate must be greater than -100%".into(),
        });
    }

    let mut result = Decimal::ZERO;
    let one_plus_r = Decimal::ONE + rate;
    let mut discount = Decimal::ONE;

    for (t, cf) in cash_flows.iter().enumerate() {
        if t > 0 {
            discount = discount.checked_mul(one_plus_r).ok_or_else(|| {
                EvWaterfallError::FinancialImpossibility(format!(
                    "NPV discount factor overflowed at period {t}"
                ))
            })?;
        }
        if discount.is_zero() {
            return Err(EvWaterfallError::DivisionByZero {
                context: format!("NPV discount factor at period {t}"),
            });
        }
        result += cf / discount;
    }

    Ok(result)
}

/// Whether the series contains at least one strictly positive and one
/// strictly negative flow. Without both, no real IRR exists.
pub fn has_sign_change(cash_flows: &[Money]) -> bool {
    let any_positive = cash_flows.iter().any(|cf| cf.is_sign_positive() && !cf.is_zero());
    let any_negative = cash_flows.iter().any(|cf| cf.is_sign_negative() && !cf.is_zero());
    any_positive && any_negative
}

/// Periodic Internal Rate of Return using Newton-Raphson.
///
/// The returned rate is per period of the input series (monthly for the
/// waterfall ledger). Discount factors are built by repeated multiplication
/// with checked arithmetic, so rates that push them out of Decimal range end in
/// a `ConvergenceFailure` instead of a panic.
pub fn irr(cash_flows: &[Money], guess: Rate) -> EvWaterfallResult<Rate> {
    if cash_flows.len() < 2 {
        return Err(EvWaterfallError::InsufficientData(
            "IRR requires at least 2 cash flows".into(),
        ));
    }
    if !has_sign_change(cash_flows) {
        return Err(EvWaterfallError::FinancialImpossibility(
            "IRR is undefined when cash flows never change sign".into(),
        ));
    }

    let mut rate = guess;
    let mut npv_val = Decimal::ZERO;

    for i in 0..MAX_IRR_ITERATIONS {
        let failure = |last_delta: Decimal| EvWaterfallError::ConvergenceFailure {
            function: "IRR".into(),
            iterations: i,
            last_delta,
        };

        let (value, slope) = npv_with_slope(rate, cash_flows).ok_or_else(|| failure(npv_val))?;
        npv_val = value;

        if npv_val.abs() < CONVERGENCE_THRESHOLD {
            return Ok(rate);
        }
        if slope.is_zero() {
            return Err(failure(npv_val));
        }

        let step = npv_val.checked_div(slope).ok_or_else(|| failure(npv_val))?;
        rate -= step;

        // Guard against divergence
        if rate < dec!(-0.99) {
            rate = dec!(-0.99);
        } else if rate > dec!(100.0) {
            rate = dec!(100.0);
        }

        if step.abs() < RATE_TOLERANCE {
            return Ok(rate);
        }
    }

    Err(EvWaterfallError::ConvergenceFailure {
        function: "IRR".into(),
        iterations: MAX_IRR_ITERATIONS,
        last_delta: npv_val,
    })
}

/// NPV and its derivative with respect to the rate, or `None` on Decimal overflow.
fn npv_with_slope(rate: Rate, cash_flows: &[Money]) -> Option<(Money, Decimal)> {
    let v = Decimal::ONE.checked_div(Decimal::ONE + rate)?;
    let mut factor = Decimal::ONE;
    let mut value = Decimal::ZERO;
    let mut slope = Decimal::ZERO;

    for (t, cf) in cash_flows.iter().enumerate() {
        if t > 0 {
            factor = factor.checked_mul(v)?;
        }
        let discounted = cf.checked_mul(factor)?;
        value = value.checked_add(discounted)?;
        if t > 0 {
            // d/dr [cf * (1+r)^-t] = -t * cf * (1+r)^-(t+1)
            let term = Decimal::from(t as u64).checked_mul(discounted)?.checked_mul(v)?;
            slope = slope.checked_sub(term)?;
        }
    }

    Some((value, slope))
}

/// Monthly-equivalent rate used for discounting: `annual / 12`.
pub fn monthly_rate(annual: Rate) -> Rate {
    annual / MONTHS_PER_YEAR
}

/// Compound a monthly rate to an annual one: `(1 + monthly)^12 - 1`.
pub fn annualize_monthly_rate(monthly: Rate) -> EvWaterfallResult<Rate> {
    (Decimal::ONE + monthly)
        .checked_powi(12)
        .map(|growth| growth - Decimal::ONE)
        .ok_or_else(|| {
            EvWaterfallError::FinancialImpossibility(format!(
                "Annualising monthly rate {monthly} overflowed"
            ))
        })
}
