use rust_decimal::Decimal;
use rust_decimal::MathematicalOps;
use rust_decimal_macros::dec;

use crate::error::LoanPlanError;
use crate::types::{round_money, Money, Rate};
use crate::LoanPlanResult;

const PERCENT: Decimal = dec!(100);
const MONTHS_PER_YEAR: Decimal = dec!(12);
const PERCENT_MONTHS: Decimal = dec!(1200);

/// Monthly periodic rate from an annual percentage (2.115 -> 0.0017625).
pub fn monthly_rate(annual_rate_pct: Rate) -> Rate {
    annual_rate_pct / PERCENT / MONTHS_PER_YEAR
}

/// One month of interest on `balance` at `annual_rate_pct`, rounded to cents.
///
/// Multiplies before dividing so an exact half-cent result rounds half-even
/// instead of falling just short of the tie.
pub fn periodic_interest(balance: Money, annual_rate_pct: Rate) -> LoanPlanResult<Money> {
    balance
        .checked_mul(annual_rate_pct)
        .and_then(|scaled| scaled.checked_div(PERCENT_MONTHS))
        .map(round_money)
        .ok_or_else(|| {
            LoanPlanError::FinancialImpossibility(format!(
                "interest on {balance} at {annual_rate_pct}% overflows the decimal range"
            ))
        })
}

/// Level payment amortizing `balance` over `periods` at `rate` per period,
/// rounded to cents.
///
/// `round(balance * r / (1 - (1 + r)^-n), 2)`; a zero rate degrades to
/// straight-line repayment.
pub fn level_payment(balance: Money, rate: Rate, periods: u32) -> LoanPlanResult<Money> {
    if periods == 0 {
        return Err(LoanPlanError::MalformedSchedule(
            "Number of periods must be > 0".into(),
        ));
    }

    if rate.is_zero() {
        return Ok(round_money(balance / Decimal::from(periods)));
    }

    let growth = (Decimal::ONE + rate)
        .checked_powu(u64::from(periods))
        .ok_or_else(|| {
            LoanPlanError::FinancialImpossibility(format!(
                "(1 + {rate})^{periods} overflows the decimal range"
            ))
        })?;

    if growth.is_zero() {
        return Err(LoanPlanError::DivisionByZero {
            context: "level payment growth factor".into(),
        });
    }

    let annuity_factor = Decimal::ONE - Decimal::ONE / growth;
    if annuity_factor.is_zero() {
        return Err(LoanPlanError::DivisionByZero {
            context: "level payment annuity factor".into(),
        });
    }

    balance
        .checked_mul(rate)
        .and_then(|scaled| scaled.checked_div(annuity_factor))
        .map(round_money)
        .ok_or_else(|| {
            LoanPlanError::FinancialImpossibility(format!(
                "level payment on {balance} over {periods} periods overflows the decimal range"
            ))
        })
}
