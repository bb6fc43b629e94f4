//! Schedule engine: turns an ordered list of phases into monthly installments.
//!
//! Each phase runs for a whole number of months: the gap to the next phase's
//! start date, or its declared `periods` when it is the final phase. The
//! outstanding balance carries over from one phase to the next, shifted by the
//! phase's principal delta. Every stored amount is rounded to cents as it is
//! produced, and the last installment absorbs whatever residual balance the
//! rounding leaves behind.

use log::debug;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::time::Instant;

use crate::calendar::{add_months, whole_months_between};
use crate::error::LoanPlanError;
use crate::time_value::{level_payment, monthly_rate, periodic_interest};
use crate::types::{round_money, with_metadata, ComputationOutput, Money};
use crate::LoanPlanResult;

use super::model::{EarlyRepayment, Installment, Phase, RepaymentPlan};
use super::summary::summarize;

/// Installments and early repayments before aggregation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Schedule {
    pub repayments: Vec<Installment>,
    pub early_repayments: Vec<EarlyRepayment>,
    /// Non-fatal observations made while building the schedule.
    pub warnings: Vec<String>,
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Compute the full repayment plan (installments, early repayments, summary)
/// for `phases`. The result is rebuilt from scratch on every call.
pub fn compute_repayment_plan(
    phases: &[Phase],
) -> LoanPlanResult<ComputationOutput<RepaymentPlan>> {
    let start = Instant::now();

    let schedule = compute_schedule(phases)?;
    debug!("calculation of the repayment summary");
    let summary = summarize(&schedule.repayments, &schedule.early_repayments)?;

    let plan = RepaymentPlan {
        repayments: schedule.repayments,
        early_repayments: schedule.early_repayments,
        summary,
    };

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "Multi-phase level-payment amortization, monthly periods, cents rounding",
        &serde_json::json!({
            "phases": phases.len(),
            "installments": plan.repayments.len(),
            "first_principal": phases.first().and_then(|p| p.principal).map(|p| p.to_string()),
            "rounding": "half-even to 2 decimal places",
        }),
        schedule.warnings,
        elapsed,
        plan,
    ))
}

/// Build the installment sequence and early-repayment list for `phases`.
pub fn compute_schedule(phases: &[Phase]) -> LoanPlanResult<Schedule> {
    let durations = phase_durations(phases)?;
    let mut warnings: Vec<String> = Vec::new();

    let total: u32 = durations.iter().sum();
    let mut repayments: Vec<Installment> = Vec::with_capacity(total as usize);
    let mut early_repayments: Vec<EarlyRepayment> = Vec::new();
    let mut balance = Decimal::ZERO;

    for (index, phase) in phases.iter().enumerate() {
        debug!("computing repayments for phase {}", index + 1);
        let duration = durations[index];
        debug!("  {:24} = {}", "for_periods", duration);

        balance = opening_balance(index, phase, balance, &mut early_repayments)?;
        debug!("  {:24} = {}", "opening balance", balance);

        let rate = monthly_rate(phase.annual_rate);
        debug!("  {:24} = {}", "monthly_rate", rate);

        let amortization_periods = match phase.periods {
            Some(periods) => periods,
            None => {
                let remaining: u32 = durations[index..].iter().sum();
                warnings.push(format!(
                    "Phase {} declares no periods; payment amortizes over the remaining {} periods",
                    index + 1,
                    remaining
                ));
                remaining
            }
        };

        let mut payment = level_payment(balance, rate, amortization_periods)?;
        debug!("  {:24} = {}", "computed monthly_amount", payment);
        if let Some(adjustment) = phase.adjustment {
            payment = payment
                .checked_add(adjustment)
                .ok_or_else(|| overflow(index, "adjusted payment"))?;
            debug!("  {:24} = {}", "corrected monthly_amount", payment);
        }

        let insurance = phase.insurance.unwrap_or(Decimal::ZERO);
        debug!("  {:24} = {}", "monthly_insurance", insurance);

        let first_interest = periodic_interest(balance, phase.annual_rate)?;
        if balance > Decimal::ZERO && payment <= first_interest {
            warnings.push(format!(
                "Phase {}: payment {} does not cover interest {}; balance will not decrease",
                index + 1,
                payment,
                first_interest
            ));
        }

        let mut due_date = phase.start_date;
        for _ in 0..duration {
            let interest = periodic_interest(balance, phase.annual_rate)?;
            let principal = payment
                .checked_sub(interest)
                .map(|p| round_money(p.min(balance)))
                .ok_or_else(|| overflow(index, "principal share"))?;
            let principal_after = round_money(balance - principal);
            due_date = add_months(due_date, 1)?;

            repayments.push(Installment {
                due_date,
                amount: payment
                    .checked_add(insurance)
                    .map(round_money)
                    .ok_or_else(|| overflow(index, "installment amount"))?,
                principal,
                interest,
                insurance,
                principal_after,
            });

            balance = principal_after;
        }
        debug!("  {:24} = {}", "last principal_after", balance);
    }

    if let Some(position) = repayments.iter().position(|r| r.principal_after.is_zero()) {
        if position + 1 < repayments.len() {
            warnings.push(format!(
                "Principal fully repaid at installment {} of {}; later installments repay no principal",
                position + 1,
                repayments.len()
            ));
        }
    }

    if let Some(residual) = correct_final_installment(&mut repayments) {
        warnings.push(format!(
            "Final installment corrected by residual principal {residual}"
        ));
    }

    debug!("all phases have been computed successfully");
    Ok(Schedule {
        repayments,
        early_repayments,
        warnings,
    })
}

/// Number of installments each phase contributes.
///
/// Validates the phase list first: it must be non-empty, start with a
/// principal, end with declared periods, and have strictly increasing start
/// months.
pub fn phase_durations(phases: &[Phase]) -> LoanPlanResult<Vec<u32>> {
    validate_phases(phases)?;

    let last = phases.len() - 1;
    let mut durations = Vec::with_capacity(phases.len());

    for (index, phase) in phases.iter().enumerate() {
        let duration = if index < last {
            let gap = whole_months_between(phase.start_date, phases[index + 1].start_date);
            if gap <= 0 {
                return Err(LoanPlanError::malformed_phase(
                    index,
                    format!(
                        "start date {} must fall in an earlier month than the next phase start {}",
                        phase.start_date,
                        phases[index + 1].start_date
                    ),
                ));
            }
            u32::try_from(gap).map_err(|_| {
                LoanPlanError::malformed_phase(index, format!("duration of {gap} months is too long"))
            })?
        } else {
            // Presence checked by validate_phases.
            phase.periods.unwrap_or_default()
        };
        durations.push(duration);
    }

    Ok(durations)
}

// ---------------------------------------------------------------------------
// Internal helpers
// ---------------------------------------------------------------------------

fn validate_phases(phases: &[Phase]) -> LoanPlanResult<()> {
    let Some(first) = phases.first() else {
        return Err(LoanPlanError::MalformedSchedule(
            "at least one phase is required".into(),
        ));
    };

    if first.principal.is_none() {
        return Err(LoanPlanError::malformed_phase(
            0,
            "the first phase must declare a principal",
        ));
    }

    let last = phases.len() - 1;
    for (index, phase) in phases.iter().enumerate() {
        if phase.annual_rate < Decimal::ZERO {
            return Err(LoanPlanError::malformed_phase(
                index,
                format!("annual rate {} must not be negative", phase.annual_rate),
            ));
        }
        match phase.periods {
            Some(0) => {
                return Err(LoanPlanError::malformed_phase(
                    index,
                    "periods must be greater than zero",
                ));
            }
            None if index == last => {
                return Err(LoanPlanError::malformed_phase(
                    index,
                    "the final phase must declare its periods",
                ));
            }
            _ => {}
        }
    }

    Ok(())
}

/// Balance the phase starts from. A negative principal delta on a later phase
/// is logged as an early repayment and also applied to the balance.
fn opening_balance(
    index: usize,
    phase: &Phase,
    previous_balance: Money,
    early_repayments: &mut Vec<EarlyRepayment>,
) -> LoanPlanResult<Money> {
    if index == 0 {
        return phase
            .principal
            .ok_or_else(|| LoanPlanError::malformed_phase(0, "the first phase must declare a principal"));
    }

    let Some(delta) = phase.principal else {
        return Ok(previous_balance);
    };

    if delta < Decimal::ZERO {
        early_repayments.push(EarlyRepayment {
            date: phase.start_date,
            amount: -delta,
        });
    }

    let balance = previous_balance
        .checked_add(delta)
        .ok_or_else(|| overflow(index, "opening balance"))?;
    if balance < Decimal::ZERO {
        return Err(LoanPlanError::malformed_phase(
            index,
            format!(
                "principal delta {delta} exceeds the outstanding balance {previous_balance}"
            ),
        ));
    }

    Ok(balance)
}

fn overflow(index: usize, what: &str) -> LoanPlanError {
    LoanPlanError::FinancialImpossibility(format!(
        "phase {}: {what} overflows the decimal range",
        index + 1
    ))
}

/// Fold any residual balance on the last installment into its principal,
/// taking it out of interest. Returns the residual when a correction was made.
fn correct_final_installment(repayments: &mut [Installment]) -> Option<Money> {
    let last = repayments.last_mut()?;
    let residual = last.principal_after;
    if residual.is_zero() {
        return None;
    }

    debug!("ultimate principal_after not equals zero ({residual}) => fix");
    last.principal += residual;
    last.interest -= residual;
    last.principal_after = Decimal::ZERO;
    Some(residual)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn single_phase() -> Vec<Phase> {
        vec![Phase::new(date(2010, 9, 15), dec!(2.115))
            .with_principal(dec!(10000))
            .with_periods(120)
            .with_insurance(dec!(1.2))]
    }

    fn fixed_then_variable() -> Vec<Phase> {
        vec![
            Phase::new(date(2010, 9, 15), dec!(2.115))
                .with_principal(dec!(100000))
                .with_periods(240)
                .with_insurance(dec!(1.2)),
            Phase::new(date(2013, 9, 15), dec!(1.115))
                .with_periods(120)
                .with_insurance(dec!(1.2)),
        ]
    }

    fn with_early_repayment() -> Vec<Phase> {
        vec![
            Phase::new(date(2010, 9, 15), dec!(2.115))
                .with_principal(dec!(10000))
                .with_periods(120)
                .with_insurance(dec!(1.2)),
            Phase::new(date(2012, 9, 15), dec!(2.115))
                .with_principal(dec!(-500))
                .with_periods(96),
        ]
    }

    // -----------------------------------------------------------------------
    // Durations and validation
    // -----------------------------------------------------------------------

    #[test]
    fn test_durations_from_dates_and_final_periods() {
        assert_eq!(phase_durations(&fixed_then_variable()).unwrap(), vec![36, 120]);
        assert_eq!(phase_durations(&single_phase()).unwrap(), vec![120]);
    }

    #[test]
    fn test_empty_phases_rejected() {
        let result = compute_schedule(&[]);
        assert!(matches!(result, Err(LoanPlanError::MalformedSchedule(_))));
    }

    #[test]
    fn test_first_phase_requires_principal() {
        let phases = vec![Phase::new(date(2010, 9, 15), dec!(2)).with_periods(12)];
        let err = compute_schedule(&phases).unwrap_err();
        assert!(err.to_string().contains("phase 1"), "got: {err}");
    }

    #[test]
    fn test_final_phase_requires_periods() {
        let mut phases = fixed_then_variable();
        phases[1].periods = None;
        let err = compute_schedule(&phases).unwrap_err();
        assert!(err.to_string().contains("phase 2"), "got: {err}");
    }

    #[test]
    fn test_same_month_start_dates_rejected() {
        let mut phases = fixed_then_variable();
        phases[1].start_date = date(2010, 9, 28);
        assert!(matches!(
            compute_schedule(&phases),
            Err(LoanPlanError::MalformedSchedule(_))
        ));
    }

    #[test]
    fn test_unordered_start_dates_rejected() {
        let mut phases = fixed_then_variable();
        phases[1].start_date = date(2009, 9, 15);
        assert!(matches!(
            compute_schedule(&phases),
            Err(LoanPlanError::MalformedSchedule(_))
        ));
    }

    #[test]
    fn test_negative_rate_rejected() {
        let mut phases = single_phase();
        phases[0].annual_rate = dec!(-1);
        assert!(matches!(
            compute_schedule(&phases),
            Err(LoanPlanError::MalformedSchedule(_))
        ));
    }

    #[test]
    fn test_zero_periods_rejected() {
        let mut phases = single_phase();
        phases[0].periods = Some(0);
        assert!(matches!(
            compute_schedule(&phases),
            Err(LoanPlanError::MalformedSchedule(_))
        ));
    }

    #[test]
    fn test_early_repayment_larger_than_balance_rejected() {
        let mut phases = with_early_repayment();
        phases[1].principal = Some(dec!(-20000));
        let err = compute_schedule(&phases).unwrap_err();
        assert!(err.to_string().contains("phase 2"), "got: {err}");
    }

    // -----------------------------------------------------------------------
    // Installments
    // -----------------------------------------------------------------------

    #[test]
    fn test_single_phase_first_and_last_installment() {
        let schedule = compute_schedule(&single_phase()).unwrap();
        assert_eq!(schedule.repayments.len(), 120);

        let first = &schedule.repayments[0];
        assert_eq!(first.due_date, date(2010, 10, 15));
        assert_eq!(first.amount, dec!(93.73));
        assert_eq!(first.interest, dec!(17.62));
        assert_eq!(first.principal, dec!(74.91));
        assert_eq!(first.insurance, dec!(1.2));
        assert_eq!(first.principal_after, dec!(9925.09));

        let last = schedule.repayments.last().unwrap();
        assert_eq!(last.due_date, date(2020, 9, 15));
        assert_eq!(last.principal_after, Decimal::ZERO);
        assert!(schedule.early_repayments.is_empty());
    }

    #[test]
    fn test_final_correction_moves_residual_from_interest() {
        let schedule = compute_schedule(&fixed_then_variable()).unwrap();
        let last = schedule.repayments.last().unwrap();

        // Uncorrected: principal 770.69, interest 0.72, residual 0.16
        assert_eq!(last.principal, dec!(770.85));
        assert_eq!(last.interest, dec!(0.56));
        assert_eq!(last.principal_after, Decimal::ZERO);
        assert!(schedule
            .warnings
            .iter()
            .any(|w| w.contains("residual principal 0.16")));
    }

    #[test]
    fn test_negative_delta_records_early_repayment_and_reduces_balance() {
        let schedule = compute_schedule(&with_early_repayment()).unwrap();

        assert_eq!(
            schedule.early_repayments,
            vec![EarlyRepayment {
                date: date(2012, 9, 15),
                amount: dec!(500),
            }]
        );

        // Balance after installment 24 is 8165.37; phase 2 opens at 7665.37
        assert_eq!(schedule.repayments[23].principal_after, dec!(8165.37));
        let opening = &schedule.repayments[24];
        assert_eq!(opening.interest, dec!(13.51));
        assert_eq!(opening.principal, dec!(73.35));
        assert_eq!(opening.principal_after, dec!(7592.02));
        assert_eq!(opening.insurance, Decimal::ZERO);
    }

    #[test]
    fn test_positive_delta_increases_balance_without_early_repayment() {
        let mut phases = with_early_repayment();
        phases[1].principal = Some(dec!(500));
        let schedule = compute_schedule(&phases).unwrap();

        assert!(schedule.early_repayments.is_empty());
        let opening = &schedule.repayments[24];
        assert_eq!(opening.principal + opening.principal_after, dec!(8665.37));
    }

    #[test]
    fn test_adjustment_shifts_payment() {
        let mut phases = single_phase();
        phases[0].adjustment = Some(dec!(7.47));
        let schedule = compute_schedule(&phases).unwrap();

        // 92.53 + 7.47 + 1.2 insurance
        assert_eq!(schedule.repayments[0].amount, dec!(101.20));
        assert_eq!(schedule.repayments[0].principal, dec!(82.38));
    }

    #[test]
    fn test_large_adjustment_repays_early() {
        let mut phases = single_phase();
        phases[0].adjustment = Some(dec!(1000));
        let schedule = compute_schedule(&phases).unwrap();

        assert_eq!(schedule.repayments.len(), 120);
        assert!(schedule.repayments.iter().all(|r| r.principal >= Decimal::ZERO));
        assert!(schedule
            .warnings
            .iter()
            .any(|w| w.contains("fully repaid")));
    }

    #[test]
    fn test_zero_rate_straight_line() {
        let phases = vec![Phase::new(date(2010, 1, 31), Decimal::ZERO)
            .with_principal(dec!(1200))
            .with_periods(12)];
        let schedule = compute_schedule(&phases).unwrap();

        assert!(schedule.repayments.iter().all(|r| r.interest.is_zero()));
        assert!(schedule.repayments.iter().all(|r| r.principal == dec!(100)));
        // Clamped to February and carried forward
        assert_eq!(schedule.repayments[0].due_date, date(2010, 2, 28));
        assert_eq!(schedule.repayments[1].due_date, date(2010, 3, 28));
    }

    #[test]
    fn test_half_cent_interest_rounds_half_even() {
        let phases = vec![Phase::new(date(2010, 9, 15), dec!(3.4))
            .with_principal(dec!(15810))
            .with_periods(120)];
        let schedule = compute_schedule(&phases).unwrap();

        let first = &schedule.repayments[0];
        assert_eq!(first.interest, dec!(44.80));
        assert_eq!(first.principal + first.principal_after, dec!(15810));
    }

    #[test]
    fn test_overflowing_principal_is_financial_impossibility() {
        let phases = vec![Phase::new(date(2010, 9, 15), dec!(12))
            .with_principal(Decimal::MAX)
            .with_periods(1)];
        assert!(matches!(
            compute_schedule(&phases),
            Err(LoanPlanError::FinancialImpossibility(_))
        ));
    }

    #[test]
    fn test_missing_periods_on_inner_phase_uses_remaining_term() {
        let mut phases = fixed_then_variable();
        phases[0].periods = None;
        let schedule = compute_schedule(&phases).unwrap();

        assert_eq!(schedule.repayments.len(), 156);
        assert!(schedule
            .warnings
            .iter()
            .any(|w| w.contains("remaining 156 periods")));
    }

    #[test]
    fn test_plan_envelope_carries_summary() {
        let output = compute_repayment_plan(&single_phase()).unwrap();
        assert_eq!(output.result.summary.duration, 120);
        assert_eq!(output.metadata.precision, "rust_decimal_128bit");
        assert!(output.warnings.is_empty());
    }
}
