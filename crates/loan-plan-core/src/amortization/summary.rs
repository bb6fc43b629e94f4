//! Reduction of a computed schedule into plan totals.

use crate::error::LoanPlanError;
use crate::types::{round_money, Money};
use crate::LoanPlanResult;

use super::model::{EarlyRepayment, Installment, Summary};

/// Aggregate installments and early repayments into a [`Summary`].
///
/// Sums are rounded to cents after accumulation. An empty installment list
/// has no final amount and is rejected.
pub fn summarize(
    repayments: &[Installment],
    early_repayments: &[EarlyRepayment],
) -> LoanPlanResult<Summary> {
    let last = repayments.last().ok_or_else(|| {
        LoanPlanError::InsufficientData("a summary requires at least one installment".into())
    })?;

    let interest: Money = repayments.iter().map(|r| r.interest).sum();
    let insurance: Money = repayments.iter().map(|r| r.insurance).sum();
    let repayment: Money = repayments.iter().map(|r| r.principal).sum();
    let early_repayment: Money = early_repayments.iter().map(|e| e.amount).sum();
    let end_date = repayments
        .iter()
        .map(|r| r.due_date)
        .max()
        .unwrap_or(last.due_date);

    Ok(Summary {
        duration: repayments.len() as u32,
        interest: round_money(interest),
        insurance: round_money(insurance),
        repayment: round_money(repayment),
        end_date,
        early_repayment: round_money(early_repayment),
        last_phase_amount: last.amount,
    })
}

/// Scheduled principal plus early repayments, rounded to cents.
pub fn total_principal_repaid(summary: &Summary) -> Money {
    round_money(summary.repayment + summary.early_repayment)
}
