//! Sanity checks comparing a computed plan with totals derived directly from
//! the phase definitions.
//!
//! Failures are soft: each one becomes a [`SanityFinding`] and a `warn!` log
//! line, and the verdict is the conjunction of all checks.

use log::warn;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::calendar::whole_months_between;
use crate::types::round_money;

use super::model::{Installment, Phase, Summary};
use super::summary::total_principal_repaid;

/// Which check produced a finding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SanityCheck {
    /// Installment count against the duration implied by the phases.
    Duration,
    /// Principal repaid (scheduled + early) against the initial principal.
    TotalRepayment,
    /// Balance left after the final installment.
    RemainingBalance,
}

/// A failed check with the values that disagreed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SanityFinding {
    pub check: SanityCheck,
    pub expected: String,
    pub computed: String,
    pub message: String,
}

/// Verdict plus one finding per failed check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SanityReport {
    pub healthy: bool,
    pub findings: Vec<SanityFinding>,
}

/// Run every check. Does not modify the plan.
pub fn sanity_report(
    phases: &[Phase],
    repayments: &[Installment],
    summary: &Summary,
) -> SanityReport {
    let mut findings = Vec::new();

    let expected_duration = expected_duration(phases);
    if expected_duration != Some(i64::from(summary.duration)) {
        findings.push(finding(
            SanityCheck::Duration,
            "plan duration is not correct",
            display_or_missing(expected_duration),
            summary.duration.to_string(),
        ));
    }

    let expected_principal = phases.first().and_then(|p| p.principal).map(round_money);
    let computed_principal = total_principal_repaid(summary);
    if expected_principal != Some(computed_principal) {
        findings.push(finding(
            SanityCheck::TotalRepayment,
            "total repayment is not correct",
            display_or_missing(expected_principal),
            computed_principal.to_string(),
        ));
    }

    let remaining = repayments.last().map(|r| r.principal_after);
    if remaining != Some(Decimal::ZERO) {
        findings.push(finding(
            SanityCheck::RemainingBalance,
            "principal after last repayment not equals zero",
            Decimal::ZERO.to_string(),
            display_or_missing(remaining),
        ));
    }

    SanityReport {
        healthy: findings.is_empty(),
        findings,
    }
}

/// Months from the first to the last phase start, plus the final phase's
/// declared periods. `None` when that cannot be derived.
fn expected_duration(phases: &[Phase]) -> Option<i64> {
    let first = phases.first()?;
    let last = phases.last()?;
    let periods = i64::from(last.periods?);
    if phases.len() == 1 {
        return Some(periods);
    }
    Some(whole_months_between(first.start_date, last.start_date) + periods)
}

fn finding(check: SanityCheck, what: &str, expected: String, computed: String) -> SanityFinding {
    let message = format!("{what} (expected={expected}, computed={computed})");
    warn!("{message}");
    SanityFinding {
        check,
        expected,
        computed,
        message,
    }
}

fn display_or_missing<T: ToString>(value: Option<T>) -> String {
    value.map_or_else(|| "missing".to_string(), |v| v.to_string())
}
