//! Loan definition and repayment plan records.
//!
//! Field names on the wire follow the loan definition files (`startDate`,
//! `annualRate`, `principal_after`, ...). Amounts are written as plain
//! numbers and read back from either numbers or strings.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::types::{Money, Rate};

// ---------------------------------------------------------------------------
// Input
// ---------------------------------------------------------------------------

/// One segment of the loan's life at a given rate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Phase {
    /// First day of the phase; installments fall due monthly after it.
    pub start_date: NaiveDate,
    /// Annual interest rate as a percentage (2.115 = 2.115%).
    #[serde(serialize_with = "rust_decimal::serde::float::serialize")]
    pub annual_rate: Rate,
    /// Amortization term of the phase payment. Required on the final phase,
    /// where it is also the phase duration.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub periods: Option<u32>,
    /// Initial principal on the first phase; a signed delta on later phases.
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        serialize_with = "rust_decimal::serde::float_option::serialize"
    )]
    pub principal: Option<Money>,
    /// Signed correction added to the computed monthly payment.
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        serialize_with = "rust_decimal::serde::float_option::serialize"
    )]
    pub adjustment: Option<Money>,
    /// Insurance premium charged with every installment.
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        serialize_with = "rust_decimal::serde::float_option::serialize"
    )]
    pub insurance: Option<Money>,
}

impl Phase {
    /// Phase starting on `start_date` at `annual_rate` percent, with no
    /// optional attributes set.
    pub fn new(start_date: NaiveDate, annual_rate: Rate) -> Self {
        Self {
            start_date,
            annual_rate,
            periods: None,
            principal: None,
            adjustment: None,
            insurance: None,
        }
    }

    pub fn with_periods(mut self, periods: u32) -> Self {
        self.periods = Some(periods);
        self
    }

    pub fn with_principal(mut self, principal: Money) -> Self {
        self.principal = Some(principal);
        self
    }

    pub fn with_adjustment(mut self, adjustment: Money) -> Self {
        self.adjustment = Some(adjustment);
        self
    }

    pub fn with_insurance(mut self, insurance: Money) -> Self {
        self.insurance = Some(insurance);
        self
    }
}

// ---------------------------------------------------------------------------
// Output
// ---------------------------------------------------------------------------

/// A single monthly installment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Installment {
    #[serde(rename = "date")]
    pub due_date: NaiveDate,
    /// Payment plus insurance.
    #[serde(serialize_with = "rust_decimal::serde::float::serialize")]
    pub amount: Money,
    /// Principal repaid by this installment.
    #[serde(rename = "repayment", serialize_with = "rust_decimal::serde::float::serialize")]
    pub principal: Money,
    #[serde(serialize_with = "rust_decimal::serde::float::serialize")]
    pub interest: Money,
    #[serde(serialize_with = "rust_decimal::serde::float::serialize")]
    pub insurance: Money,
    /// Outstanding principal once this installment is paid.
    #[serde(serialize_with = "rust_decimal::serde::float::serialize")]
    pub principal_after: Money,
}

/// Out-of-schedule principal reduction declared by a later phase.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EarlyRepayment {
    pub date: NaiveDate,
    #[serde(serialize_with = "rust_decimal::serde::float::serialize")]
    pub amount: Money,
}

/// Totals over a computed plan.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Summary {
    /// Number of installments.
    pub duration: u32,
    #[serde(serialize_with = "rust_decimal::serde::float::serialize")]
    pub interest: Money,
    #[serde(serialize_with = "rust_decimal::serde::float::serialize")]
    pub insurance: Money,
    /// Scheduled principal repaid, early repayments excluded.
    #[serde(serialize_with = "rust_decimal::serde::float::serialize")]
    pub repayment: Money,
    pub end_date: NaiveDate,
    #[serde(serialize_with = "rust_decimal::serde::float::serialize")]
    pub early_repayment: Money,
    /// Amount of the final installment.
    #[serde(serialize_with = "rust_decimal::serde::float::serialize")]
    pub last_phase_amount: Money,
}

/// Everything the engine derives from a list of phases.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RepaymentPlan {
    pub repayments: Vec<Installment>,
    pub early_repayments: Vec<EarlyRepayment>,
    pub summary: Summary,
}
