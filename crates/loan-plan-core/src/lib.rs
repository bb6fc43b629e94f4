//! Repayment plans for loans that pass through successive rate phases.
//!
//! The [`amortization`] module holds the schedule engine, the summary
//! aggregator and the sanity checker. Amounts are `rust_decimal::Decimal`
//! throughout and rounded to cents as they are produced.

pub mod calendar;
pub mod error;
pub mod time_value;
pub mod types;

#[cfg(feature = "amortization")]
pub mod amortization;

pub use error::LoanPlanError;
pub use types::*;

#[cfg(feature = "amortization")]
pub use amortization::{Loan, Phase, RepaymentPlan};

/// Standard result type for all loan-plan operations
pub type LoanPlanResult<T> = Result<T, LoanPlanError>;
