//! Multi-phase amortization: schedule engine, summary aggregation and
//! sanity checks over a loan definition.

pub mod loan;
pub mod model;
pub mod sanity;
pub mod schedule;
pub mod summary;

pub use loan::Loan;
pub use model::{EarlyRepayment, Installment, Phase, RepaymentPlan, Summary};
pub use sanity::{sanity_report, SanityCheck, SanityFinding, SanityReport};
pub use schedule::{compute_repayment_plan, compute_schedule, phase_durations, Schedule};
pub use summary::summarize;
