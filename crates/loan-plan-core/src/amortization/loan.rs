//! The loan aggregate: a named, revisioned list of phases together with the
//! plan last computed for it.

use log::{info, warn};
use serde::{Deserialize, Serialize};

use crate::error::LoanPlanError;
use crate::types::ComputationOutput;
use crate::LoanPlanResult;

use super::model::{EarlyRepayment, Installment, Phase, RepaymentPlan, Summary};
use super::sanity::{sanity_report, SanityReport};
use super::schedule::compute_repayment_plan;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Loan {
    pub name: String,
    pub revision: String,
    pub phases: Vec<Phase>,
    #[serde(default)]
    pub repayments: Vec<Installment>,
    #[serde(default)]
    pub early_repayments: Vec<EarlyRepayment>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<Summary>,
}

impl Loan {
    /// A loan with no computed plan.
    pub fn new(name: impl Into<String>, revision: impl Into<String>, phases: Vec<Phase>) -> Self {
        Self {
            name: name.into(),
            revision: revision.into(),
            phases,
            repayments: Vec::new(),
            early_repayments: Vec::new(),
            summary: None,
        }
    }

    /// Compute the plan for the current phases without touching `self`.
    pub fn plan(&self) -> LoanPlanResult<ComputationOutput<RepaymentPlan>> {
        compute_repayment_plan(&self.phases)
    }

    /// Recompute the plan and replace `repayments`, `early_repayments` and
    /// `summary`. Returns the run's envelope around the new summary. On error
    /// the loan is left unchanged.
    pub fn compute_repayment_plan(&mut self) -> LoanPlanResult<ComputationOutput<Summary>> {
        let ComputationOutput {
            result: plan,
            methodology,
            assumptions,
            warnings,
            metadata,
        } = self.plan()?;
        for warning in &warnings {
            info!("{}: {}", self.name, warning);
        }
        let summary = plan.summary.clone();
        self.apply(plan);

        Ok(ComputationOutput {
            result: summary,
            methodology,
            assumptions,
            warnings,
            metadata,
        })
    }

    /// Install a previously computed plan.
    pub fn apply(&mut self, plan: RepaymentPlan) {
        self.repayments = plan.repayments;
        self.early_repayments = plan.early_repayments;
        self.summary = Some(plan.summary);
    }

    /// The stored plan, if one has been computed.
    pub fn repayment_plan(&self) -> Option<RepaymentPlan> {
        self.summary.as_ref().map(|summary| RepaymentPlan {
            repayments: self.repayments.clone(),
            early_repayments: self.early_repayments.clone(),
            summary: summary.clone(),
        })
    }

    /// Check the stored plan against the phases. Fails when no plan has been
    /// computed yet.
    pub fn sanity_report(&self) -> LoanPlanResult<SanityReport> {
        let summary = self.summary.as_ref().ok_or_else(|| {
            LoanPlanError::InsufficientData(format!(
                "no repayment plan has been computed for loan '{}'",
                self.name
            ))
        })?;
        Ok(sanity_report(&self.phases, &self.repayments, summary))
    }

    /// `true` only when every sanity check passes.
    pub fn sanity_checks(&self) -> bool {
        match self.sanity_report() {
            Ok(report) => report.healthy,
            Err(e) => {
                warn!("{e}");
                false
            }
        }
    }
}
