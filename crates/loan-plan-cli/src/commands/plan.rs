use clap::Args;
use colored::Colorize;
use serde_json::Value;

use loan_plan_core::amortization::{sanity_report, Loan};

use crate::input;
use crate::output;

/// Arguments for computing and saving a repayment plan
#[derive(Args)]
pub struct ComputeArgs {
    /// Loan definition YAML file
    pub file: String,

    /// Save the computed loan to this path instead of overwriting FILE
    #[arg(long)]
    pub out: Option<String>,
}

/// Arguments for a dry-run repayment plan
#[derive(Args)]
pub struct PlanArgs {
    /// Path to a YAML or JSON loan definition (reads stdin when omitted)
    #[arg(long)]
    pub input: Option<String>,
}

/// Compute the plan, check it, and persist the loan only when it is coherent.
pub fn run_compute(args: ComputeArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let mut loan: Loan = input::file::read_yaml(&args.file)?;

    let summary_output = loan.compute_repayment_plan()?;

    if !loan.sanity_checks() {
        eprintln!("{}", "KO - computed repayment plan is incoherent".red());
        return Err(format!("sanity checks failed, '{}' left unchanged", args.file).into());
    }

    let target = args.out.as_deref().unwrap_or(&args.file);
    output::yaml::write_yaml(target, &loan)?;
    eprintln!("{}", "OK".green());

    Ok(serde_json::to_value(summary_output)?)
}

/// Compute the plan and return it with its sanity report. Nothing is written.
pub fn run_plan(args: PlanArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let loan: Loan = if let Some(ref path) = args.input {
        input::file::read_yaml(path)?
    } else if let Some(loan) = input::stdin::read_stdin::<Loan>()? {
        loan
    } else {
        return Err("provide --input or pipe a loan definition on stdin".into());
    };

    let output = loan.plan()?;
    let report = sanity_report(
        &loan.phases,
        &output.result.repayments,
        &output.result.summary,
    );

    let mut value = serde_json::to_value(&output)?;
    value["sanity"] = serde_json::to_value(&report)?;
    Ok(value)
}
