use std::path::Path;

use serde::Serialize;
use staffquote_core::cpq::staffing::{allocation_targets, StaffingPlan};
use staffquote_core::cpq::tech_stack::StaffingDomain;
use staffquote_core::documents::read_specification;
use staffquote_core::{Seniority, StaffingProfile};

use crate::commands::CommandResult;

#[derive(Debug, Serialize)]
struct TargetView {
    role: &'static str,
    seniority: Seniority,
    domain: StaffingDomain,
    allocation_percentage: u8,
    rationale: &'static str,
}

#[derive(Debug, Serialize)]
struct StaffReport {
    created: usize,
    updated: usize,
    locked: usize,
    targets: Vec<TargetView>,
    profiles: Vec<StaffingProfile>,
}

pub fn run(spec_path: &Path) -> CommandResult {
    let spec = match read_specification(spec_path) {
        Ok(spec) => spec,
        Err(error) => return CommandResult::from_error("staff", &error),
    };

    let targets = allocation_targets(&spec);
    let mut plan = StaffingPlan::new(spec.profiles.clone());
    let summary = plan.reconcile(&targets);

    let report = StaffReport {
        created: summary.created,
        updated: summary.updated,
        locked: summary.locked,
        targets: targets
            .iter()
            .map(|target| TargetView {
                role: target.role,
                seniority: target.seniority,
                domain: target.domain,
                allocation_percentage: target.allocation,
                rationale: target.rationale,
            })
            .collect(),
        profiles: plan.into_profiles(),
    };

    CommandResult::success_with_data(
        "staff",
        format!(
            "{} suggested line(s) created, {} updated, {} confirmed line(s) left untouched",
            report.created, report.updated, report.locked
        ),
        &report,
    )
}
