use std::path::Path;

use chrono::{DateTime, Utc};
use serde::Serialize;
use staffquote_core::documents::read_specification;
use staffquote_core::errors::ApplicationError;
use staffquote_core::{QuoteInput, QuoteRuntime, QuoteSnapshot, StaffingProfile};
use uuid::Uuid;

use crate::commands::context::PricingContext;
use crate::commands::CommandResult;

#[derive(Debug, Serialize)]
struct SnapshotReport {
    snapshot_id: Uuid,
    captured_at: DateTime<Utc>,
    /// Staffing exactly as priced; store it with the snapshot to re-open the quote later.
    profiles: Vec<StaffingProfile>,
    snapshot: QuoteSnapshot,
}

pub fn run(spec_path: &Path, catalog: Option<&Path>) -> CommandResult {
    match build(spec_path, catalog) {
        Ok(report) => CommandResult::success_with_data(
            "snapshot",
            format!("captured {} priced line(s)", report.snapshot.lines.len()),
            &report,
        ),
        Err(error) => CommandResult::from_error("snapshot", &error),
    }
}

fn build(spec_path: &Path, catalog: Option<&Path>) -> Result<SnapshotReport, ApplicationError> {
    let context = PricingContext::load(catalog)?;
    let spec = read_specification(spec_path)?;
    let evaluation = context.runtime().evaluate(QuoteInput::live(&spec, &context.catalog));

    Ok(SnapshotReport {
        snapshot_id: Uuid::new_v4(),
        captured_at: Utc::now(),
        snapshot: QuoteSnapshot::from_breakdown(&evaluation.breakdown),
        profiles: evaluation.profiles,
    })
}
