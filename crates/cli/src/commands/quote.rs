use std::path::PathBuf;

use serde::Serialize;
use staffquote_core::cpq::currency::{format, FxTable};
use staffquote_core::documents::{read_snapshot, read_specification};
use staffquote_core::errors::ApplicationError;
use staffquote_core::{
    build_frozen_index, CostBreakdown, FrozenRateIndex, PresentedBreakdown, QuoteInput,
    QuoteRuntime, StaffingProfile,
};

use crate::commands::context::PricingContext;
use crate::commands::CommandResult;

#[derive(Clone, Debug, Default)]
pub struct QuoteArgs {
    pub spec: PathBuf,
    pub catalog: Option<PathBuf>,
    pub snapshot: Option<PathBuf>,
    pub currency: Option<String>,
    pub json: bool,
}

#[derive(Debug, Serialize)]
struct QuoteReport {
    historical: bool,
    frozen_rates: usize,
    profiles: Vec<StaffingProfile>,
    breakdown: CostBreakdown,
    presented: PresentedBreakdown,
}

pub fn run(args: &QuoteArgs) -> CommandResult {
    match build_report(args) {
        Ok(report) if args.json => CommandResult::success_with_data(
            "quote",
            format!("priced {} engagement", report.breakdown.service_type.as_str()),
            &report,
        ),
        Ok(report) => CommandResult { exit_code: 0, output: render_human(&report) },
        Err(error) => CommandResult::from_error("quote", &error),
    }
}

fn build_report(args: &QuoteArgs) -> Result<QuoteReport, ApplicationError> {
    let context = PricingContext::load(args.catalog.as_deref())?;
    let spec = read_specification(&args.spec)?;
    let frozen = match &args.snapshot {
        Some(path) => Some(build_frozen_index(&read_snapshot(path)?)),
        None => None,
    };

    let runtime = context.runtime();
    let input = match &frozen {
        Some(frozen) => QuoteInput::historical(&spec, &context.catalog, frozen),
        None => QuoteInput::live(&spec, &context.catalog),
    };
    let evaluation = runtime.evaluate(input);

    let fx_table = context.config.fx_table();
    let currency =
        args.currency.clone().unwrap_or_else(|| context.config.pricing.default_currency.clone());
    if !fx_table.contains(&currency) {
        tracing::warn!(
            event_name = "cli.quote.unknown_currency",
            currency = %currency,
            "no FX rate for currency, presenting at parity"
        );
    }
    let presented = PresentedBreakdown::present(&evaluation.breakdown, &currency, &fx_table);

    tracing::info!(
        event_name = "cli.quote.priced",
        service_type = evaluation.breakdown.service_type.as_str(),
        historical = frozen.is_some(),
        final_total = %evaluation.breakdown.final_total,
        "quote priced"
    );

    Ok(QuoteReport {
        historical: frozen.is_some(),
        frozen_rates: frozen.as_ref().map_or(0, FrozenRateIndex::len),
        profiles: evaluation.profiles,
        breakdown: evaluation.breakdown,
        presented,
    })
}

fn render_human(report: &QuoteReport) -> String {
    let breakdown = &report.breakdown;
    let presented = &report.presented;
    let usd = FxTable::fallback();
    let mode = if report.historical { "frozen rates" } else { "live rates" };

    let mut lines =
        vec![format!("quote: {} engagement ({mode})", breakdown.service_type.as_str())];

    let figures = [
        ("roles_cost", breakdown.roles_cost),
        ("services_cost", breakdown.services_cost),
        ("l2_support_cost", breakdown.l2_support_cost),
        ("risk_cost", breakdown.risk_cost),
        ("gross_total", breakdown.gross_total),
        ("discount_amount", breakdown.discount_amount),
        ("retention_amount", breakdown.retention_amount),
        ("final_total", breakdown.final_total),
        ("hypercare_cost", breakdown.hypercare_cost),
        ("total_project_cost", breakdown.total_project_cost),
    ];
    for (name, amount) in figures {
        lines.push(format!("- {name} = {}", format(amount, "USD", &usd)));
    }

    if let Some(score) = &breakdown.sustain {
        lines.push(format!("- sustain_tier = {} (score {})", score.tier_label, score.total));
    }
    for line in breakdown.role_lines.iter().chain(breakdown.service_lines.iter()) {
        lines.push(format!(
            "  * {} [{}] x{} @ {}% -> {}",
            line.name,
            line.level,
            line.count,
            line.allocation_percentage,
            format(line.total, "USD", &usd)
        ));
    }

    if presented.currency != "USD" {
        lines.push(format!(
            "- final_total ({}) = {}",
            presented.currency, presented.final_total_display
        ));
        lines.push(format!(
            "- total_project_cost ({}) = {}",
            presented.currency, presented.total_project_cost_display
        ));
    }

    lines.join("\n")
}
