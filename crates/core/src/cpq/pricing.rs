use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

use crate::cpq::catalog::RateCatalog;
use crate::cpq::freezer::FrozenRateIndex;
use crate::cpq::rates::{RateContext, RateSource};
use crate::cpq::roles::display_label;
use crate::cpq::sustain::{compute_sustain_score, SustainScore};
use crate::domain::lenient::{saturating_add, saturating_mul};
use crate::domain::seniority::Seniority;
use crate::domain::spec::{ProjectSpecification, ServiceType, VolumeMetrics};

/// Second-line support uplift over roles plus services.
pub const L2_SUPPORT_RATE: Decimal = Decimal::from_parts(10, 0, 0, false, 2);
/// Weekend coverage surcharge over the sustain tier base.
pub const WEEKEND_SURCHARGE_RATE: Decimal = Decimal::from_parts(15, 0, 0, false, 3);

/// Billable deliverables priced per unit on project engagements.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ServiceUnit {
    Pipeline,
    Notebook,
    Dashboard,
    MlModel,
}

impl ServiceUnit {
    pub const ALL: [Self; 4] = [Self::Pipeline, Self::Notebook, Self::Dashboard, Self::MlModel];

    /// Service name the rate catalog prices this unit under.
    pub fn catalog_name(self) -> &'static str {
        match self {
            Self::Pipeline => "Pipe",
            Self::Notebook => "Dataset",
            Self::Dashboard => "Dashboard",
            Self::MlModel => "Algoritmo",
        }
    }

    pub fn default_rate(self) -> Decimal {
        match self {
            Self::Pipeline => Decimal::from(2_500),
            Self::Notebook => Decimal::from(2_000),
            Self::Dashboard => Decimal::from(5_000),
            Self::MlModel => Decimal::from(8_000),
        }
    }

    pub fn count(self, metrics: &VolumeMetrics) -> u32 {
        match self {
            Self::Pipeline => metrics.pipelines,
            Self::Notebook => metrics.notebooks,
            Self::Dashboard => metrics.dashboards,
            Self::MlModel => metrics.ml_models,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CostLine {
    pub name: String,
    /// Seniority for roles, complexity level for service units.
    pub level: String,
    pub count: u32,
    pub allocation_percentage: u8,
    pub unit_rate: Decimal,
    pub total: Decimal,
    pub source: RateSource,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PricingTraceStep {
    pub stage: String,
    pub detail: String,
    pub amount: Decimal,
}

/// USD cost breakdown of one specification. Always complete; never partially updated.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CostBreakdown {
    pub service_type: ServiceType,
    pub roles_cost: Decimal,
    pub services_cost: Decimal,
    pub l2_support_cost: Decimal,
    pub risk_cost: Decimal,
    pub discount_amount: Decimal,
    pub gross_total: Decimal,
    pub retention_amount: Decimal,
    /// Recurring monthly figure.
    pub final_total: Decimal,
    pub duration_months: Decimal,
    pub hypercare_cost: Decimal,
    pub total_project_cost: Decimal,
    pub sustain: Option<SustainScore>,
    pub role_lines: Vec<CostLine>,
    pub service_lines: Vec<CostLine>,
    pub trace: Vec<PricingTraceStep>,
}

pub trait PricingEngine: Send + Sync {
    fn price(
        &self,
        spec: &ProjectSpecification,
        catalog: &RateCatalog,
        frozen: Option<&FrozenRateIndex>,
    ) -> CostBreakdown;
}

#[derive(Clone, Copy, Debug, Default)]
pub struct DeterministicPricingEngine;

impl PricingEngine for DeterministicPricingEngine {
    fn price(
        &self,
        spec: &ProjectSpecification,
        catalog: &RateCatalog,
        frozen: Option<&FrozenRateIndex>,
    ) -> CostBreakdown {
        compute_breakdown(spec, catalog, frozen)
    }
}

fn money(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

fn percent_of(amount: Decimal, percentage: Decimal) -> Decimal {
    money(saturating_mul(amount, percentage / Decimal::ONE_HUNDRED))
}

fn sum(amounts: impl IntoIterator<Item = Decimal>) -> Decimal {
    amounts.into_iter().fold(Decimal::ZERO, saturating_add)
}

fn step(stage: &str, detail: impl Into<String>, amount: Decimal) -> PricingTraceStep {
    PricingTraceStep { stage: stage.to_string(), detail: detail.into(), amount }
}

struct RoleCosts {
    lines: Vec<CostLine>,
    subtotal: Decimal,
    legacy: bool,
}

fn price_roles(spec: &ProjectSpecification, context: &RateContext<'_>) -> RoleCosts {
    let mut lines = Vec::new();
    let legacy = spec.profiles.is_empty() && spec.service_type == ServiceType::Project;

    if !spec.profiles.is_empty() {
        for profile in &spec.profiles {
            let resolved = context.role_rate(
                &profile.role,
                profile.seniority,
                profile.allocation_percentage,
                Some(profile.unit_price),
            );
            let billed = saturating_mul(resolved.rate, Decimal::from(profile.count));
            let total = money(saturating_mul(billed, profile.allocation_fraction()));
            lines.push(CostLine {
                name: profile.role.clone(),
                level: profile.seniority.label().to_string(),
                count: profile.count,
                allocation_percentage: profile.allocation_percentage,
                unit_rate: resolved.rate,
                total,
                source: resolved.source,
            });
        }
    } else if legacy {
        for (role, count) in spec.role_counts.iter().filter(|(_, count)| **count > 0) {
            let resolved = context.role_rate(role, Seniority::Med, 100, None);
            lines.push(CostLine {
                name: display_label(role),
                level: Seniority::Med.label().to_string(),
                count: *count,
                allocation_percentage: 100,
                unit_rate: resolved.rate,
                total: money(saturating_mul(resolved.rate, Decimal::from(*count))),
                source: resolved.source,
            });
        }
    }

    let subtotal = sum(lines.iter().map(|line| line.total));
    RoleCosts { lines, subtotal, legacy }
}

fn price_service_units(spec: &ProjectSpecification, context: &RateContext<'_>) -> Vec<CostLine> {
    let level = spec.complexity.catalog_level();
    let metrics = spec.active_metrics();

    ServiceUnit::ALL
        .into_iter()
        .filter_map(|unit| {
            let count = unit.count(metrics);
            if count == 0 {
                return None;
            }
            let resolved = context.service_rate(unit.catalog_name(), level, unit.default_rate());
            Some(CostLine {
                name: unit.catalog_name().to_string(),
                level: level.to_string(),
                count,
                allocation_percentage: 100,
                unit_rate: resolved.rate,
                total: money(saturating_mul(resolved.rate, Decimal::from(count))),
                source: resolved.source,
            })
        })
        .collect()
}

/// Prices a specification. Pass a frozen index when re-opening an issued quote.
pub fn compute_breakdown(
    spec: &ProjectSpecification,
    catalog: &RateCatalog,
    frozen: Option<&FrozenRateIndex>,
) -> CostBreakdown {
    let context = RateContext { catalog, frozen };
    let roles = price_roles(spec, &context);

    let breakdown = match spec.service_type {
        ServiceType::Sustain => sustain_breakdown(spec, roles),
        ServiceType::Project | ServiceType::Staffing => standard_breakdown(spec, &context, roles),
    };

    tracing::debug!(
        event_name = "pricing.breakdown.computed",
        service_type = spec.service_type.as_str(),
        historical = frozen.is_some(),
        final_total = %breakdown.final_total,
        total_project_cost = %breakdown.total_project_cost,
        "cost breakdown computed"
    );

    breakdown
}

fn standard_breakdown(
    spec: &ProjectSpecification,
    context: &RateContext<'_>,
    roles: RoleCosts,
) -> CostBreakdown {
    let staffing = spec.service_type == ServiceType::Staffing;
    let mut trace = Vec::new();

    let roles_cost = if roles.legacy {
        let modifier = spec.complexity.modifier();
        let cost = money(saturating_mul(roles.subtotal, modifier));
        trace.push(step(
            "roles",
            format!("legacy role counters at Med x complexity modifier {modifier}"),
            cost,
        ));
        cost
    } else {
        trace.push(step("roles", "sum(unit_rate * count * allocation)", roles.subtotal));
        roles.subtotal
    };

    let service_lines = if staffing { Vec::new() } else { price_service_units(spec, context) };
    let services_cost = sum(service_lines.iter().map(|line| line.total));
    trace.push(step(
        "services",
        if staffing { "not billed for staffing engagements" } else { "sum(unit_rate * count)" },
        services_cost,
    ));

    let l2_support_cost = if staffing {
        Decimal::ZERO
    } else {
        money(saturating_mul(saturating_add(roles_cost, services_cost), L2_SUPPORT_RATE))
    };
    trace.push(step("l2_support", "10% of roles + services", l2_support_cost));

    let risk_cost = Decimal::ZERO;
    let gross_total = sum([roles_cost, services_cost, l2_support_cost, risk_cost]);
    trace.push(step("gross_total", "roles + services + l2 + risk", gross_total));

    let discount_amount = percent_of(gross_total, spec.discount_percentage());
    let discounted_total = gross_total - discount_amount;
    trace.push(step(
        "discount",
        format!("{}% commercial discount", spec.discount_percentage()),
        discount_amount,
    ));

    let retention_amount = percent_of(discounted_total, spec.retention_percentage());
    let final_total = discounted_total - retention_amount;
    trace.push(step(
        "retention",
        format!("{}% retention", spec.retention_percentage()),
        retention_amount,
    ));
    trace.push(step("final_total", "gross - discount - retention", final_total));

    let duration_months = spec.duration.in_months();
    let total_project_cost = money(saturating_mul(final_total, duration_months));
    trace.push(step("total_project_cost", "final_total * duration_months", total_project_cost));

    CostBreakdown {
        service_type: spec.service_type,
        roles_cost,
        services_cost,
        l2_support_cost,
        risk_cost,
        discount_amount,
        gross_total,
        retention_amount,
        final_total,
        duration_months: duration_months.round_dp(4),
        hypercare_cost: Decimal::ZERO,
        total_project_cost,
        sustain: None,
        role_lines: roles.lines,
        service_lines,
        trace,
    }
}

fn sustain_breakdown(spec: &ProjectSpecification, roles: RoleCosts) -> CostBreakdown {
    let operations = &spec.sustain.operations;
    let score = compute_sustain_score(spec);
    let tier_base = score.tier_base_cost;
    let mut trace = Vec::new();

    let coverage = operations.support_window.coverage_modifier();
    let roles_cost = money(saturating_mul(roles.subtotal, coverage));
    trace.push(step("roles", format!("role sum x coverage modifier {coverage}"), roles_cost));

    let services_cost = tier_base;
    trace.push(step("services", format!("{} tier base fee", score.tier.label()), services_cost));

    let risk_cost = if operations.weekend_usage {
        money(saturating_mul(tier_base, WEEKEND_SURCHARGE_RATE))
    } else {
        Decimal::ZERO
    };
    trace.push(step("weekend_surcharge", "1.5% of tier base when weekends are covered", risk_cost));

    let final_total = sum([services_cost, roles_cost, risk_cost]);
    trace.push(step("final_total", "tier base + roles + weekend surcharge", final_total));

    let hypercare_cost = if operations.has_hypercare {
        saturating_add(tier_base, roles_cost)
    } else {
        Decimal::ZERO
    };
    trace.push(step("hypercare", "one extra month of tier base + roles", hypercare_cost));

    let duration_months = spec.duration.in_months();
    let total_project_cost =
        money(saturating_add(saturating_mul(final_total, duration_months), hypercare_cost));
    trace.push(step(
        "total_project_cost",
        "final_total * duration_months + hypercare",
        total_project_cost,
    ));

    CostBreakdown {
        service_type: ServiceType::Sustain,
        roles_cost,
        services_cost,
        l2_support_cost: Decimal::ZERO,
        risk_cost,
        discount_amount: Decimal::ZERO,
        gross_total: final_total,
        retention_amount: Decimal::ZERO,
        final_total,
        duration_months: duration_months.round_dp(4),
        hypercare_cost,
        total_project_cost,
        sustain: Some(score),
        role_lines: roles.lines,
        service_lines: Vec::new(),
        trace,
    }
}
