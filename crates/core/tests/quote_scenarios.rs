use rust_decimal::Decimal;
use serde_json::json;
use staffquote_core::cpq::staffing::StaffingPlan;
use staffquote_core::cpq::sustain::tier_for_score;
use staffquote_core::domain::spec::{Complexity, EngagementDuration, UsageFrequency};
use staffquote_core::{
    compute_breakdown, reconcile_auto_staffing, CostBreakdown, DeterministicQuoteRuntime,
    FrozenRateIndex, ProjectSpecification, Provenance, QuoteInput, QuoteRuntime, QuoteSnapshot,
    RateCatalog, RateCatalogEntry, RateSource, Seniority, ServiceType, SustainTier,
};

fn catalog(entries: &[(&str, &str, i64)]) -> RateCatalog {
    RateCatalog::new(
        entries
            .iter()
            .map(|(service, level, price)| {
                RateCatalogEntry::new(*service, *level, Decimal::from(*price), Decimal::ONE)
            })
            .collect(),
    )
}

fn priced_figures(breakdown: &CostBreakdown) -> Vec<Decimal> {
    let mut figures = vec![
        breakdown.roles_cost,
        breakdown.services_cost,
        breakdown.l2_support_cost,
        breakdown.risk_cost,
        breakdown.discount_amount,
        breakdown.gross_total,
        breakdown.retention_amount,
        breakdown.final_total,
        breakdown.hypercare_cost,
        breakdown.total_project_cost,
    ];
    figures.extend(breakdown.role_lines.iter().map(|line| line.total));
    figures.extend(breakdown.service_lines.iter().map(|line| line.total));
    figures
}

fn staffing_spec() -> ProjectSpecification {
    serde_json::from_value(json!({
        "service_type": "staffing",
        "profiles": [{
            "id": "data_engineer-sr-1",
            "role": "Data Engineer",
            "seniority": "Sr",
            "count": 2,
            "unit_price": 6440.77,
            "allocation_percentage": 100
        }]
    }))
    .expect("staffing spec parses")
}

fn legacy_project_spec() -> ProjectSpecification {
    serde_json::from_value(json!({
        "service_type": "project",
        "complexity": "high",
        "role_counts": { "data_engineer": 1 },
        "metrics": { "project": { "pipelines": 2 } },
        "commercial_discount": 10
    }))
    .expect("project spec parses")
}

fn sustain_spec() -> ProjectSpecification {
    let mut spec = ProjectSpecification::new(ServiceType::Sustain);
    spec.metrics.sustain.pipelines = 7;
    spec.metrics.sustain.dashboards = 4;
    spec.sustain.criticality.frequency = UsageFrequency::Daily;
    spec.sustain.criticality.dependencies = "sap, salesforce".to_string();
    spec.sustain.criticality.users_impacted = 120;
    spec.tech_stack.extend(["airflow".to_string(), "power_bi".to_string()]);
    spec
}

#[test]
fn staffing_single_profile_scenario() {
    let breakdown = compute_breakdown(&staffing_spec(), &RateCatalog::empty(), None);

    assert_eq!(breakdown.roles_cost, Decimal::new(1_288_154, 2));
    assert_eq!(breakdown.services_cost, Decimal::ZERO);
    assert_eq!(breakdown.l2_support_cost, Decimal::ZERO);
    assert_eq!(breakdown.final_total, Decimal::new(1_288_154, 2));
}

#[test]
fn project_legacy_counters_scenario() {
    let catalog = catalog(&[("Data Engineer", "Med", 4_000)]);
    let breakdown = compute_breakdown(&legacy_project_spec(), &catalog, None);

    assert_eq!(breakdown.roles_cost, Decimal::from(6_000));
    assert_eq!(breakdown.services_cost, Decimal::from(5_000));
    assert_eq!(breakdown.l2_support_cost, Decimal::from(1_100));
    assert_eq!(breakdown.gross_total, Decimal::from(12_100));
    assert_eq!(breakdown.discount_amount, Decimal::from(1_210));
    assert_eq!(breakdown.final_total, Decimal::from(10_890));
}

#[test]
fn sustain_pending_scenario() {
    let spec = ProjectSpecification::new(ServiceType::Sustain);
    let breakdown = compute_breakdown(&spec, &RateCatalog::empty(), None);
    let score = breakdown.sustain.as_ref().expect("sustain score present");

    assert_eq!(score.total, Decimal::ZERO);
    assert_eq!(score.tier, SustainTier::Pending);
    assert_eq!(breakdown.services_cost, Decimal::ZERO);
    assert_eq!(breakdown.final_total, breakdown.roles_cost);
    assert_eq!(breakdown.final_total, Decimal::ZERO);
}

#[test]
fn hypercare_scenario() {
    let mut spec = ProjectSpecification::new(ServiceType::Sustain);
    spec.metrics.sustain.pipelines = 1;
    spec.duration = EngagementDuration::months(Decimal::from(3));
    spec.sustain.operations.has_hypercare = true;
    let mut plan = StaffingPlan::default();
    plan.add_profile("Support Analyst", Seniority::Med, Some(Decimal::from(2_000)), None);
    spec.profiles = plan.into_profiles();

    let breakdown = compute_breakdown(&spec, &RateCatalog::empty(), None);

    assert_eq!(breakdown.sustain.as_ref().map(|score| score.tier), Some(SustainTier::S1));
    assert_eq!(breakdown.roles_cost, Decimal::from(2_000));
    assert_eq!(breakdown.final_total, Decimal::from(7_000));
    assert_eq!(breakdown.hypercare_cost, Decimal::from(7_000));
    assert_eq!(breakdown.total_project_cost, Decimal::from(28_000));
}

#[test]
fn sustain_tier_boundaries() {
    assert_eq!(tier_for_score(Decimal::new(26, 1)), SustainTier::S2);
    assert_eq!(tier_for_score(Decimal::new(259, 2)), SustainTier::S1);
    assert_eq!(tier_for_score(Decimal::ZERO), SustainTier::Pending);
    assert_eq!(SustainTier::Pending.base_cost(), Decimal::ZERO);
}

#[test]
fn repeated_evaluation_is_bit_identical() {
    let catalog = catalog(&[("Data Engineer", "Sr", 6_100), ("Pipe", "Alta", 2_700)]);
    let runtime = DeterministicQuoteRuntime::default();

    for spec in [staffing_spec(), legacy_project_spec(), sustain_spec()] {
        let first = runtime.evaluate(QuoteInput::live(&spec, &catalog));
        let second = runtime.evaluate(QuoteInput::live(&spec, &catalog));
        assert_eq!(first, second);
        assert_eq!(
            compute_breakdown(&spec, &catalog, None),
            compute_breakdown(&spec, &catalog, None)
        );
    }
}

#[test]
fn frozen_quotes_ignore_catalog_changes() {
    let issued_catalog = catalog(&[
        ("Data Engineer", "Med", 4_000),
        ("Data Engineer", "Sr", 6_000),
        ("BI Developer", "Med", 4_400),
        ("Pipe", "Alta", 2_600),
    ]);
    let repriced_catalog = catalog(&[
        ("Data Engineer", "Med", 9_000),
        ("Data Engineer", "Sr", 9_500),
        ("BI Developer", "Med", 9_900),
        ("Pipe", "Alta", 7_000),
        ("Dataset", "standard", 7_000),
    ]);
    let runtime = DeterministicQuoteRuntime::default();

    let mut sustain = sustain_spec();
    sustain.profiles = reconcile_auto_staffing(&sustain);

    for spec in [staffing_spec(), legacy_project_spec(), sustain] {
        let issued = runtime.evaluate(QuoteInput::live(&spec, &issued_catalog));
        let snapshot = QuoteSnapshot::from_breakdown(&issued.breakdown);
        let frozen = FrozenRateIndex::build(&snapshot);

        let reopened = compute_breakdown(&spec, &repriced_catalog, Some(&frozen));
        assert_eq!(priced_figures(&reopened), priced_figures(&issued.breakdown));

        // Profiles carry their own snapshotted prices; legacy counters read the catalog.
        if spec.profiles.is_empty() {
            let live = compute_breakdown(&spec, &repriced_catalog, None);
            assert_ne!(live.final_total, issued.breakdown.final_total);
        }
    }
}

#[test]
fn frozen_lines_sharing_role_and_seniority_keep_their_own_rates() {
    let mut spec = ProjectSpecification::new(ServiceType::Staffing);
    let mut plan = StaffingPlan::default();
    plan.add_profile("data_engineer", Seniority::Sr, Some(Decimal::from(8_000)), None);
    plan.add_profile("data_engineer", Seniority::Sr, None, Some(50));
    spec.profiles = plan.into_profiles();

    let issued = compute_breakdown(&spec, &RateCatalog::empty(), None);
    assert_eq!(issued.final_total, Decimal::new(1_122_039, 2));

    let frozen = FrozenRateIndex::build(&QuoteSnapshot::from_breakdown(&issued));
    let reopened = compute_breakdown(&spec, &RateCatalog::empty(), Some(&frozen));

    assert_eq!(priced_figures(&reopened), priced_figures(&issued));
    assert!(reopened.role_lines.iter().all(|line| line.source == RateSource::Frozen));
}

#[test]
fn oversized_prices_saturate_instead_of_panicking() {
    let spec: ProjectSpecification = serde_json::from_value(json!({
        "service_type": "staffing",
        "profiles": [{
            "id": "data_engineer-sr-1",
            "role": "Data Engineer",
            "seniority": "Sr",
            "count": 3,
            "unit_price": "50000000000000000000000000000"
        }]
    }))
    .expect("staffing spec parses");

    let breakdown = compute_breakdown(&spec, &RateCatalog::empty(), None);
    assert_eq!(breakdown.role_lines[0].total, Decimal::MAX);
    assert_eq!(breakdown.final_total, Decimal::MAX);
    assert_eq!(breakdown.total_project_cost, Decimal::MAX);

    let frozen = FrozenRateIndex::build(&QuoteSnapshot::from_breakdown(&breakdown));
    let reopened = compute_breakdown(&spec, &RateCatalog::empty(), Some(&frozen));
    assert_eq!(reopened.final_total, Decimal::MAX);
}

#[test]
fn snapshot_document_round_trips_through_json() {
    let catalog = catalog(&[("Data Engineer", "Med", 4_000)]);
    let issued = compute_breakdown(&legacy_project_spec(), &catalog, None);
    let persisted =
        serde_json::to_string(&QuoteSnapshot::from_breakdown(&issued)).expect("snapshot encodes");

    let restored: QuoteSnapshot = serde_json::from_str(&persisted).expect("snapshot decodes");
    let reopened =
        compute_breakdown(&legacy_project_spec(), &RateCatalog::empty(), Some(&FrozenRateIndex::build(&restored)));
    assert_eq!(reopened.final_total, Decimal::from(10_890));
}

#[test]
fn confirmed_lines_survive_any_metric_or_stack_change() {
    let mut spec = sustain_spec();
    let mut plan = StaffingPlan::new(reconcile_auto_staffing(&spec));
    let engineer = plan
        .profiles()
        .iter()
        .find(|profile| profile.role == "Data Engineer")
        .map(|profile| profile.id.clone())
        .expect("auto-staffed engineer");
    plan.set_count(&engineer, 3).expect("engineer exists");
    plan.set_allocation(&engineer, 55).expect("engineer exists");
    let locked = plan.get(&engineer).cloned().expect("engineer exists");
    assert_eq!(locked.provenance, Provenance::Confirmed);
    spec.profiles = plan.into_profiles();

    let mutations: [fn(&mut ProjectSpecification); 4] = [
        |spec| spec.metrics.sustain.pipelines = 40,
        |spec| spec.sustain.criticality.frequency = UsageFrequency::Realtime,
        |spec| {
            spec.tech_stack.insert("spark".to_string());
        },
        |spec| {
            spec.metrics.sustain.pipelines = 0;
            spec.sustain.criticality.dependencies.clear();
        },
    ];

    for mutate in mutations {
        mutate(&mut spec);
        spec.profiles = reconcile_auto_staffing(&spec);
        let current = spec
            .profiles
            .iter()
            .find(|profile| profile.id == engineer)
            .expect("confirmed line is never dropped");
        assert_eq!(current.count, locked.count);
        assert_eq!(current.seniority, locked.seniority);
        assert_eq!(current.allocation_percentage, locked.allocation_percentage);
    }
}

#[test]
fn discount_and_retention_never_raise_the_final_total() {
    let catalog = catalog(&[("Data Engineer", "Med", 4_000)]);
    let mut spec = legacy_project_spec();
    spec.complexity = Complexity::Medium;

    let mut previous = None;
    for discount in (0..=100).step_by(5) {
        spec.commercial_discount = Decimal::from(discount);
        let total = compute_breakdown(&spec, &catalog, None).final_total;
        if let Some(previous) = previous {
            assert!(total <= previous, "discount {discount}% raised the total");
        }
        previous = Some(total);
    }

    spec.commercial_discount = Decimal::from(15);
    spec.retention.enabled = true;
    let mut previous = None;
    for retention in (0..=100).step_by(10) {
        spec.retention.percentage = Decimal::from(retention);
        let total = compute_breakdown(&spec, &catalog, None).final_total;
        if let Some(previous) = previous {
            assert!(total <= previous, "retention {retention}% raised the total");
        }
        previous = Some(total);
    }
}
