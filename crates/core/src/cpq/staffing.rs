//! Staffing allocation: manual line editing plus auto-staffing from the technology stack.
//!
//! Auto-staffing only ever owns `Suggested` lines. Any manual edit confirms a line, and a
//! confirmed line is invisible to rebalancing for the rest of its life.

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::cpq::roles::{display_label, find_role, same_role};
use crate::cpq::sustain::SustainSubScores;
use crate::cpq::tech_stack::{suggestions_for, StaffingDomain};
use crate::domain::lenient;
use crate::domain::normalize_name;
use crate::domain::seniority::Seniority;
use crate::domain::spec::{ProjectSpecification, ServiceType, UsageFrequency};
use crate::domain::staffing::{ProfileId, Provenance, StaffingProfile};
use crate::errors::DomainError;

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StaffingPlan {
    profiles: Vec<StaffingProfile>,
}

impl StaffingPlan {
    pub fn new(profiles: Vec<StaffingProfile>) -> Self {
        Self { profiles }
    }

    pub fn profiles(&self) -> &[StaffingProfile] {
        &self.profiles
    }

    pub fn into_profiles(self) -> Vec<StaffingProfile> {
        self.profiles
    }

    pub fn get(&self, id: &ProfileId) -> Option<&StaffingProfile> {
        self.profiles.iter().find(|profile| &profile.id == id)
    }

    /// Adds a head to an identical line (role, seniority, allocation) or opens a new line.
    ///
    /// New lines are priced from `explicit_price`, else the role table times the seniority
    /// multiplier. Unknown roles without an explicit price start at zero and are priced later
    /// from the catalog, if it knows them.
    pub fn add_profile(
        &mut self,
        role: &str,
        seniority: Seniority,
        explicit_price: Option<Decimal>,
        allocation: Option<u8>,
    ) -> ProfileId {
        let allocation = allocation.unwrap_or(100).min(100);

        if let Some(existing) = self.profiles.iter_mut().find(|profile| {
            same_role(&profile.role, role)
                && profile.seniority == seniority
                && profile.allocation_percentage == allocation
        }) {
            existing.count = existing.count.saturating_add(1);
            existing.confirm();
            return existing.id.clone();
        }

        let unit_price = match explicit_price {
            Some(price) => lenient::clamp_money(price),
            None => match find_role(role) {
                Some(definition) => definition.price_for(seniority),
                None => {
                    tracing::warn!(
                        event_name = "staffing.profile.unpriced_role",
                        role,
                        "role is not configured and no explicit price was given"
                    );
                    Decimal::ZERO
                }
            },
        };

        let id = self.next_id(role, seniority);
        self.profiles.push(StaffingProfile {
            id: id.clone(),
            role: display_label(role),
            seniority,
            count: 1,
            unit_price,
            allocation_percentage: allocation,
            provenance: Provenance::Confirmed,
            rationale: String::new(),
        });
        id
    }

    pub fn set_count(&mut self, id: &ProfileId, count: u32) -> Result<(), DomainError> {
        let profile = self.profile_mut(id)?;
        profile.count = count;
        profile.confirm();
        Ok(())
    }

    pub fn increment(&mut self, id: &ProfileId) -> Result<(), DomainError> {
        let profile = self.profile_mut(id)?;
        profile.count = profile.count.saturating_add(1);
        profile.confirm();
        Ok(())
    }

    /// Removes one head; the line disappears when its count reaches zero.
    pub fn decrement(&mut self, id: &ProfileId) -> Result<(), DomainError> {
        let profile = self.profile_mut(id)?;
        profile.count = profile.count.saturating_sub(1);
        profile.confirm();
        if profile.count == 0 {
            self.profiles.retain(|profile| &profile.id != id);
        }
        Ok(())
    }

    /// Moves a line to another seniority, re-pricing it by the ratio of the multipliers.
    pub fn set_seniority(&mut self, id: &ProfileId, seniority: Seniority) -> Result<(), DomainError> {
        let profile = self.profile_mut(id)?;
        if profile.seniority != seniority {
            let base = lenient::saturating_div(profile.unit_price, profile.seniority.multiplier());
            profile.unit_price = lenient::saturating_mul(base, seniority.multiplier());
            profile.seniority = seniority;
        }
        profile.confirm();
        Ok(())
    }

    pub fn set_allocation(&mut self, id: &ProfileId, allocation: u8) -> Result<(), DomainError> {
        let profile = self.profile_mut(id)?;
        profile.allocation_percentage = allocation.min(100);
        profile.confirm();
        Ok(())
    }

    pub fn remove(&mut self, id: &ProfileId) -> Result<StaffingProfile, DomainError> {
        let index = self
            .profiles
            .iter()
            .position(|profile| &profile.id == id)
            .ok_or_else(|| DomainError::UnknownProfile(id.0.clone()))?;
        Ok(self.profiles.remove(index))
    }

    /// Applies auto-staffing targets without touching confirmed lines.
    pub fn reconcile(&mut self, targets: &[AllocationTarget]) -> ReconcileSummary {
        let mut summary = ReconcileSummary::default();

        for target in targets {
            let existing = self.profiles.iter_mut().find(|profile| {
                same_role(&profile.role, target.role) && profile.seniority == target.seniority
            });

            match existing {
                Some(profile) if profile.is_manual() => summary.locked += 1,
                Some(profile) => {
                    if profile.allocation_percentage != target.allocation {
                        profile.allocation_percentage = target.allocation;
                        summary.updated += 1;
                    }
                }
                None if target.allocation == 0 => {}
                None => {
                    let unit_price = find_role(target.role)
                        .map(|definition| definition.price_for(target.seniority))
                        .unwrap_or(Decimal::ZERO);
                    let id = self.next_id(target.role, target.seniority);
                    self.profiles.push(StaffingProfile {
                        id,
                        role: display_label(target.role),
                        seniority: target.seniority,
                        count: 1,
                        unit_price,
                        allocation_percentage: target.allocation,
                        provenance: Provenance::Suggested,
                        rationale: target.rationale.to_string(),
                    });
                    summary.created += 1;
                }
            }
        }

        summary
    }

    fn profile_mut(&mut self, id: &ProfileId) -> Result<&mut StaffingProfile, DomainError> {
        self.profiles
            .iter_mut()
            .find(|profile| &profile.id == id)
            .ok_or_else(|| DomainError::UnknownProfile(id.0.clone()))
    }

    fn next_id(&self, role: &str, seniority: Seniority) -> ProfileId {
        let base = format!("{}-{}", normalize_name(role), seniority.label().to_ascii_lowercase());
        (1..)
            .map(|sequence| ProfileId(format!("{base}-{sequence}")))
            .find(|candidate| self.get(candidate).is_none())
            .unwrap_or_else(|| ProfileId(base))
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReconcileSummary {
    pub created: usize,
    pub updated: usize,
    pub locked: usize,
}

pub fn frequency_multiplier(frequency: UsageFrequency) -> Decimal {
    match frequency {
        UsageFrequency::Realtime => Decimal::new(125, 2),
        UsageFrequency::Monthly => Decimal::new(75, 2),
        _ => Decimal::ONE,
    }
}

/// Percentage of a full-time head a domain score warrants: `min(100, ceil(score * 10))`.
pub fn suggested_allocation(score: Decimal) -> u8 {
    let scaled = (lenient::clamp_money(score) * Decimal::TEN).ceil();
    if scaled >= Decimal::ONE_HUNDRED {
        100
    } else {
        scaled.to_u8().unwrap_or(100)
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DomainScores {
    pub data: Decimal,
    pub vis: Decimal,
    pub sci: Decimal,
}

impl DomainScores {
    /// Data work follows pipelines, notebooks and dependencies; visualisation follows
    /// dashboards and manual reporting; data science follows models.
    pub fn from_sub_scores(scores: &SustainSubScores, frequency: UsageFrequency) -> Self {
        let multiplier = frequency_multiplier(frequency);
        let sum = |values: &[u8]| {
            Decimal::from(values.iter().map(|value| u32::from(*value)).sum::<u32>()) * multiplier
        };

        Self {
            data: sum(&[scores.pipelines, scores.notebooks, scores.dependencies]),
            vis: sum(&[scores.dashboards, scores.manual_process]),
            sci: sum(&[scores.models]),
        }
    }

    pub fn score(&self, domain: StaffingDomain) -> Decimal {
        match domain {
            StaffingDomain::Data => self.data,
            StaffingDomain::Vis => self.vis,
            StaffingDomain::Sci => self.sci,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AllocationTarget {
    pub role: &'static str,
    pub seniority: Seniority,
    pub rationale: &'static str,
    pub domain: StaffingDomain,
    pub allocation: u8,
}

/// Auto-staffing targets for a sustain engagement, deduplicated by (role, seniority).
pub fn allocation_targets(spec: &ProjectSpecification) -> Vec<AllocationTarget> {
    if spec.service_type != ServiceType::Sustain {
        return Vec::new();
    }

    let matrix = &spec.sustain.criticality;
    let sub_scores = SustainSubScores::from_inputs(spec.metrics.for_service(ServiceType::Sustain), matrix);
    let domains = DomainScores::from_sub_scores(&sub_scores, matrix.frequency);

    let mut targets: Vec<AllocationTarget> = Vec::new();
    for technology in &spec.tech_stack {
        for suggestion in suggestions_for(technology) {
            let Some(domain) = suggestion.domain else {
                continue;
            };
            let duplicate = targets.iter().any(|target| {
                target.role == suggestion.role && target.seniority == suggestion.seniority
            });
            if duplicate {
                continue;
            }
            targets.push(AllocationTarget {
                role: suggestion.role,
                seniority: suggestion.seniority,
                rationale: suggestion.rationale,
                domain,
                allocation: suggested_allocation(domains.score(domain)),
            });
        }
    }

    targets
}

/// The specification's profiles after auto-staffing; non-sustain engagements pass through.
pub fn reconcile_auto_staffing(spec: &ProjectSpecification) -> Vec<StaffingProfile> {
    let mut plan = StaffingPlan::new(spec.profiles.clone());
    let targets = allocation_targets(spec);
    if targets.is_empty() {
        return plan.into_profiles();
    }

    let summary = plan.reconcile(&targets);
    tracing::info!(
        event_name = "staffing.auto.reconciled",
        created = summary.created,
        updated = summary.updated,
        locked = summary.locked,
        "auto-staffing reconciled"
    );
    plan.into_profiles()
}
