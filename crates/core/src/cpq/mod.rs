pub mod cache;
pub mod catalog;
pub mod currency;
pub mod freezer;
pub mod pricing;
pub mod rates;
pub mod roles;
pub mod staffing;
pub mod sustain;
pub mod tech_stack;

use serde::{Deserialize, Serialize};

use crate::domain::spec::ProjectSpecification;
use crate::domain::staffing::StaffingProfile;

use self::{
    catalog::RateCatalog,
    freezer::FrozenRateIndex,
    pricing::{CostBreakdown, DeterministicPricingEngine, PricingEngine},
    staffing::reconcile_auto_staffing,
};

/// Everything one pricing pass reads. All three are immutable snapshots.
#[derive(Clone, Copy, Debug, Serialize)]
pub struct QuoteInput<'a> {
    pub spec: &'a ProjectSpecification,
    pub catalog: &'a RateCatalog,
    pub frozen: Option<&'a FrozenRateIndex>,
}

impl<'a> QuoteInput<'a> {
    pub fn live(spec: &'a ProjectSpecification, catalog: &'a RateCatalog) -> Self {
        Self { spec, catalog, frozen: None }
    }

    pub fn historical(
        spec: &'a ProjectSpecification,
        catalog: &'a RateCatalog,
        frozen: &'a FrozenRateIndex,
    ) -> Self {
        Self { spec, catalog, frozen: Some(frozen) }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuoteEvaluation {
    /// Staffing lines after auto-staffing, ready to be written back to the specification.
    pub profiles: Vec<StaffingProfile>,
    pub breakdown: CostBreakdown,
}

pub trait QuoteRuntime: Send + Sync {
    fn evaluate(&self, input: QuoteInput<'_>) -> QuoteEvaluation;
}

pub struct DeterministicQuoteRuntime<P> {
    pricing_engine: P,
}

impl<P> DeterministicQuoteRuntime<P> {
    pub fn new(pricing_engine: P) -> Self {
        Self { pricing_engine }
    }
}

impl Default for DeterministicQuoteRuntime<DeterministicPricingEngine> {
    fn default() -> Self {
        Self::new(DeterministicPricingEngine)
    }
}

impl<P> QuoteRuntime for DeterministicQuoteRuntime<P>
where
    P: PricingEngine,
{
    fn evaluate(&self, input: QuoteInput<'_>) -> QuoteEvaluation {
        // Historical views price the staffing exactly as it was issued.
        if input.frozen.is_some() {
            let breakdown = self.pricing_engine.price(input.spec, input.catalog, input.frozen);
            return QuoteEvaluation { profiles: input.spec.profiles.clone(), breakdown };
        }

        let profiles = reconcile_auto_staffing(input.spec);
        let mut staffed = input.spec.clone();
        staffed.profiles = profiles;
        let breakdown = self.pricing_engine.price(&staffed, input.catalog, None);

        QuoteEvaluation { profiles: staffed.profiles, breakdown }
    }
}
