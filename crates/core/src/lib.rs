pub mod config;
pub mod cpq;
pub mod documents;
pub mod domain;
pub mod errors;

pub use cpq::cache::MemoizedQuoteRuntime;
pub use cpq::catalog::{RateCatalog, ResolutionStrategy};
pub use cpq::currency::{FxTable, PresentedBreakdown};
pub use cpq::freezer::{build_frozen_index, FrozenRateIndex, PersistedLine, QuoteSnapshot};
pub use cpq::pricing::{compute_breakdown, CostBreakdown, CostLine, PricingTraceStep};
pub use cpq::rates::{resolve_rate, RateSource};
pub use cpq::staffing::{reconcile_auto_staffing, StaffingPlan};
pub use cpq::sustain::{compute_sustain_score, SustainScore, SustainTier};
pub use cpq::{DeterministicQuoteRuntime, QuoteEvaluation, QuoteInput, QuoteRuntime};
pub use domain::rate::RateCatalogEntry;
pub use domain::seniority::Seniority;
pub use domain::spec::{ProjectSpecification, ServiceType};
pub use domain::staffing::{ProfileId, Provenance, StaffingProfile};
pub use errors::{ApplicationError, DomainError};
