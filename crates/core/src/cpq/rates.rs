use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::cpq::catalog::{RateCatalog, ResolutionStrategy};
use crate::cpq::freezer::FrozenRateIndex;
use crate::cpq::roles::find_role;
use crate::domain::seniority::Seniority;

/// Where a priced line got its unit rate from.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "strategy", rename_all = "snake_case")]
pub enum RateSource {
    Frozen,
    Profile,
    Catalog(ResolutionStrategy),
    Default,
    Unresolved,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ResolvedRate {
    pub rate: Decimal,
    pub source: RateSource,
}

impl ResolvedRate {
    fn unresolved() -> Self {
        Self { rate: Decimal::ZERO, source: RateSource::Unresolved }
    }
}

/// Live catalog plus, for historical quotes, the frozen rates that shadow it.
#[derive(Clone, Copy, Debug)]
pub struct RateContext<'a> {
    pub catalog: &'a RateCatalog,
    pub frozen: Option<&'a FrozenRateIndex>,
}

impl<'a> RateContext<'a> {
    pub fn live(catalog: &'a RateCatalog) -> Self {
        Self { catalog, frozen: None }
    }

    pub fn historical(catalog: &'a RateCatalog, frozen: &'a FrozenRateIndex) -> Self {
        Self { catalog, frozen: Some(frozen) }
    }

    fn frozen_rate(&self, name: &str, level: &str, allocation_percentage: u8) -> Option<ResolvedRate> {
        self.frozen
            .and_then(|index| index.lookup_line(name, level, allocation_percentage))
            .map(|rate| ResolvedRate { rate, source: RateSource::Frozen })
    }

    fn catalog_rate(&self, name: &str, level: &str) -> Option<ResolvedRate> {
        self.catalog
            .resolve(name, level)
            .map(|hit| ResolvedRate { rate: hit.rate, source: RateSource::Catalog(hit.strategy) })
    }

    /// Unit rate for a staffing role.
    ///
    /// Order: frozen rate, the line's own snapshotted price, the live catalog, then the
    /// built-in role table. A role nobody knows prices at zero. The allocation picks the
    /// frozen rate of the matching persisted line when several share a role and seniority.
    pub fn role_rate(
        &self,
        role: &str,
        seniority: Seniority,
        allocation_percentage: u8,
        snapshotted: Option<Decimal>,
    ) -> ResolvedRate {
        if let Some(frozen) = self.frozen_rate(role, seniority.label(), allocation_percentage) {
            return frozen;
        }
        if let Some(rate) = snapshotted.filter(|price| *price > Decimal::ZERO) {
            return ResolvedRate { rate, source: RateSource::Profile };
        }

        let definition = find_role(role);
        let catalog_name = definition.map(|role| role.label).unwrap_or(role);
        if let Some(hit) = self.catalog_rate(catalog_name, seniority.label()) {
            return hit;
        }

        match definition {
            Some(definition) => {
                tracing::debug!(
                    event_name = "pricing.rate.default_table",
                    role = definition.key,
                    seniority = seniority.label(),
                    "catalog miss, using built-in role table"
                );
                ResolvedRate { rate: definition.price_for(seniority), source: RateSource::Default }
            }
            None => {
                tracing::warn!(
                    event_name = "pricing.rate.unknown_role",
                    role,
                    seniority = seniority.label(),
                    "role has no price anywhere; contributing zero"
                );
                ResolvedRate::unresolved()
            }
        }
    }

    /// Unit rate for a billable service unit such as "Pipe" at a complexity level.
    pub fn service_rate(&self, service: &str, level: &str, default: Decimal) -> ResolvedRate {
        self.frozen_rate(service, level, 100)
            .or_else(|| self.catalog_rate(service, level))
            .unwrap_or(ResolvedRate { rate: default, source: RateSource::Default })
    }
}

/// Frozen index first, then the live catalog chain. `None` means the caller's defaults apply.
pub fn resolve_rate(
    service_name: &str,
    level: &str,
    catalog: &RateCatalog,
    frozen: Option<&FrozenRateIndex>,
) -> Option<Decimal> {
    frozen
        .and_then(|index| index.lookup(service_name, level))
        .or_else(|| catalog.resolve_rate(service_name, level))
}
