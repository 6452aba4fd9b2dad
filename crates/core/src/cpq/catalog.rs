use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::domain::normalize_name;
use crate::domain::rate::RateCatalogEntry;

/// Level labels that stand in for a generic mid-tier when the requested level is absent.
pub const GENERIC_LEVELS: [&str; 4] = ["standard", "media", "ssr", "baja"];

/// One layer of the catalog fallback chain. Layers are tried in [`ResolutionStrategy::ORDER`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResolutionStrategy {
    /// Same service and level, case-insensitive.
    Exact,
    /// Same service, any generic mid-tier level.
    GenericLevel,
    /// Normalized service names contain one another; level must be exact or generic.
    Fuzzy,
}

impl ResolutionStrategy {
    pub const ORDER: [Self; 3] = [Self::Exact, Self::GenericLevel, Self::Fuzzy];

    pub fn resolve(self, entries: &[RateCatalogEntry], service: &str, level: &str) -> Option<Decimal> {
        let entry = match self {
            Self::Exact => entries.iter().find(|entry| {
                same_text(&entry.service_name, service) && same_text(&entry.level_label, level)
            }),
            Self::GenericLevel => entries.iter().find(|entry| {
                same_text(&entry.service_name, service) && is_generic_level(&entry.level_label)
            }),
            Self::Fuzzy => {
                let wanted = normalize_name(service);
                if wanted.is_empty() {
                    return None;
                }
                let candidates = || {
                    entries.iter().filter(|entry| {
                        let name = normalize_name(&entry.service_name);
                        !name.is_empty() && (name.contains(&wanted) || wanted.contains(&name))
                    })
                };
                candidates()
                    .find(|entry| same_text(&entry.level_label, level))
                    .or_else(|| candidates().find(|entry| is_generic_level(&entry.level_label)))
            }
        };

        entry.map(RateCatalogEntry::effective_rate)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CatalogHit {
    pub rate: Decimal,
    pub strategy: ResolutionStrategy,
}

/// Ordered snapshot of the live rate catalog. Earlier entries win over later duplicates.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RateCatalog {
    entries: Vec<RateCatalogEntry>,
}

impl RateCatalog {
    pub fn new(entries: Vec<RateCatalogEntry>) -> Self {
        Self { entries }
    }

    pub fn empty() -> Self {
        Self::default()
    }

    pub fn entries(&self) -> &[RateCatalogEntry] {
        &self.entries
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Runs the fallback chain; the first layer with a match wins.
    pub fn resolve(&self, service: &str, level: &str) -> Option<CatalogHit> {
        ResolutionStrategy::ORDER.into_iter().find_map(|strategy| {
            strategy
                .resolve(&self.entries, service, level)
                .map(|rate| CatalogHit { rate, strategy })
        })
    }

    pub fn resolve_rate(&self, service: &str, level: &str) -> Option<Decimal> {
        self.resolve(service, level).map(|hit| hit.rate)
    }
}

fn same_text(left: &str, right: &str) -> bool {
    left.trim().eq_ignore_ascii_case(right.trim())
}

fn is_generic_level(level: &str) -> bool {
    GENERIC_LEVELS.iter().any(|generic| same_text(level, generic))
}
