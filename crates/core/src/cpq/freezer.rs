//! Historical rate reconstruction.
//!
//! A quote that has been issued must keep its price even when the live catalog moves. The
//! persisted line items of the issued breakdown are inverted back into unit rates, and those
//! rates take precedence over every live lookup while the historical quote is open.

use std::collections::BTreeMap;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::cpq::pricing::CostBreakdown;
use crate::domain::lenient;
use crate::domain::normalize_name;

/// Stand-in level for persisted lines written before seniority was recorded.
pub const SENIORITY_PLACEHOLDER: &str = "standard";

/// A priced line as it was persisted with an issued quote.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersistedLine {
    pub role: String,
    #[serde(default)]
    pub seniority: Option<String>,
    #[serde(default, deserialize_with = "lenient::count")]
    pub count: u32,
    #[serde(default = "lenient::default_allocation", deserialize_with = "lenient::allocation")]
    pub allocation_percentage: u8,
    #[serde(default, deserialize_with = "lenient::money")]
    pub total_line_cost: Decimal,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuoteSnapshot {
    #[serde(default)]
    pub lines: Vec<PersistedLine>,
}

impl QuoteSnapshot {
    /// Captures the role and service-unit lines of a freshly priced breakdown.
    pub fn from_breakdown(breakdown: &CostBreakdown) -> Self {
        let lines = breakdown
            .role_lines
            .iter()
            .chain(breakdown.service_lines.iter())
            .map(|line| PersistedLine {
                role: line.name.clone(),
                seniority: Some(line.level.clone()),
                count: line.count,
                allocation_percentage: line.allocation_percentage,
                total_line_cost: line.total,
            })
            .collect();

        Self { lines }
    }
}

/// Read-only `role_seniority -> unit rate` lookup for one historical quote view.
///
/// Lines sharing a role and seniority can carry different rates (an explicit price next to a
/// table price), so every line is also indexed by its allocation. The general key keeps the
/// first persisted line's rate.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FrozenRateIndex {
    rates: BTreeMap<String, Decimal>,
    #[serde(default)]
    line_rates: BTreeMap<String, Decimal>,
}

impl FrozenRateIndex {
    pub fn build(snapshot: &QuoteSnapshot) -> Self {
        let mut rates = BTreeMap::new();
        let mut line_rates = BTreeMap::new();

        for line in &snapshot.lines {
            if line.count == 0 || line.total_line_cost <= Decimal::ZERO {
                continue;
            }
            let allocation = Decimal::from(line.allocation_percentage.min(100)) / Decimal::ONE_HUNDRED;
            let billed_units = Decimal::from(line.count) * allocation;
            if billed_units.is_zero() {
                continue;
            }

            let level = line.seniority.as_deref().filter(|value| !value.trim().is_empty());
            let level = level.unwrap_or(SENIORITY_PLACEHOLDER);
            let rate = lenient::saturating_div(line.total_line_cost, billed_units);

            let key = frozen_key(&line.role, level);
            if let Some(existing) = rates.get(&key) {
                if *existing != rate {
                    tracing::debug!(
                        event_name = "pricing.freezer.rate_collision",
                        key = %key,
                        allocation = line.allocation_percentage,
                        "persisted lines share a key with different rates; keeping per-allocation rates"
                    );
                }
            } else {
                rates.insert(key, rate);
            }
            line_rates
                .entry(frozen_line_key(&line.role, level, line.allocation_percentage))
                .or_insert(rate);
        }

        tracing::debug!(
            event_name = "pricing.freezer.index_built",
            persisted_lines = snapshot.lines.len(),
            frozen_rates = rates.len(),
            "frozen rate index built"
        );

        Self { rates, line_rates }
    }

    /// Looks up the frozen rate, falling back to the placeholder level for legacy lines.
    pub fn lookup(&self, name: &str, level: &str) -> Option<Decimal> {
        self.rates
            .get(&frozen_key(name, level))
            .or_else(|| self.rates.get(&frozen_key(name, SENIORITY_PLACEHOLDER)))
            .copied()
    }

    /// Most specific lookup first: the line's own allocation, then the shared key.
    pub fn lookup_line(&self, name: &str, level: &str, allocation_percentage: u8) -> Option<Decimal> {
        self.line_rates
            .get(&frozen_line_key(name, level, allocation_percentage))
            .copied()
            .or_else(|| self.lookup(name, level))
    }

    /// Number of distinct `role_seniority` keys.
    pub fn len(&self) -> usize {
        self.rates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rates.is_empty()
    }
}

/// Inverts the persisted lines of an issued quote into its frozen rate index.
pub fn build_frozen_index(snapshot: &QuoteSnapshot) -> FrozenRateIndex {
    FrozenRateIndex::build(snapshot)
}

pub fn frozen_key(name: &str, level: &str) -> String {
    format!("{}_{}", normalize_name(name), normalize_name(level))
}

fn frozen_line_key(name: &str, level: &str, allocation_percentage: u8) -> String {
    format!("{}_{}", frozen_key(name, level), allocation_percentage.min(100))
}
