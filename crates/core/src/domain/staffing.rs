use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::domain::lenient;
use crate::domain::seniority::Seniority;

#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ProfileId(pub String);

/// Who decided a staffing line.
///
/// `Suggested` lines are owned by auto-staffing and follow the workload metrics.
/// `Confirmed` lines were touched by a person and are never rebalanced again.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Provenance {
    Suggested,
    #[default]
    Confirmed,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct StaffingProfile {
    pub id: ProfileId,
    /// Human label, e.g. "Data Engineer".
    pub role: String,
    pub seniority: Seniority,
    #[serde(default, deserialize_with = "lenient::count")]
    pub count: u32,
    /// Monthly price with seniority already applied, snapshotted when the line was priced.
    #[serde(default, deserialize_with = "lenient::money")]
    pub unit_price: Decimal,
    #[serde(default = "lenient::default_allocation", deserialize_with = "lenient::allocation")]
    pub allocation_percentage: u8,
    #[serde(default)]
    pub provenance: Provenance,
    #[serde(default)]
    pub rationale: String,
}

impl StaffingProfile {
    pub fn is_manual(&self) -> bool {
        self.provenance == Provenance::Confirmed
    }

    pub fn allocation_fraction(&self) -> Decimal {
        Decimal::from(self.allocation_percentage.min(100)) / Decimal::ONE_HUNDRED
    }

    /// Marks the line as human-owned; there is no way back to `Suggested`.
    pub fn confirm(&mut self) {
        self.provenance = Provenance::Confirmed;
    }
}
