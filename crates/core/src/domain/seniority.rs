use std::fmt;
use std::str::FromStr;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::errors::DomainError;

/// Staffing experience tier. `Ssr` is accepted as an alias of `Med`, `Lead` of `Expert`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Seniority {
    Jr,
    Med,
    Sr,
    Expert,
}

impl Seniority {
    pub const ALL: [Self; 4] = [Self::Jr, Self::Med, Self::Sr, Self::Expert];

    pub fn label(self) -> &'static str {
        match self {
            Self::Jr => "Jr",
            Self::Med => "Med",
            Self::Sr => "Sr",
            Self::Expert => "Expert",
        }
    }

    /// Price multiplier applied over a role's base monthly price.
    pub fn multiplier(self) -> Decimal {
        match self {
            Self::Jr => Decimal::new(7, 1),
            Self::Med => Decimal::ONE,
            Self::Sr => Decimal::new(13, 1),
            Self::Expert => Decimal::new(15, 1),
        }
    }
}

impl fmt::Display for Seniority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Seniority {
    type Err = DomainError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "jr" | "junior" => Ok(Self::Jr),
            "med" | "ssr" | "semi-senior" | "mid" => Ok(Self::Med),
            "sr" | "senior" => Ok(Self::Sr),
            "expert" | "lead" => Ok(Self::Expert),
            other => Err(DomainError::UnknownSeniority(other.to_string())),
        }
    }
}

impl TryFrom<String> for Seniority {
    type Error = DomainError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Seniority> for String {
    fn from(value: Seniority) -> Self {
        value.label().to_string()
    }
}
