use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::domain::lenient;

/// One priced row of the live rate catalog.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RateCatalogEntry {
    pub service_name: String,
    pub level_label: String,
    #[serde(default, deserialize_with = "lenient::money")]
    pub base_price: Decimal,
    #[serde(default = "default_multiplier", deserialize_with = "lenient::money")]
    pub multiplier: Decimal,
}

fn default_multiplier() -> Decimal {
    Decimal::ONE
}

impl RateCatalogEntry {
    pub fn new(
        service_name: impl Into<String>,
        level_label: impl Into<String>,
        base_price: Decimal,
        multiplier: Decimal,
    ) -> Self {
        Self {
            service_name: service_name.into(),
            level_label: level_label.into(),
            base_price: lenient::clamp_money(base_price),
            multiplier: lenient::clamp_money(multiplier),
        }
    }

    pub fn effective_rate(&self) -> Decimal {
        lenient::saturating_mul(self.base_price, self.multiplier)
    }
}

#[cfg(test)]
mod tests {
    use rust_decimal::Decimal;

    use super::RateCatalogEntry;

    #[test]
    fn effective_rate_applies_multiplier() {
        let entry = RateCatalogEntry::new("Pipe", "Media", Decimal::new(2000, 0), Decimal::new(125, 2));
        assert_eq!(entry.effective_rate(), Decimal::new(2500, 0));
    }

    #[test]
    fn multiplier_defaults_to_one_when_absent() {
        let entry: RateCatalogEntry = serde_json::from_str(
            r#"{"service_name": "Dashboard", "level_label": "Alta", "base_price": "5200"}"#,
        )
        .expect("catalog entry");
        assert_eq!(entry.effective_rate(), Decimal::new(5200, 0));
    }
}
