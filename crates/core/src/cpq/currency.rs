//! Display-currency overlay. Every priced figure stays in USD; conversion happens only on the way
//! out and never touches the breakdown it reads from.

use std::collections::BTreeMap;

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

use crate::cpq::pricing::CostBreakdown;
use crate::domain::lenient::saturating_mul;

pub const BASE_CURRENCY: &str = "USD";

/// Currency code to multiplier relative to USD.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FxTable {
    rates: BTreeMap<String, Decimal>,
}

impl Default for FxTable {
    fn default() -> Self {
        Self::fallback()
    }
}

impl FxTable {
    /// Fixed table used when no live feed is supplied.
    pub fn fallback() -> Self {
        let rates = [
            ("USD", Decimal::ONE),
            ("EUR", Decimal::new(92, 2)),
            ("ARS", Decimal::from(1_200)),
            ("MXN", Decimal::new(1_750, 2)),
            ("COP", Decimal::from(3_900)),
            ("CLP", Decimal::from(980)),
        ]
        .into_iter()
        .map(|(code, rate)| (code.to_string(), rate))
        .collect();

        Self { rates }
    }

    pub fn from_rates(rates: BTreeMap<String, Decimal>) -> Self {
        let mut table = Self { rates: BTreeMap::new() };
        table.merge(rates);
        table
    }

    /// Fallback table with the given rates layered on top. Non-positive rates are ignored.
    pub fn with_overrides(overrides: &BTreeMap<String, Decimal>) -> Self {
        let mut table = Self::fallback();
        table.merge(overrides.clone());
        table
    }

    fn merge(&mut self, rates: BTreeMap<String, Decimal>) {
        for (code, rate) in rates {
            if rate > Decimal::ZERO {
                self.rates.insert(normalize_code(&code), rate);
            }
        }
    }

    /// Multiplier for a code; unknown codes fall back to 1.
    pub fn rate(&self, currency: &str) -> Decimal {
        self.rates.get(&normalize_code(currency)).copied().unwrap_or(Decimal::ONE)
    }

    pub fn contains(&self, currency: &str) -> bool {
        self.rates.contains_key(&normalize_code(currency))
    }

    pub fn codes(&self) -> impl Iterator<Item = &str> {
        self.rates.keys().map(String::as_str)
    }
}

fn normalize_code(code: &str) -> String {
    code.trim().to_ascii_uppercase()
}

pub fn convert(amount_usd: Decimal, currency: &str, table: &FxTable) -> Decimal {
    saturating_mul(amount_usd, table.rate(currency))
        .round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

/// Renders an amount as `CODE 1,234.56`.
pub fn format(amount_usd: Decimal, currency: &str, table: &FxTable) -> String {
    let converted = convert(amount_usd, currency, table);
    format!("{} {}", normalize_code(currency), group_thousands(converted))
}

fn group_thousands(amount: Decimal) -> String {
    let fixed = format!("{:.2}", amount.abs());
    let (whole, fraction) = fixed.split_once('.').unwrap_or((fixed.as_str(), "00"));

    let mut grouped = String::with_capacity(whole.len() + whole.len() / 3);
    for (index, digit) in whole.chars().enumerate() {
        if index > 0 && (whole.len() - index) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(digit);
    }

    let sign = if amount.is_sign_negative() && !amount.is_zero() { "-" } else { "" };
    format!("{sign}{grouped}.{fraction}")
}

/// A breakdown's headline figures restated in a display currency.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PresentedBreakdown {
    pub currency: String,
    pub fx_rate: Decimal,
    pub roles_cost: Decimal,
    pub services_cost: Decimal,
    pub l2_support_cost: Decimal,
    pub risk_cost: Decimal,
    pub discount_amount: Decimal,
    pub gross_total: Decimal,
    pub retention_amount: Decimal,
    pub final_total: Decimal,
    pub hypercare_cost: Decimal,
    pub total_project_cost: Decimal,
    pub final_total_display: String,
    pub total_project_cost_display: String,
}

impl PresentedBreakdown {
    pub fn present(breakdown: &CostBreakdown, currency: &str, table: &FxTable) -> Self {
        let convert = |amount| convert(amount, currency, table);

        Self {
            currency: normalize_code(currency),
            fx_rate: table.rate(currency),
            roles_cost: convert(breakdown.roles_cost),
            services_cost: convert(breakdown.services_cost),
            l2_support_cost: convert(breakdown.l2_support_cost),
            risk_cost: convert(breakdown.risk_cost),
            discount_amount: convert(breakdown.discount_amount),
            gross_total: convert(breakdown.gross_total),
            retention_amount: convert(breakdown.retention_amount),
            final_total: convert(breakdown.final_total),
            hypercare_cost: convert(breakdown.hypercare_cost),
            total_project_cost: convert(breakdown.total_project_cost),
            final_total_display: format(breakdown.final_total, currency, table),
            total_project_cost_display: format(breakdown.total_project_cost, currency, table),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use rust_decimal::Decimal;

    use super::{convert, format, FxTable, PresentedBreakdown};
    use crate::cpq::catalog::RateCatalog;
    use crate::cpq::pricing::compute_breakdown;
    use crate::domain::spec::{ProjectSpecification, ServiceType};

    #[test]
    fn fallback_table_covers_supported_codes() {
        let table = FxTable::fallback();
        assert_eq!(table.rate("EUR"), Decimal::new(92, 2));
        assert_eq!(table.rate("mxn"), Decimal::new(1_750, 2));
        assert_eq!(table.codes().count(), 6);
    }

    #[test]
    fn unknown_codes_convert_at_parity() {
        let table = FxTable::fallback();
        assert_eq!(table.rate("JPY"), Decimal::ONE);
        assert_eq!(convert(Decimal::from(250), "JPY", &table), Decimal::from(250));
    }

    #[test]
    fn overrides_layer_on_fallback_and_skip_nonpositive_rates() {
        let overrides = BTreeMap::from([
            ("eur".to_string(), Decimal::new(95, 2)),
            ("ARS".to_string(), Decimal::ZERO),
        ]);
        let table = FxTable::with_overrides(&overrides);
        assert_eq!(table.rate("EUR"), Decimal::new(95, 2));
        assert_eq!(table.rate("ARS"), Decimal::from(1_200));
    }

    #[test]
    fn format_groups_thousands_with_two_decimals() {
        let table = FxTable::fallback();
        assert_eq!(format(Decimal::new(1_288_154, 2), "usd", &table), "USD 12,881.54");
        assert_eq!(format(Decimal::from(1_000), "ARS", &table), "ARS 1,200,000.00");
        assert_eq!(format(Decimal::new(5, 1), "USD", &table), "USD 0.50");
        assert_eq!(format(Decimal::from(-1_500), "USD", &table), "USD -1,500.00");
    }

    #[test]
    fn presenting_leaves_usd_breakdown_untouched() {
        let mut spec = ProjectSpecification::new(ServiceType::Project);
        spec.metrics.project.pipelines = 4;
        let breakdown = compute_breakdown(&spec, &RateCatalog::empty(), None);
        let before = breakdown.clone();

        let presented = PresentedBreakdown::present(&breakdown, "EUR", &FxTable::fallback());
        assert_eq!(breakdown, before);
        assert_eq!(presented.currency, "EUR");
        assert_eq!(presented.final_total, Decimal::new(1_012_000, 2));
        assert_eq!(presented.final_total_display, "EUR 10,120.00");
    }
}
