//! Forgiving numeric readers for quote documents.
//!
//! Specification documents are edited by hand and by form tooling, so numeric fields may
//! arrive as numbers, numeric strings, blanks or garbage. Every reader here maps unreadable
//! input to zero and clamps into the field's valid range instead of rejecting the document.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::de::{self, Deserializer, Visitor};
use serde::Deserialize;

const HUNDRED: Decimal = Decimal::ONE_HUNDRED;

struct LenientDecimal;

impl<'de> Visitor<'de> for LenientDecimal {
    type Value = Decimal;

    fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
        formatter.write_str("a number, a numeric string, or null")
    }

    fn visit_i64<E: de::Error>(self, value: i64) -> Result<Decimal, E> {
        Ok(Decimal::from(value))
    }

    fn visit_u64<E: de::Error>(self, value: u64) -> Result<Decimal, E> {
        Ok(Decimal::from(value))
    }

    fn visit_f64<E: de::Error>(self, value: f64) -> Result<Decimal, E> {
        // Display of f64 is the shortest round-trip form, so 6440.77 stays 6440.77.
        Ok(parse_text(&value.to_string()))
    }

    fn visit_str<E: de::Error>(self, value: &str) -> Result<Decimal, E> {
        Ok(parse_text(value))
    }

    fn visit_bool<E: de::Error>(self, _value: bool) -> Result<Decimal, E> {
        Ok(Decimal::ZERO)
    }

    fn visit_unit<E: de::Error>(self) -> Result<Decimal, E> {
        Ok(Decimal::ZERO)
    }

    fn visit_none<E: de::Error>(self) -> Result<Decimal, E> {
        Ok(Decimal::ZERO)
    }

    fn visit_some<D: Deserializer<'de>>(self, deserializer: D) -> Result<Decimal, D::Error> {
        deserializer.deserialize_any(self)
    }
}

fn parse_text(raw: &str) -> Decimal {
    let trimmed = raw.trim();
    Decimal::from_str(trimmed)
        .or_else(|_| Decimal::from_scientific(trimmed))
        .unwrap_or(Decimal::ZERO)
}

fn read<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Decimal, D::Error> {
    deserializer.deserialize_any(LenientDecimal)
}

/// Clamps a monetary amount to be non-negative.
pub fn clamp_money(value: Decimal) -> Decimal {
    value.max(Decimal::ZERO)
}

/// Clamps a percentage into `[0, 100]`.
pub fn clamp_percentage(value: Decimal) -> Decimal {
    value.max(Decimal::ZERO).min(HUNDRED)
}

/// Product that pins to `Decimal::MAX` / `Decimal::MIN` instead of overflowing.
pub fn saturating_mul(left: Decimal, right: Decimal) -> Decimal {
    left.checked_mul(right).unwrap_or_else(|| {
        if left.is_sign_negative() != right.is_sign_negative() {
            Decimal::MIN
        } else {
            Decimal::MAX
        }
    })
}

pub fn saturating_add(left: Decimal, right: Decimal) -> Decimal {
    left.checked_add(right)
        .unwrap_or(if left.is_sign_negative() { Decimal::MIN } else { Decimal::MAX })
}

/// Quotient that pins to `Decimal::MAX` when the result does not fit. Zero divisors yield zero.
pub fn saturating_div(dividend: Decimal, divisor: Decimal) -> Decimal {
    if divisor.is_zero() {
        return Decimal::ZERO;
    }
    dividend.checked_div(divisor).unwrap_or_else(|| {
        if dividend.is_sign_negative() != divisor.is_sign_negative() {
            Decimal::MIN
        } else {
            Decimal::MAX
        }
    })
}

pub fn money<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Decimal, D::Error> {
    read(deserializer).map(clamp_money)
}

pub fn percentage<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Decimal, D::Error> {
    read(deserializer).map(clamp_percentage)
}

/// Whole-number counter; fractions are truncated and negatives become zero.
pub fn count<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u32, D::Error> {
    read(deserializer).map(|value| clamp_money(value).trunc().to_u32().unwrap_or(u32::MAX))
}

/// Allocation percentage as a whole number in `[0, 100]`.
pub fn allocation<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u8, D::Error> {
    read(deserializer).map(|value| clamp_percentage(value).round().to_u8().unwrap_or(100))
}

#[derive(Deserialize)]
struct Count(#[serde(deserialize_with = "count")] u32);

/// Keyed counters such as legacy per-role head counts.
pub fn count_map<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<BTreeMap<String, u32>, D::Error> {
    let raw = BTreeMap::<String, Count>::deserialize(deserializer)?;
    Ok(raw.into_iter().map(|(key, Count(value))| (key, value)).collect())
}

pub fn default_allocation() -> u8 {
    100
}
