use std::collections::{BTreeMap, BTreeSet};
use std::str::FromStr;

use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize};

use crate::domain::lenient;
use crate::domain::staffing::StaffingProfile;
use crate::errors::DomainError;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum ServiceType {
    #[default]
    Project,
    Staffing,
    Sustain,
}

impl ServiceType {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Project => "project",
            Self::Staffing => "staffing",
            Self::Sustain => "sustain",
        }
    }
}

impl FromStr for ServiceType {
    type Err = DomainError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "project" => Ok(Self::Project),
            "staffing" => Ok(Self::Staffing),
            "sustain" => Ok(Self::Sustain),
            other => Err(DomainError::UnknownServiceType(other.to_string())),
        }
    }
}

impl TryFrom<String> for ServiceType {
    type Error = DomainError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<ServiceType> for String {
    fn from(value: ServiceType) -> Self {
        value.as_str().to_string()
    }
}

/// Project complexity. Catalog level names (`baja`, `media`, `alta`) are accepted too.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Complexity {
    Low,
    #[default]
    Medium,
    High,
}

impl Complexity {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
        }
    }

    /// Multiplier over the legacy per-role counter sum.
    pub fn modifier(self) -> Decimal {
        match self {
            Self::Low => Decimal::ONE,
            Self::Medium => Decimal::new(12, 1),
            Self::High => Decimal::new(15, 1),
        }
    }

    /// Level label used for service units in the rate catalog.
    pub fn catalog_level(self) -> &'static str {
        match self {
            Self::Low => "Baja",
            Self::Medium => "Media",
            Self::High => "Alta",
        }
    }
}

impl FromStr for Complexity {
    type Err = DomainError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "low" | "baja" => Ok(Self::Low),
            "medium" | "med" | "media" => Ok(Self::Medium),
            "high" | "alta" => Ok(Self::High),
            other => Err(DomainError::UnknownComplexity(other.to_string())),
        }
    }
}

impl TryFrom<String> for Complexity {
    type Error = DomainError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Complexity> for String {
    fn from(value: Complexity) -> Self {
        value.as_str().to_string()
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum DurationUnit {
    Days,
    Weeks,
    #[default]
    Months,
}

impl DurationUnit {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Days => "days",
            Self::Weeks => "weeks",
            Self::Months => "months",
        }
    }
}

impl FromStr for DurationUnit {
    type Err = DomainError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "day" | "days" => Ok(Self::Days),
            "week" | "weeks" => Ok(Self::Weeks),
            "month" | "months" => Ok(Self::Months),
            other => Err(DomainError::UnknownDurationUnit(other.to_string())),
        }
    }
}

impl TryFrom<String> for DurationUnit {
    type Error = DomainError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<DurationUnit> for String {
    fn from(value: DurationUnit) -> Self {
        value.as_str().to_string()
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngagementDuration {
    #[serde(default, deserialize_with = "lenient::money")]
    pub value: Decimal,
    #[serde(default)]
    pub unit: DurationUnit,
}

impl Default for EngagementDuration {
    fn default() -> Self {
        Self { value: Decimal::ONE, unit: DurationUnit::Months }
    }
}

impl EngagementDuration {
    pub fn months(value: Decimal) -> Self {
        Self { value, unit: DurationUnit::Months }
    }

    /// Duration expressed in billable months (weeks / 4.33, days / 30).
    pub fn in_months(&self) -> Decimal {
        let value = lenient::clamp_money(self.value);
        match self.unit {
            DurationUnit::Months => value,
            DurationUnit::Weeks => value / Decimal::new(433, 2),
            DurationUnit::Days => value / Decimal::from(30),
        }
    }
}

/// Volumetric inputs; each service type keeps its own copy.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VolumeMetrics {
    #[serde(default, deserialize_with = "lenient::count")]
    pub pipelines: u32,
    #[serde(default, deserialize_with = "lenient::count")]
    pub notebooks: u32,
    #[serde(default, deserialize_with = "lenient::count")]
    pub dashboards: u32,
    #[serde(default, deserialize_with = "lenient::count")]
    pub ml_models: u32,
    #[serde(default, deserialize_with = "lenient::count")]
    pub data_sources: u32,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetricsByService {
    #[serde(default)]
    pub project: VolumeMetrics,
    #[serde(default)]
    pub staffing: VolumeMetrics,
    #[serde(default)]
    pub sustain: VolumeMetrics,
}

impl MetricsByService {
    pub fn for_service(&self, service_type: ServiceType) -> &VolumeMetrics {
        match service_type {
            ServiceType::Project => &self.project,
            ServiceType::Staffing => &self.staffing,
            ServiceType::Sustain => &self.sustain,
        }
    }
}

/// A 1/3/5 criticality answer. Other numbers, numeric strings included, snap to the nearest
/// answer; unreadable input reads as `Low`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize)]
#[serde(into = "u8")]
pub enum CriticalityLevel {
    #[default]
    Low,
    Medium,
    High,
}

impl CriticalityLevel {
    pub fn points(self) -> u8 {
        match self {
            Self::Low => 1,
            Self::Medium => 3,
            Self::High => 5,
        }
    }

    fn snap(answer: Decimal) -> Self {
        if answer <= Decimal::from(2) {
            Self::Low
        } else if answer <= Decimal::from(4) {
            Self::Medium
        } else {
            Self::High
        }
    }
}

impl From<u8> for CriticalityLevel {
    fn from(value: u8) -> Self {
        Self::snap(Decimal::from(value))
    }
}

impl<'de> Deserialize<'de> for CriticalityLevel {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        lenient::money(deserializer).map(Self::snap)
    }
}

impl From<CriticalityLevel> for u8 {
    fn from(value: CriticalityLevel) -> Self {
        value.points()
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum UsageFrequency {
    #[default]
    None,
    Monthly,
    Weekly,
    Daily,
    /// Anything more frequent than daily, including unrecognised answers.
    Realtime,
}

impl UsageFrequency {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Monthly => "monthly",
            Self::Weekly => "weekly",
            Self::Daily => "daily",
            Self::Realtime => "realtime",
        }
    }
}

impl From<String> for UsageFrequency {
    fn from(value: String) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "" | "none" => Self::None,
            "monthly" => Self::Monthly,
            "weekly" => Self::Weekly,
            "daily" => Self::Daily,
            _ => Self::Realtime,
        }
    }
}

impl From<UsageFrequency> for String {
    fn from(value: UsageFrequency) -> Self {
        value.as_str().to_string()
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CriticalityMatrix {
    #[serde(default)]
    pub business_impact: CriticalityLevel,
    #[serde(default)]
    pub data_sensitivity: CriticalityLevel,
    #[serde(default)]
    pub user_reach: CriticalityLevel,
    #[serde(default)]
    pub integration_complexity: CriticalityLevel,
    #[serde(default)]
    pub recovery_urgency: CriticalityLevel,
    #[serde(default)]
    pub regulatory_exposure: CriticalityLevel,
    #[serde(default)]
    pub scope: String,
    #[serde(default)]
    pub frequency: UsageFrequency,
    #[serde(default)]
    pub critical_dates: Vec<String>,
    #[serde(default)]
    pub has_manual_process: bool,
    /// Comma-separated external dependency tags.
    #[serde(default)]
    pub dependencies: String,
    #[serde(default, deserialize_with = "lenient::count")]
    pub markets_impacted: u32,
    #[serde(default, deserialize_with = "lenient::count")]
    pub users_impacted: u32,
}

impl CriticalityMatrix {
    pub fn dimensions(&self) -> [CriticalityLevel; 6] {
        [
            self.business_impact,
            self.data_sensitivity,
            self.user_reach,
            self.integration_complexity,
            self.recovery_urgency,
            self.regulatory_exposure,
        ]
    }

    pub fn dependency_tags(&self) -> impl Iterator<Item = &str> {
        self.dependencies.split(',').map(str::trim).filter(|tag| !tag.is_empty())
    }
}

/// Support coverage. Anything that is neither business hours nor 24/7 reads as `Combined`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum SupportWindow {
    #[default]
    Business,
    AroundTheClock,
    Combined,
}

impl From<String> for SupportWindow {
    fn from(value: String) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "business" | "business_hours" | "9x5" => Self::Business,
            "around_the_clock" | "24x7" | "24/7" => Self::AroundTheClock,
            _ => Self::Combined,
        }
    }
}

impl From<SupportWindow> for String {
    fn from(value: SupportWindow) -> Self {
        value.as_str().to_string()
    }
}

impl SupportWindow {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Business => "business",
            Self::AroundTheClock => "around_the_clock",
            Self::Combined => "combined",
        }
    }

    /// Coverage multiplier over the role cost of a sustain engagement.
    pub fn coverage_modifier(self) -> Decimal {
        match self {
            Self::Business => Decimal::ONE,
            Self::AroundTheClock => Decimal::new(15, 1),
            Self::Combined => Decimal::new(12, 1),
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SustainOperations {
    #[serde(default)]
    pub support_window: SupportWindow,
    #[serde(default)]
    pub weekend_usage: bool,
    #[serde(default)]
    pub has_hypercare: bool,
    #[serde(default)]
    pub hypercare_period: Option<String>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SustainSpec {
    #[serde(default)]
    pub criticality: CriticalityMatrix,
    #[serde(default)]
    pub operations: SustainOperations,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Retention {
    #[serde(default)]
    pub enabled: bool,
    #[serde(default, deserialize_with = "lenient::percentage")]
    pub percentage: Decimal,
}

/// Everything a quote is priced from. Only the sub-trees of the active service type are read.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectSpecification {
    #[serde(default)]
    pub service_type: ServiceType,
    #[serde(default)]
    pub complexity: Complexity,
    #[serde(default)]
    pub duration: EngagementDuration,
    #[serde(default)]
    pub tech_stack: BTreeSet<String>,
    #[serde(default)]
    pub metrics: MetricsByService,
    /// Legacy per-role head counts keyed by role, priced at `Med` when no profiles exist.
    #[serde(default, deserialize_with = "lenient::count_map")]
    pub role_counts: BTreeMap<String, u32>,
    #[serde(default)]
    pub profiles: Vec<StaffingProfile>,
    #[serde(default)]
    pub sustain: SustainSpec,
    #[serde(default, deserialize_with = "lenient::percentage")]
    pub commercial_discount: Decimal,
    #[serde(default)]
    pub retention: Retention,
}

impl ProjectSpecification {
    pub fn new(service_type: ServiceType) -> Self {
        Self { service_type, ..Self::default() }
    }

    pub fn active_metrics(&self) -> &VolumeMetrics {
        self.metrics.for_service(self.service_type)
    }

    pub fn discount_percentage(&self) -> Decimal {
        lenient::clamp_percentage(self.commercial_discount)
    }

    pub fn retention_percentage(&self) -> Decimal {
        if self.retention.enabled {
            lenient::clamp_percentage(self.retention.percentage)
        } else {
            Decimal::ZERO
        }
    }
}
