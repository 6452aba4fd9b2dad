use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

use crate::domain::spec::{
    CriticalityMatrix, ProjectSpecification, ServiceType, UsageFrequency, VolumeMetrics,
};

/// Volume band shared by pipelines, notebooks and dashboards.
pub fn band_volume(count: u32) -> u8 {
    match count {
        0 => 0,
        1..=2 => 1,
        3..=5 => 2,
        6..=10 => 3,
        11..=20 => 4,
        _ => 5,
    }
}

/// Coarser band for data-science models.
pub fn band_models(count: u32) -> u8 {
    match count {
        0 => 0,
        1 => 1,
        2..=5 => 3,
        _ => 5,
    }
}

pub fn frequency_score(frequency: UsageFrequency) -> u8 {
    match frequency {
        UsageFrequency::None => 0,
        UsageFrequency::Monthly => 1,
        UsageFrequency::Weekly => 2,
        UsageFrequency::Daily => 4,
        UsageFrequency::Realtime => 5,
    }
}

/// Dependency sub-score including the scope bonus.
///
/// With no dependency tags the bonus alone is the score; otherwise it is added to the band.
pub fn dependency_score(matrix: &CriticalityMatrix) -> u8 {
    let tags = matrix.dependency_tags().count();
    let band = match tags {
        0 => 0,
        1..=2 => 1,
        3 => 3,
        4 => 4,
        _ => 5,
    };
    let bonus = u8::from(matrix.markets_impacted > 1 || matrix.users_impacted > 50);

    if tags == 0 {
        bonus
    } else {
        (band + bonus).min(5)
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SustainSubScores {
    pub pipelines: u8,
    pub notebooks: u8,
    pub dashboards: u8,
    pub models: u8,
    pub manual_process: u8,
    pub frequency: u8,
    pub dependencies: u8,
}

impl SustainSubScores {
    pub fn from_inputs(metrics: &VolumeMetrics, matrix: &CriticalityMatrix) -> Self {
        Self {
            pipelines: band_volume(metrics.pipelines),
            notebooks: band_volume(metrics.notebooks),
            dashboards: band_volume(metrics.dashboards),
            models: band_models(metrics.ml_models),
            manual_process: if matrix.has_manual_process { 5 } else { 0 },
            frequency: frequency_score(matrix.frequency),
            dependencies: dependency_score(matrix),
        }
    }

    pub fn values(&self) -> [u8; 7] {
        [
            self.pipelines,
            self.notebooks,
            self.dashboards,
            self.models,
            self.manual_process,
            self.frequency,
            self.dependencies,
        ]
    }

    /// Mean of the seven factors rounded to two decimals; exactly zero when every factor is zero.
    pub fn total(&self) -> Decimal {
        let values = self.values();
        if values.iter().all(|value| *value == 0) {
            return Decimal::ZERO;
        }

        let sum: u32 = values.iter().map(|value| u32::from(*value)).sum();
        (Decimal::from(sum) / Decimal::from(values.len() as u32))
            .round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SustainTier {
    Pending,
    S1,
    S2,
    S3,
    Premium,
}

impl SustainTier {
    pub fn label(self) -> &'static str {
        match self {
            Self::Pending => "PENDING",
            Self::S1 => "S1/LOW",
            Self::S2 => "S2/MEDIUM",
            Self::S3 => "S3/HIGH",
            Self::Premium => "PREMIUM",
        }
    }

    /// Fixed monthly managed-service fee in USD.
    pub fn base_cost(self) -> Decimal {
        match self {
            Self::Pending => Decimal::ZERO,
            Self::S1 => Decimal::from(5_000),
            Self::S2 => Decimal::from(12_000),
            Self::S3 => Decimal::from(22_000),
            Self::Premium => Decimal::from(45_000),
        }
    }
}

/// Maps a criticality total onto its tier; lower bounds are inclusive.
pub fn tier_for_score(total: Decimal) -> SustainTier {
    if total >= Decimal::new(43, 1) {
        SustainTier::Premium
    } else if total >= Decimal::new(36, 1) {
        SustainTier::S3
    } else if total >= Decimal::new(26, 1) {
        SustainTier::S2
    } else if total > Decimal::ZERO {
        SustainTier::S1
    } else {
        SustainTier::Pending
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SustainScore {
    pub sub_scores: SustainSubScores,
    pub total: Decimal,
    pub tier: SustainTier,
    pub tier_label: String,
    pub tier_base_cost: Decimal,
    /// Mean of the six 1/3/5 criticality answers. Informational; it does not move the price.
    pub matrix_index: Decimal,
}

pub fn compute_sustain_score(spec: &ProjectSpecification) -> SustainScore {
    let matrix = &spec.sustain.criticality;
    let sub_scores = SustainSubScores::from_inputs(spec.metrics.for_service(ServiceType::Sustain), matrix);
    let total = sub_scores.total();
    let tier = tier_for_score(total);

    let dimensions = matrix.dimensions();
    let points: u32 = dimensions.iter().map(|level| u32::from(level.points())).sum();
    let matrix_index = (Decimal::from(points) / Decimal::from(dimensions.len() as u32))
        .round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);

    tracing::debug!(
        event_name = "pricing.sustain.scored",
        total = %total,
        tier = tier.label(),
        "sustain criticality scored"
    );

    SustainScore {
        sub_scores,
        total,
        tier,
        tier_label: tier.label().to_string(),
        tier_base_cost: tier.base_cost(),
        matrix_index,
    }
}
