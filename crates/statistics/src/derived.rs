use serde::{Deserialize, Serialize};

use slowpitch_core::{DomainError, DomainResult, PlayerId};

use crate::counting::CountingStats;

/// Allowed gap between a stored ratio and its defining formula.
pub const DEFAULT_TOLERANCE: f64 = 0.001;

/// Ratio stats, each rounded to three decimal places.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DerivedStatistics {
    pub batting_average: f64,
    pub on_base_percentage: f64,
    pub slugging_percentage: f64,
}

/// AVG = H/AB, OBP = (H+BB)/(AB+BB), SLG = TB/AB. Zero denominators give 0.
pub fn calculate_derived_statistics(stats: &CountingStats) -> DerivedStatistics {
    DerivedStatistics {
        batting_average: round3(batting_average(stats)),
        on_base_percentage: round3(on_base_percentage(stats)),
        slugging_percentage: round3(slugging_percentage(stats)),
    }
}

fn batting_average(c: &CountingStats) -> f64 {
    ratio(u64::from(c.hits), u64::from(c.at_bats))
}

fn on_base_percentage(c: &CountingStats) -> f64 {
    let walks = u64::from(c.walks);
    ratio(u64::from(c.hits) + walks, u64::from(c.at_bats) + walks)
}

fn slugging_percentage(c: &CountingStats) -> f64 {
    ratio(c.total_bases(), u64::from(c.at_bats))
}

// Counts are widened from u32, so the conversion to f64 is exact.
fn ratio(numerator: u64, denominator: u64) -> f64 {
    if denominator == 0 {
        0.0
    } else {
        numerator as f64 / denominator as f64
    }
}

fn round3(value: f64) -> f64 {
    (value * 1000.0).round() / 1000.0
}

/// Counting stats plus the ratios derived from them.
///
/// Stats loaded from outside (`from_parts`, deserialization) are not trusted;
/// call `validate` at the boundary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerStatistics {
    player_id: PlayerId,
    counting: CountingStats,
    derived: DerivedStatistics,
}

impl PlayerStatistics {
    /// Validate the counts and derive the ratios.
    pub fn new(player_id: PlayerId, counting: CountingStats) -> DomainResult<Self> {
        counting.validate()?;
        let derived = calculate_derived_statistics(&counting);
        Ok(Self {
            player_id,
            counting,
            derived,
        })
    }

    /// Reassemble stored stats without checking them.
    pub fn from_parts(
        player_id: PlayerId,
        counting: CountingStats,
        derived: DerivedStatistics,
    ) -> Self {
        Self {
            player_id,
            counting,
            derived,
        }
    }

    pub fn player_id(&self) -> &PlayerId {
        &self.player_id
    }

    pub fn counting(&self) -> &CountingStats {
        &self.counting
    }

    pub fn derived(&self) -> &DerivedStatistics {
        &self.derived
    }

    /// Replace the counts and recompute every ratio.
    pub fn recompute(&mut self, counting: CountingStats) -> DomainResult<()> {
        counting.validate()?;
        self.counting = counting;
        self.derived = calculate_derived_statistics(&counting);
        Ok(())
    }

    pub fn validate(&self) -> DomainResult<()> {
        self.validate_with_tolerance(DEFAULT_TOLERANCE)
    }

    pub fn validate_with_tolerance(&self, tolerance: f64) -> DomainResult<()> {
        self.counting.validate()?;

        let c = &self.counting;
        let checks = [
            ("batting average", self.derived.batting_average, batting_average(c)),
            ("on-base percentage", self.derived.on_base_percentage, on_base_percentage(c)),
            ("slugging percentage", self.derived.slugging_percentage, slugging_percentage(c)),
        ];

        // A little slack so a value rounded to 3dp is never rejected at exactly
        // the tolerance because of float representation.
        let limit = tolerance + f64::EPSILON * 16.0;
        for (name, stored, expected) in checks {
            if !stored.is_finite() || (stored - expected).abs() > limit {
                return Err(DomainError::validation(format!(
                    "{name} {stored} does not match its formula ({expected:.3})"
                )));
            }
        }
        Ok(())
    }
}
