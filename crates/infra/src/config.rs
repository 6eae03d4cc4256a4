//! Scorekeeping configuration.
//!
//! Loaded once at startup and handed to whatever needs it (rule engine, lineup
//! validation, statistics checks). Nothing here is global.

use slowpitch_baserunning::{GameRuleEngine, MAX_LINEUP_SIZE, MIN_LINEUP_SIZE, RuleSet};
use slowpitch_statistics::DEFAULT_TOLERANCE;

pub const MIN_LINEUP_SIZE_VAR: &str = "SLOWPITCH_MIN_LINEUP_SIZE";
pub const MAX_LINEUP_SIZE_VAR: &str = "SLOWPITCH_MAX_LINEUP_SIZE";
pub const ENFORCE_RBI_EXCLUSIONS_VAR: &str = "SLOWPITCH_ENFORCE_RBI_EXCLUSIONS";
pub const STATS_TOLERANCE_VAR: &str = "SLOWPITCH_STATS_TOLERANCE";

#[derive(Debug, Clone, PartialEq)]
pub struct ScorekeepingConfig {
    pub min_lineup_size: usize,
    pub max_lineup_size: usize,
    pub enforce_rbi_exclusions: bool,
    pub stats_tolerance: f64,
}

impl Default for ScorekeepingConfig {
    fn default() -> Self {
        Self {
            min_lineup_size: MIN_LINEUP_SIZE,
            max_lineup_size: MAX_LINEUP_SIZE,
            enforce_rbi_exclusions: true,
            stats_tolerance: DEFAULT_TOLERANCE,
        }
    }
}

impl ScorekeepingConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from any key/value source. Unparseable or out-of-range values
    /// fall back to their defaults with a warning.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();

        let lineup_size = |key: &str, default: usize| -> usize {
            match parse::<usize>(&lookup, key) {
                Some(n) if (MIN_LINEUP_SIZE..=MAX_LINEUP_SIZE).contains(&n) => n,
                Some(n) => {
                    let clamped = n.clamp(MIN_LINEUP_SIZE, MAX_LINEUP_SIZE);
                    tracing::warn!(
                        key,
                        value = n,
                        clamped,
                        "lineup size outside {MIN_LINEUP_SIZE}..={MAX_LINEUP_SIZE}; clamping"
                    );
                    clamped
                }
                None => default,
            }
        };

        let mut min_lineup_size = lineup_size(MIN_LINEUP_SIZE_VAR, defaults.min_lineup_size);
        let mut max_lineup_size = lineup_size(MAX_LINEUP_SIZE_VAR, defaults.max_lineup_size);
        if min_lineup_size > max_lineup_size {
            tracing::warn!(
                min_lineup_size,
                max_lineup_size,
                "minimum lineup size exceeds maximum; using defaults"
            );
            min_lineup_size = defaults.min_lineup_size;
            max_lineup_size = defaults.max_lineup_size;
        }

        let enforce_rbi_exclusions = parse::<bool>(&lookup, ENFORCE_RBI_EXCLUSIONS_VAR)
            .unwrap_or(defaults.enforce_rbi_exclusions);

        let stats_tolerance = match parse::<f64>(&lookup, STATS_TOLERANCE_VAR) {
            Some(t) if t.is_finite() && t >= 0.0 => t,
            Some(t) => {
                tracing::warn!(value = t, "invalid statistics tolerance; using default");
                defaults.stats_tolerance
            }
            None => defaults.stats_tolerance,
        };

        Self {
            min_lineup_size,
            max_lineup_size,
            enforce_rbi_exclusions,
            stats_tolerance,
        }
    }

    pub fn rule_set(&self) -> RuleSet {
        RuleSet::new(
            self.min_lineup_size,
            self.max_lineup_size,
            self.enforce_rbi_exclusions,
        )
        .unwrap_or_else(|err| {
            tracing::warn!(error = %err, "invalid rule set; using defaults");
            RuleSet::default()
        })
    }

    pub fn rule_engine(&self) -> GameRuleEngine {
        GameRuleEngine::new(self.rule_set())
    }
}

fn parse<T: core::str::FromStr>(lookup: &impl Fn(&str) -> Option<String>, key: &str) -> Option<T> {
    let raw = lookup(key)?;
    match raw.trim().parse::<T>() {
        Ok(value) => Some(value),
        Err(_) => {
            tracing::warn!(key, value = %raw, "unparseable configuration value; using default");
            None
        }
    }
}
