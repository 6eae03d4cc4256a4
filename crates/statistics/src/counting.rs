use serde::{Deserialize, Serialize};

use slowpitch_baserunning::BattingResult;
use slowpitch_core::{DomainError, DomainResult};

/// Cumulative counting stats for one player.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CountingStats {
    pub games: u32,
    pub at_bats: u32,
    pub hits: u32,
    pub singles: u32,
    pub doubles: u32,
    pub triples: u32,
    pub home_runs: u32,
    pub runs: u32,
    pub rbis: u32,
    pub walks: u32,
    pub strikeouts: u32,
}

impl CountingStats {
    /// Fold one plate appearance into the totals. Runs scored are credited
    /// separately since they belong to whoever crossed the plate.
    pub fn record(&mut self, result: BattingResult, rbis: u32) {
        if result.is_official_at_bat() {
            bump(&mut self.at_bats, 1);
        }
        match result {
            BattingResult::Single => bump(&mut self.singles, 1),
            BattingResult::Double => bump(&mut self.doubles, 1),
            BattingResult::Triple => bump(&mut self.triples, 1),
            BattingResult::HomeRun => bump(&mut self.home_runs, 1),
            BattingResult::Walk | BattingResult::IntentionalWalk => bump(&mut self.walks, 1),
            BattingResult::Strikeout => bump(&mut self.strikeouts, 1),
            BattingResult::SacrificeFly
            | BattingResult::ReachedOnError
            | BattingResult::FieldersChoice
            | BattingResult::GroundOut
            | BattingResult::AirOut
            | BattingResult::DoublePlay => {}
        }
        if result.is_hit() {
            bump(&mut self.hits, 1);
        }
        bump(&mut self.rbis, rbis);
    }

    /// Widened so that no combination of stored counts can overflow.
    pub fn total_bases(&self) -> u64 {
        u64::from(self.singles)
            + 2 * u64::from(self.doubles)
            + 3 * u64::from(self.triples)
            + 4 * u64::from(self.home_runs)
    }

    pub fn hit_breakdown(&self) -> u64 {
        [self.singles, self.doubles, self.triples, self.home_runs]
            .into_iter()
            .map(u64::from)
            .sum()
    }

    /// Cross-field consistency of the raw counts.
    pub fn validate(&self) -> DomainResult<()> {
        if self.hits > self.at_bats {
            return Err(DomainError::validation(format!(
                "hits ({}) cannot exceed at-bats ({})",
                self.hits, self.at_bats
            )));
        }
        let breakdown = self.hit_breakdown();
        if breakdown != u64::from(self.hits) {
            return Err(DomainError::validation(format!(
                "hit breakdown ({breakdown}) does not match hits ({})",
                self.hits
            )));
        }
        Ok(())
    }
}

fn bump(count: &mut u32, by: u32) {
    *count = count.saturating_add(by);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn records_plate_appearances() {
        let mut stats = CountingStats::default();
        stats.record(BattingResult::Single, 1);
        stats.record(BattingResult::HomeRun, 2);
        stats.record(BattingResult::Walk, 1);
        stats.record(BattingResult::SacrificeFly, 1);
        stats.record(BattingResult::Strikeout, 0);
        stats.record(BattingResult::ReachedOnError, 0);

        assert_eq!(stats.at_bats, 4);
        assert_eq!(stats.hits, 2);
        assert_eq!(stats.singles, 1);
        assert_eq!(stats.home_runs, 1);
        assert_eq!(stats.walks, 1);
        assert_eq!(stats.strikeouts, 1);
        assert_eq!(stats.rbis, 5);
        assert_eq!(stats.total_bases(), 5);
        assert!(stats.validate().is_ok());
    }

    #[test]
    fn rejects_inconsistent_counts() {
        let too_many_hits = CountingStats {
            at_bats: 1,
            hits: 2,
            singles: 2,
            ..CountingStats::default()
        };
        assert!(too_many_hits.validate().is_err());

        let bad_breakdown = CountingStats {
            at_bats: 5,
            hits: 3,
            singles: 1,
            doubles: 1,
            ..CountingStats::default()
        };
        assert!(bad_breakdown.validate().is_err());
    }

    #[test]
    fn corrupt_counts_are_rejected_not_overflowed() {
        let stats: CountingStats = serde_json::from_value(serde_json::json!({
            "games": 1,
            "atBats": u32::MAX,
            "hits": u32::MAX,
            "singles": u32::MAX,
            "doubles": 1,
            "triples": 0,
            "homeRuns": 0,
            "runs": 0,
            "rbis": 0,
            "walks": 0,
            "strikeouts": 0
        }))
        .unwrap();

        assert!(matches!(stats.validate(), Err(DomainError::Validation(_))));
        assert_eq!(stats.total_bases(), u64::from(u32::MAX) + 2);
    }

    #[test]
    fn recording_saturates_at_the_ceiling() {
        let mut stats = CountingStats {
            at_bats: u32::MAX,
            hits: u32::MAX,
            singles: u32::MAX,
            rbis: u32::MAX,
            ..CountingStats::default()
        };
        stats.record(BattingResult::Single, 3);
        assert_eq!(stats.at_bats, u32::MAX);
        assert_eq!(stats.rbis, u32::MAX);
        assert!(stats.validate().is_ok());
    }
}
