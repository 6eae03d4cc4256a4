//! Official-rules validation of a proposed at-bat transition.
//!
//! The engine runs every check independently and collects all violations, so a
//! scorer sees every problem with a play at once instead of fixing them one at
//! a time.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use slowpitch_core::{DomainError, DomainResult, PlayerId};

use crate::advancement::AdvancementOutcome;
use crate::batting_result::BattingResult;
use crate::error::BaserunningError;
use crate::state::{BaseSnapshot, BaserunnerState};

/// Outs that end a half-inning.
pub const OUTS_PER_HALF_INNING: u8 = 3;

/// Smallest and largest batting order the league allows.
pub const MIN_LINEUP_SIZE: usize = 9;
pub const MAX_LINEUP_SIZE: usize = 12;

/// League rule settings, built once at start-up and passed to whatever needs them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuleSet {
    min_lineup_size: usize,
    max_lineup_size: usize,
    enforce_rbi_exclusions: bool,
}

impl Default for RuleSet {
    fn default() -> Self {
        Self {
            min_lineup_size: MIN_LINEUP_SIZE,
            max_lineup_size: MAX_LINEUP_SIZE,
            enforce_rbi_exclusions: true,
        }
    }
}

impl RuleSet {
    pub fn new(
        min_lineup_size: usize,
        max_lineup_size: usize,
        enforce_rbi_exclusions: bool,
    ) -> DomainResult<Self> {
        let allowed = MIN_LINEUP_SIZE..=MAX_LINEUP_SIZE;
        if !allowed.contains(&min_lineup_size) || !allowed.contains(&max_lineup_size) {
            return Err(DomainError::validation(format!(
                "lineup size bounds must be within {MIN_LINEUP_SIZE}..={MAX_LINEUP_SIZE}"
            )));
        }
        if min_lineup_size > max_lineup_size {
            return Err(DomainError::validation(
                "minimum lineup size cannot exceed maximum",
            ));
        }
        Ok(Self {
            min_lineup_size,
            max_lineup_size,
            enforce_rbi_exclusions,
        })
    }

    pub fn min_lineup_size(&self) -> usize {
        self.min_lineup_size
    }

    pub fn max_lineup_size(&self) -> usize {
        self.max_lineup_size
    }

    pub fn enforce_rbi_exclusions(&self) -> bool {
        self.enforce_rbi_exclusions
    }

    pub fn allows_lineup_size(&self, size: usize) -> bool {
        (self.min_lineup_size..=self.max_lineup_size).contains(&size)
    }
}

/// Proposed effect of one at-bat, as the scorer (or the advancement service)
/// describes it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AtBatTransition {
    pub before: BaseSnapshot,
    pub after: BaseSnapshot,
    pub batting_result: BattingResult,
    pub batter_id: PlayerId,
    pub runs_scored: Vec<PlayerId>,
    pub rbis: u32,
    /// Outs recorded on this play.
    pub outs: u8,
    /// Outs in the half-inning before the play.
    pub outs_before: u8,
}

impl AtBatTransition {
    pub fn from_outcome(
        before: &BaserunnerState,
        batting_result: BattingResult,
        batter_id: &PlayerId,
        outcome: &AdvancementOutcome,
        outs: u8,
        outs_before: u8,
    ) -> Self {
        Self {
            before: before.to_snapshot(),
            after: outcome.final_baserunners.to_snapshot(),
            batting_result,
            batter_id: batter_id.clone(),
            runs_scored: outcome.scoring_runners.clone(),
            rbis: outcome.rbis,
            outs,
            outs_before,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SnapshotRole {
    Before,
    After,
}

impl core::fmt::Display for SnapshotRole {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(match self {
            SnapshotRole::Before => "before",
            SnapshotRole::After => "after",
        })
    }
}

/// A single broken rule.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RuleViolation {
    #[error("runner {runner} passed runner {passed}")]
    RunnerPassing { runner: PlayerId, passed: PlayerId },

    #[error("{claimed} RBIs claimed on a {result}, at most {allowed} allowed")]
    IncorrectRbiCount {
        claimed: u32,
        allowed: u32,
        result: BattingResult,
    },

    #[error("{outs} outs on a {result} with {outs_before} already recorded is too many")]
    ExcessiveOuts {
        outs: u8,
        outs_before: u8,
        result: BattingResult,
    },

    #[error("impossible baserunner state {state} the at-bat: {detail}")]
    ImpossibleBaserunnerState {
        state: SnapshotRole,
        player: PlayerId,
        detail: String,
    },

    #[error("{result} is not possible in this situation: {reason}")]
    IllegalPlayForSituation {
        result: BattingResult,
        reason: String,
    },

    #[error("{missing} players left the bases without scoring but {outs} outs were recorded")]
    UnaccountedRunners { missing: u8, outs: u8 },

    #[error("{player} was neither on base nor batting")]
    UnknownRunner { player: PlayerId },
}

impl RuleViolation {
    pub fn kind(&self) -> &'static str {
        match self {
            RuleViolation::RunnerPassing { .. } => "runner_passing",
            RuleViolation::IncorrectRbiCount { .. } => "incorrect_rbi_count",
            RuleViolation::ExcessiveOuts { .. } => "excessive_outs",
            RuleViolation::ImpossibleBaserunnerState { .. } => "impossible_baserunner_state",
            RuleViolation::IllegalPlayForSituation { .. } => "illegal_play_for_situation",
            RuleViolation::UnaccountedRunners { .. } => "unaccounted_runners",
            RuleViolation::UnknownRunner { .. } => "unknown_runner",
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationReport {
    pub violations: Vec<RuleViolation>,
}

impl ValidationReport {
    pub fn is_valid(&self) -> bool {
        self.violations.is_empty()
    }

    pub fn into_result(self) -> Result<(), Vec<RuleViolation>> {
        if self.violations.is_empty() {
            Ok(())
        } else {
            Err(self.violations)
        }
    }
}

/// Validates at-bat transitions against the official rules.
#[derive(Debug, Clone, Default)]
pub struct GameRuleEngine {
    rules: RuleSet,
}

impl GameRuleEngine {
    pub fn new(rules: RuleSet) -> Self {
        Self { rules }
    }

    pub fn rules(&self) -> &RuleSet {
        &self.rules
    }

    pub fn validate_at_bat(&self, transition: &AtBatTransition) -> ValidationReport {
        let mut violations = Vec::new();

        check_state_integrity(transition, &mut violations);
        check_runner_order(transition, &mut violations);
        self.check_rbis(transition, &mut violations);
        check_outs(transition, &mut violations);
        check_play_legality(transition, &mut violations);
        check_runner_accounting(transition, &mut violations);

        ValidationReport { violations }
    }

    fn check_rbis(&self, t: &AtBatTransition, out: &mut Vec<RuleViolation>) {
        let runs = t.runs_scored.len() as u32;
        let allowed = if self.rules.enforce_rbi_exclusions && !t.batting_result.credits_rbi() {
            0
        } else {
            runs
        };
        if t.rbis > allowed {
            out.push(RuleViolation::IncorrectRbiCount {
                claimed: t.rbis,
                allowed,
                result: t.batting_result,
            });
        }
    }
}

fn check_state_integrity(t: &AtBatTransition, out: &mut Vec<RuleViolation>) {
    for (role, snapshot) in [(SnapshotRole::Before, &t.before), (SnapshotRole::After, &t.after)] {
        if let Some(player) = snapshot.duplicate_runner() {
            out.push(RuleViolation::ImpossibleBaserunnerState {
                state: role,
                player: player.clone(),
                detail: format!("{player} occupies more than one base"),
            });
        }
    }

    if t.before.runners().any(|(_, p)| *p == t.batter_id) {
        out.push(RuleViolation::ImpossibleBaserunnerState {
            state: SnapshotRole::Before,
            player: t.batter_id.clone(),
            detail: format!("batter {} is already on base", t.batter_id),
        });
    }

    for (_, player) in t.after.runners() {
        if t.runs_scored.contains(player) {
            out.push(RuleViolation::ImpossibleBaserunnerState {
                state: SnapshotRole::After,
                player: player.clone(),
                detail: format!("{player} both scored and remains on base"),
            });
        }
    }
}

/// Position on the basepaths: 0 = batter's box, 1-3 = bases, 4 = scored.
fn after_positions(t: &AtBatTransition) -> HashMap<&PlayerId, u8> {
    let mut positions: HashMap<&PlayerId, u8> = HashMap::new();
    for (base, player) in t.after.runners() {
        positions.entry(player).or_insert(base.number());
    }
    for player in &t.runs_scored {
        positions.entry(player).or_insert(4);
    }
    positions
}

fn check_runner_order(t: &AtBatTransition, out: &mut Vec<RuleViolation>) {
    let mut starting: Vec<(&PlayerId, u8)> = t
        .before
        .runners()
        .map(|(base, player)| (player, base.number()))
        .collect();
    starting.push((&t.batter_id, 0));

    let after = after_positions(t);

    for (lead, lead_start) in &starting {
        for (trail, trail_start) in &starting {
            if lead_start <= trail_start || lead == trail {
                continue;
            }
            let (Some(lead_end), Some(trail_end)) = (after.get(lead), after.get(trail)) else {
                continue;
            };
            if trail_end > lead_end {
                out.push(RuleViolation::RunnerPassing {
                    runner: (*trail).clone(),
                    passed: (*lead).clone(),
                });
            }
        }
    }
}

fn check_outs(t: &AtBatTransition, out: &mut Vec<RuleViolation>) {
    let over_play_limit = t.outs > t.batting_result.max_outs();
    let over_inning_limit = t.outs_before >= OUTS_PER_HALF_INNING
        || t.outs_before + t.outs > OUTS_PER_HALF_INNING;
    if over_play_limit || over_inning_limit {
        out.push(RuleViolation::ExcessiveOuts {
            outs: t.outs,
            outs_before: t.outs_before,
            result: t.batting_result,
        });
    }
}

fn check_play_legality(t: &AtBatTransition, out: &mut Vec<RuleViolation>) {
    if let Err(BaserunningError::IllegalPlay { result, reason }) = t
        .batting_result
        .legality(t.before.occupancy(), t.outs_before)
    {
        out.push(RuleViolation::IllegalPlayForSituation { result, reason });
    }
}

fn check_runner_accounting(t: &AtBatTransition, out: &mut Vec<RuleViolation>) {
    let mut participants: Vec<&PlayerId> = t.before.runners().map(|(_, p)| p).collect();
    if !participants.contains(&&t.batter_id) {
        participants.push(&t.batter_id);
    }

    let after = after_positions(t);
    for player in after.keys() {
        if !participants.contains(player) {
            out.push(RuleViolation::UnknownRunner {
                player: (*player).clone(),
            });
        }
    }

    participants.sort();
    participants.dedup();
    let missing = participants
        .iter()
        .filter(|p| !after.contains_key(**p))
        .count() as u8;
    if missing != t.outs {
        out.push(RuleViolation::UnaccountedRunners {
            missing,
            outs: t.outs,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::advancement::BaserunnerAdvancementService;
    use proptest::prelude::*;

    fn p(id: &str) -> PlayerId {
        PlayerId::new(id).unwrap()
    }

    fn snap(first: Option<&str>, second: Option<&str>, third: Option<&str>) -> BaseSnapshot {
        BaseSnapshot {
            first: first.map(p),
            second: second.map(p),
            third: third.map(p),
        }
    }

    fn transition(
        before: BaseSnapshot,
        after: BaseSnapshot,
        result: BattingResult,
        runs: &[&str],
        rbis: u32,
        outs: u8,
    ) -> AtBatTransition {
        AtBatTransition {
            before,
            after,
            batting_result: result,
            batter_id: p("B1"),
            runs_scored: runs.iter().map(|r| p(r)).collect(),
            rbis,
            outs,
            outs_before: 0,
        }
    }

    fn kinds(report: &ValidationReport) -> Vec<&'static str> {
        report.violations.iter().map(RuleViolation::kind).collect()
    }

    #[test]
    fn clean_single_is_valid() {
        let t = transition(
            snap(None, Some("R2"), None),
            snap(Some("B1"), None, Some("R2")),
            BattingResult::Single,
            &[],
            0,
            0,
        );
        assert!(GameRuleEngine::default().validate_at_bat(&t).is_valid());
    }

    #[test]
    fn runner_passing_is_reported() {
        // Batter ends on second while the runner from first is held at first.
        let t = transition(
            snap(Some("R1"), None, None),
            snap(Some("R1"), Some("B1"), None),
            BattingResult::Double,
            &[],
            0,
            0,
        );
        let report = GameRuleEngine::default().validate_at_bat(&t);
        assert_eq!(
            report.violations,
            vec![RuleViolation::RunnerPassing {
                runner: p("B1"),
                passed: p("R1"),
            }]
        );
    }

    #[test]
    fn rbis_on_strikeout_are_rejected() {
        let t = transition(
            snap(None, None, Some("R3")),
            snap(None, None, None),
            BattingResult::Strikeout,
            &["R3"],
            1,
            1,
        );
        let report = GameRuleEngine::default().validate_at_bat(&t);
        assert_eq!(kinds(&report), vec!["incorrect_rbi_count"]);
    }

    #[test]
    fn rbi_exclusions_can_be_relaxed() {
        let t = transition(
            snap(Some("R1"), Some("R2"), Some("R3")),
            snap(Some("B1"), Some("R1"), Some("R2")),
            BattingResult::ReachedOnError,
            &["R3"],
            1,
            0,
        );
        assert_eq!(
            kinds(&GameRuleEngine::default().validate_at_bat(&t)),
            vec!["incorrect_rbi_count"]
        );
        let lenient = GameRuleEngine::new(RuleSet::new(9, 12, false).unwrap());
        assert!(lenient.validate_at_bat(&t).is_valid());
    }

    #[test]
    fn rbis_cannot_exceed_runs() {
        let t = transition(
            snap(None, None, None),
            snap(Some("B1"), None, None),
            BattingResult::Single,
            &[],
            2,
            0,
        );
        assert_eq!(
            kinds(&GameRuleEngine::default().validate_at_bat(&t)),
            vec!["incorrect_rbi_count"]
        );
    }

    #[test]
    fn two_outs_on_a_ground_out_are_excessive() {
        let mut t = transition(
            snap(Some("R1"), None, None),
            snap(None, None, None),
            BattingResult::GroundOut,
            &[],
            0,
            2,
        );
        let report = GameRuleEngine::default().validate_at_bat(&t);
        assert!(kinds(&report).contains(&"excessive_outs"));

        t.outs = 1;
        t.outs_before = 2;
        t.after = snap(Some("R1"), None, None);
        assert!(GameRuleEngine::default().validate_at_bat(&t).is_valid());
    }

    #[test]
    fn double_play_with_two_outs_reports_outs_and_legality() {
        let mut t = transition(
            snap(Some("R1"), None, None),
            snap(None, None, None),
            BattingResult::DoublePlay,
            &[],
            0,
            2,
        );
        t.outs_before = 2;
        let report = GameRuleEngine::default().validate_at_bat(&t);
        assert_eq!(
            kinds(&report),
            vec!["excessive_outs", "illegal_play_for_situation"]
        );
    }

    #[test]
    fn duplicate_after_state_is_impossible() {
        let t = transition(
            snap(Some("R1"), None, None),
            snap(Some("B1"), Some("R1"), Some("R1")),
            BattingResult::Single,
            &[],
            0,
            0,
        );
        let report = GameRuleEngine::default().validate_at_bat(&t);
        assert!(kinds(&report).contains(&"impossible_baserunner_state"));
    }

    #[test]
    fn multiple_violations_are_collected() {
        let t = transition(
            snap(None, None, None),
            snap(None, None, None),
            BattingResult::SacrificeFly,
            &[],
            1,
            2,
        );
        let report = GameRuleEngine::default().validate_at_bat(&t);
        let kinds = kinds(&report);
        assert!(kinds.contains(&"incorrect_rbi_count"));
        assert!(kinds.contains(&"excessive_outs"));
        assert!(kinds.contains(&"illegal_play_for_situation"));
        assert!(kinds.contains(&"unaccounted_runners"));
        assert!(report.clone().into_result().is_err());
    }

    #[test]
    fn phantom_runner_is_reported() {
        let t = transition(
            snap(None, None, None),
            snap(Some("B1"), None, None),
            BattingResult::Single,
            &["GHOST"],
            1,
            0,
        );
        let report = GameRuleEngine::default().validate_at_bat(&t);
        assert!(report.violations.contains(&RuleViolation::UnknownRunner { player: p("GHOST") }));
    }

    #[test]
    fn violation_serializes_with_kind_tag() {
        let v = RuleViolation::UnaccountedRunners { missing: 1, outs: 0 };
        let json = serde_json::to_value(&v).unwrap();
        assert_eq!(json["kind"], "unaccounted_runners");
    }

    #[test]
    fn rule_set_bounds() {
        assert!(RuleSet::new(8, 12, true).is_err());
        assert!(RuleSet::new(11, 10, true).is_err());
        let rules = RuleSet::new(10, 11, true).unwrap();
        assert!(rules.allows_lineup_size(10));
        assert!(!rules.allows_lineup_size(9));
    }

    fn arb_snapshot() -> impl Strategy<Value = BaserunnerState> {
        (any::<bool>(), any::<bool>(), any::<bool>()).prop_map(|(a, b, c)| {
            BaserunnerState::new(a.then(|| p("R1")), b.then(|| p("R2")), c.then(|| p("R3")))
                .unwrap()
        })
    }

    proptest! {
        #![proptest_config(ProptestConfig {
            cases: 256,
            ..ProptestConfig::default()
        })]

        /// Property: whatever the standard table produces for a legal play is
        /// accepted by the rule engine.
        #[test]
        fn standard_advancement_is_always_valid(
            before in arb_snapshot(),
            result in prop::sample::select(BattingResult::ALL.to_vec()),
            outs_before in 0u8..3
        ) {
            prop_assume!(result.legality(before.occupancy(), outs_before).is_ok());
            let outcome = BaserunnerAdvancementService::new()
                .calculate_standard_advancement(&before, result, &p("B1"))
                .unwrap();
            let outs = outcome.outs_recorded();
            prop_assume!(outs_before + outs <= OUTS_PER_HALF_INNING);

            let t = AtBatTransition::from_outcome(&before, result, &p("B1"), &outcome, outs, outs_before);
            let report = GameRuleEngine::default().validate_at_bat(&t);
            prop_assert!(report.is_valid(), "{:?}", report.violations);
        }
    }
}
