//! Record-at-bat use case (application-level orchestration).
//!
//! One invocation turns one plate appearance into exactly one persisted
//! `AtBat` and one persisted `Game`:
//!
//! ```text
//! RecordAtBatCommand
//!   ↓
//! 1. Load the game; it must be in progress
//!   ↓
//! 2. Check the batter is the one due up
//!   ↓
//! 3. Compute advancement (overrides if any, standard table otherwise)
//!   ↓
//! 4. Validate the transition with the rule engine
//!   ↓
//! 5. Cancel runs if the third out is the batter or a force out
//!   ↓
//! 6. Apply runs, baserunners, outs (inning flip) and next batter to the game
//!   ↓
//! 7. Save the at-bat, then save the game
//! ```
//!
//! Steps 1-6 touch no storage, so any rejection leaves nothing behind. The
//! at-bat is saved first: if the game save then fails, the at-bat record is
//! the authoritative trace of the play and the caller gets
//! `RecordAtBatError::PartialFailure` with the ids needed to reconcile. That
//! error must not be blindly retried, since a retry would record the play
//! twice.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use slowpitch_baserunning::{
    AtBatTransition, BaserunnerAdvancementService, BaserunnerState, BaserunningError,
    BattingResult, GameRuleEngine, ManualOverrides, OUTS_PER_HALF_INNING, RuleViolation,
};
use slowpitch_core::{AtBatId, DomainError, GameId, PlayerId};
use slowpitch_games::{AtBat, GameStatus, PitchCount};

use crate::repository::{AtBatRepository, GameRepository, RepositoryError};

/// Command: record one plate appearance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordAtBatCommand {
    pub game_id: GameId,
    pub batter_id: PlayerId,
    pub batting_result: BattingResult,
    pub final_count: PitchCount,
    /// Informational only.
    pub pitch_sequence: Option<Vec<String>>,
    /// Scorer-supplied destinations. Empty means standard advancement.
    #[serde(default)]
    pub overrides: ManualOverrides,
    /// RBIs claimed by the scorer. Defaults to the computed count; a claim is
    /// checked by the rule engine like any other part of the play.
    #[serde(default)]
    pub rbis: Option<u32>,
    #[serde(default)]
    pub description: Option<String>,
    pub occurred_at: DateTime<Utc>,
}

impl RecordAtBatCommand {
    /// A command with a 0-0 count, no overrides and no scorer claims.
    pub fn new(game_id: GameId, batter_id: PlayerId, batting_result: BattingResult) -> Self {
        Self {
            game_id,
            batter_id,
            batting_result,
            final_count: PitchCount::default(),
            pitch_sequence: None,
            overrides: ManualOverrides::new(),
            rbis: None,
            description: None,
            occurred_at: Utc::now(),
        }
    }

    pub fn with_overrides(mut self, overrides: ManualOverrides) -> Self {
        self.overrides = overrides;
        self
    }
}

/// What the at-bat did to the game.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RecordAtBatSummary {
    pub at_bat_id: AtBatId,
    pub runs_scored: u32,
    /// Runs that crossed the plate but were cancelled by the third out.
    pub runs_voided: u32,
    pub rbis: u32,
    pub outs: u8,
    /// The play ended the half-inning.
    pub advance_inning: bool,
    /// Bases after the play (empty when the half-inning ended).
    pub new_baserunners: BaserunnerState,
    pub game_version: u64,
}

#[derive(Debug, Error)]
pub enum RecordAtBatError {
    #[error("invalid at-bat: {0}")]
    Validation(String),

    #[error("override names {player}, who is neither the batter nor on base")]
    UnknownOverrideRunner { player: PlayerId },

    #[error("at-bat breaks {} rule(s): {}", .0.len(), describe_violations(.0))]
    RuleViolations(Vec<RuleViolation>),

    #[error(transparent)]
    Domain(DomainError),

    #[error("game {0} not found")]
    GameNotFound(GameId),

    #[error("{message}")]
    GameNotInProgress { status: GameStatus, message: String },

    #[error("batter {supplied} is not due up; {expected} is batting {batting_order}")]
    BatterMismatch {
        expected: PlayerId,
        supplied: PlayerId,
        batting_order: u8,
    },

    #[error("game has no current batter")]
    NoCurrentBatter,

    /// Storage failed before anything was written.
    #[error("storage failure, nothing was recorded: {0}")]
    Store(#[source] RepositoryError),

    /// The at-bat was written but the game was not; the stored game is stale.
    #[error("at-bat {at_bat_id} was recorded but game {game_id} was not saved: {source}")]
    PartialFailure {
        at_bat_id: AtBatId,
        game_id: GameId,
        #[source]
        source: RepositoryError,
    },
}

impl RecordAtBatError {
    pub fn is_partial_failure(&self) -> bool {
        matches!(self, RecordAtBatError::PartialFailure { .. })
    }

    /// Whether the caller can treat the at-bat as never having happened.
    pub fn nothing_persisted(&self) -> bool {
        !self.is_partial_failure()
    }
}

fn describe_violations(violations: &[RuleViolation]) -> String {
    violations
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

impl From<BaserunningError> for RecordAtBatError {
    fn from(value: BaserunningError) -> Self {
        match value {
            BaserunningError::UnknownRunner { player } => {
                RecordAtBatError::UnknownOverrideRunner { player }
            }
            BaserunningError::InvalidDestination { .. } => {
                RecordAtBatError::Validation(value.to_string())
            }
            other => RecordAtBatError::Domain(other.into()),
        }
    }
}

impl From<DomainError> for RecordAtBatError {
    fn from(value: DomainError) -> Self {
        match value {
            DomainError::Validation(msg) | DomainError::InvalidId(msg) => {
                RecordAtBatError::Validation(msg)
            }
            other => RecordAtBatError::Domain(other),
        }
    }
}

/// Record-at-bat use case over injected repositories and rules.
#[derive(Debug)]
pub struct RecordAtBat<G, A> {
    games: G,
    at_bats: A,
    advancement: BaserunnerAdvancementService,
    rules: GameRuleEngine,
}

impl<G, A> RecordAtBat<G, A> {
    pub fn new(games: G, at_bats: A, rules: GameRuleEngine) -> Self {
        Self {
            games,
            at_bats,
            advancement: BaserunnerAdvancementService::new(),
            rules,
        }
    }

    pub fn into_parts(self) -> (G, A) {
        (self.games, self.at_bats)
    }
}

impl<G, A> RecordAtBat<G, A>
where
    G: GameRepository,
    A: AtBatRepository,
{
    #[tracing::instrument(
        skip(self, command),
        fields(
            game_id = %command.game_id,
            batter_id = %command.batter_id,
            result = %command.batting_result.code(),
        )
    )]
    pub fn execute(
        &self,
        command: RecordAtBatCommand,
    ) -> Result<RecordAtBatSummary, RecordAtBatError> {
        let count = PitchCount::new(command.final_count.balls, command.final_count.strikes)?;

        // 1) Load + status guard
        let mut game = self
            .games
            .find_by_id(command.game_id)
            .map_err(RecordAtBatError::Store)?
            .ok_or(RecordAtBatError::GameNotFound(command.game_id))?;

        if let Err(err) = game.ensure_in_progress() {
            let message = match err {
                DomainError::InvariantViolation(msg) => msg,
                other => other.to_string(),
            };
            return Err(RecordAtBatError::GameNotInProgress {
                status: game.status(),
                message,
            });
        }

        // 2) Batter order
        let current = game.current_batter().ok_or(RecordAtBatError::NoCurrentBatter)?;
        if current.player_id != command.batter_id {
            return Err(RecordAtBatError::BatterMismatch {
                expected: current.player_id,
                supplied: command.batter_id,
                batting_order: current.batting_order,
            });
        }

        // 3) Advancement
        let before = game.baserunners().clone();
        let outs_before = game.outs();
        let result = command.batting_result;
        let mut outcome = if command.overrides.is_empty() {
            self.advancement
                .calculate_standard_advancement(&before, result, &command.batter_id)?
        } else {
            self.advancement.apply_manual_overrides(
                &before,
                result,
                &command.batter_id,
                &command.overrides,
            )?
        };
        let mut rbis = command.rbis.unwrap_or(outcome.rbis);
        let outs = result.outs_produced().max(outcome.outs_recorded());

        // 4) Rules
        let mut transition =
            AtBatTransition::from_outcome(&before, result, &command.batter_id, &outcome, outs, outs_before);
        transition.rbis = rbis;
        let report = self.rules.validate_at_bat(&transition);
        if !report.is_valid() {
            tracing::info!(
                violations = report.violations.len(),
                "at-bat rejected by rule engine"
            );
            return Err(RecordAtBatError::RuleViolations(report.violations));
        }

        // 5) Third-out run cancellation
        let ends_half = outs_before.saturating_add(outs) >= OUTS_PER_HALF_INNING;
        let voided_runners = if ends_half
            && !outcome.runs_stand_on_third_out(&before, &command.batter_id)
        {
            rbis = 0;
            outcome.void_runs()
        } else {
            Vec::new()
        };
        if !voided_runners.is_empty() {
            tracing::info!(
                voided = voided_runners.len(),
                "third out cancels the runs on the play"
            );
        }

        // 6) Apply to the game (in memory only)
        let runs = outcome.runs_scored();
        game.update_baserunners(outcome.final_baserunners.clone())?;
        game.add_runs(runs)?;
        let inning = game.inning();
        let half = game.half();
        let advance_inning = game.add_outs(outs)?;
        if advance_inning {
            game.advance_inning()?;
            game.clear_baserunners()?;
        }
        game.advance_to_next_batter()?;

        let description = command.description.clone().unwrap_or_else(|| {
            AtBat::describe(
                &command.batter_id,
                result,
                &outcome.scoring_runners,
                &voided_runners,
                &outcome.put_out,
                rbis,
            )
        });
        let at_bat = AtBat {
            id: AtBatId::new(),
            game_id: command.game_id,
            inning,
            half,
            batter_id: command.batter_id.clone(),
            batting_order: current.batting_order,
            result,
            rbis,
            scoring_runners: outcome.scoring_runners.clone(),
            voided_runners: voided_runners.clone(),
            put_out: outcome.put_out.clone(),
            outs,
            baserunners_before: before,
            baserunners_after: outcome.final_baserunners,
            final_count: count,
            pitch_sequence: command.pitch_sequence,
            description,
            created_at: command.occurred_at,
        };

        // 7) Persist: at-bat first, then game
        self.at_bats
            .save(&at_bat)
            .map_err(RecordAtBatError::Store)?;

        let game_version = self.games.save(&game).map_err(|source| {
            tracing::error!(
                at_bat_id = %at_bat.id,
                error = %source,
                "at-bat recorded but game save failed; game state is stale"
            );
            RecordAtBatError::PartialFailure {
                at_bat_id: at_bat.id,
                game_id: command.game_id,
                source,
            }
        })?;

        tracing::info!(
            at_bat_id = %at_bat.id,
            runs,
            rbis,
            outs,
            advance_inning,
            "at-bat recorded"
        );

        Ok(RecordAtBatSummary {
            at_bat_id: at_bat.id,
            runs_scored: runs,
            runs_voided: voided_runners.len() as u32,
            rbis,
            outs,
            advance_inning,
            new_baserunners: game.baserunners().clone(),
            game_version,
        })
    }
}
