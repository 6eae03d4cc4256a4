use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use slowpitch_baserunning::{BaserunnerState, OUTS_PER_HALF_INNING};
use slowpitch_core::{AggregateRoot, DomainError, DomainResult, Entity, GameId, LineupId, TeamId};

use crate::lineup::{CurrentBatter, Lineup};
use crate::score::{InningHalf, Score};

/// Game status lifecycle.
///
/// `Setup -> InProgress -> Completed`, with `InProgress <-> Suspended` as the
/// only reversible edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GameStatus {
    Setup,
    InProgress,
    Suspended,
    Completed,
}

impl core::fmt::Display for GameStatus {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(match self {
            GameStatus::Setup => "in setup",
            GameStatus::InProgress => "in progress",
            GameStatus::Suspended => "suspended",
            GameStatus::Completed => "completed",
        })
    }
}

/// Aggregate root: Game.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Game {
    id: GameId,
    team_id: TeamId,
    opponent: String,
    scheduled_at: DateTime<Utc>,
    status: GameStatus,
    inning: u8,
    half: InningHalf,
    outs: u8,
    baserunners: BaserunnerState,
    lineup: Option<Lineup>,
    current_batter_index: usize,
    score: Score,
    version: u64,
}

impl Game {
    /// A new game in `Setup`.
    pub fn new(
        id: GameId,
        team_id: TeamId,
        opponent: impl Into<String>,
        scheduled_at: DateTime<Utc>,
    ) -> DomainResult<Self> {
        let opponent = opponent.into().trim().to_string();
        if opponent.is_empty() {
            return Err(DomainError::validation("opponent name cannot be empty"));
        }

        Ok(Self {
            id,
            team_id,
            opponent,
            scheduled_at,
            status: GameStatus::Setup,
            inning: 1,
            half: InningHalf::Top,
            outs: 0,
            baserunners: BaserunnerState::empty(),
            lineup: None,
            current_batter_index: 0,
            score: Score::default(),
            version: 0,
        })
    }

    /// Stamp the persisted revision. Used by repositories after a save/load.
    pub fn with_version(mut self, version: u64) -> Self {
        self.version = version;
        self
    }

    pub fn team_id(&self) -> TeamId {
        self.team_id
    }

    pub fn opponent(&self) -> &str {
        &self.opponent
    }

    pub fn scheduled_at(&self) -> DateTime<Utc> {
        self.scheduled_at
    }

    pub fn status(&self) -> GameStatus {
        self.status
    }

    pub fn inning(&self) -> u8 {
        self.inning
    }

    pub fn half(&self) -> InningHalf {
        self.half
    }

    pub fn outs(&self) -> u8 {
        self.outs
    }

    pub fn baserunners(&self) -> &BaserunnerState {
        &self.baserunners
    }

    pub fn lineup(&self) -> Option<&Lineup> {
        self.lineup.as_ref()
    }

    pub fn score(&self) -> &Score {
        &self.score
    }

    /// The batter due up, or `None` until a lineup has been installed.
    pub fn current_batter(&self) -> Option<CurrentBatter> {
        let lineup = self.lineup.as_ref()?;
        let player_id = lineup.batter_at(self.current_batter_index)?.clone();
        Some(CurrentBatter {
            player_id,
            batting_order: u8::try_from(self.current_batter_index + 1).ok()?,
        })
    }

    // --- lifecycle ---

    /// Install (or replace) the batting lineup. Only allowed before first pitch.
    pub fn set_lineup(&mut self, lineup: Lineup) -> DomainResult<()> {
        if self.status != GameStatus::Setup {
            return Err(DomainError::invariant(format!(
                "lineup can only be changed during setup; game is {}",
                self.status
            )));
        }
        self.lineup = Some(lineup);
        self.current_batter_index = 0;
        Ok(())
    }

    pub fn start_game(&mut self, lineup_id: LineupId) -> DomainResult<()> {
        if self.status != GameStatus::Setup {
            return Err(transition_error("start", self.status));
        }
        match &self.lineup {
            Some(lineup) if *lineup.id() == lineup_id => {}
            Some(_) => {
                return Err(DomainError::validation(format!(
                    "lineup {lineup_id} is not the lineup set for this game"
                )));
            }
            None => {
                return Err(DomainError::validation(
                    "a lineup must be set before the game can start",
                ));
            }
        }

        self.status = GameStatus::InProgress;
        self.inning = 1;
        self.half = InningHalf::Top;
        self.outs = 0;
        self.baserunners = BaserunnerState::empty();
        self.current_batter_index = 0;
        Ok(())
    }

    pub fn suspend_game(&mut self) -> DomainResult<()> {
        if self.status != GameStatus::InProgress {
            return Err(transition_error("suspend", self.status));
        }
        self.status = GameStatus::Suspended;
        Ok(())
    }

    pub fn resume_game(&mut self) -> DomainResult<()> {
        if self.status != GameStatus::Suspended {
            return Err(transition_error("resume", self.status));
        }
        self.status = GameStatus::InProgress;
        Ok(())
    }

    pub fn complete_game(&mut self) -> DomainResult<()> {
        if self.status != GameStatus::InProgress {
            return Err(transition_error("complete", self.status));
        }
        self.status = GameStatus::Completed;
        Ok(())
    }

    /// Guard for every in-play mutation, with a message per status.
    pub fn ensure_in_progress(&self) -> DomainResult<()> {
        match self.status {
            GameStatus::InProgress => Ok(()),
            GameStatus::Setup => Err(DomainError::invariant(
                "game has not started yet; start it before recording at-bats",
            )),
            GameStatus::Suspended => Err(DomainError::invariant(
                "game is suspended; resume it before recording at-bats",
            )),
            GameStatus::Completed => Err(DomainError::invariant(
                "game is already completed; no more at-bats can be recorded",
            )),
        }
    }

    // --- in-play mutators ---

    /// Add outs to the half-inning. Returns `true` once the third out is
    /// reached; the caller then runs `advance_inning` and `clear_baserunners`.
    pub fn add_outs(&mut self, outs: u8) -> DomainResult<bool> {
        self.ensure_in_progress()?;
        let total = self.outs.saturating_add(outs);
        if total > OUTS_PER_HALF_INNING {
            return Err(DomainError::invariant(format!(
                "adding {outs} outs to {} would exceed {OUTS_PER_HALF_INNING} in the half-inning",
                self.outs
            )));
        }
        self.outs = total;
        Ok(total >= OUTS_PER_HALF_INNING)
    }

    pub fn advance_inning(&mut self) -> DomainResult<()> {
        self.ensure_in_progress()?;
        if self.half == InningHalf::Bottom {
            self.inning = self
                .inning
                .checked_add(1)
                .ok_or_else(|| DomainError::invariant("inning counter overflow"))?;
        }
        self.half = self.half.flipped();
        self.outs = 0;
        Ok(())
    }

    pub fn clear_baserunners(&mut self) -> DomainResult<()> {
        self.ensure_in_progress()?;
        self.baserunners = BaserunnerState::empty();
        Ok(())
    }

    /// Move to the next lineup slot, wrapping after the last one.
    pub fn advance_to_next_batter(&mut self) -> DomainResult<()> {
        self.ensure_in_progress()?;
        let size = self
            .lineup
            .as_ref()
            .map(Lineup::len)
            .filter(|len| *len > 0)
            .ok_or_else(|| DomainError::invariant("game has no lineup"))?;
        self.current_batter_index = (self.current_batter_index + 1) % size;
        Ok(())
    }

    pub fn update_baserunners(&mut self, baserunners: BaserunnerState) -> DomainResult<()> {
        self.ensure_in_progress()?;
        self.baserunners = baserunners;
        Ok(())
    }

    /// Credit runs to the side batting in the current half.
    pub fn add_runs(&mut self, runs: u32) -> DomainResult<()> {
        self.ensure_in_progress()?;
        if runs > 0 {
            self.score.add(self.inning, self.half, runs);
        }
        Ok(())
    }
}

impl AggregateRoot for Game {
    type Id = GameId;

    fn id(&self) -> &Self::Id {
        &self.id
    }

    fn version(&self) -> u64 {
        self.version
    }
}

fn transition_error(action: &str, status: GameStatus) -> DomainError {
    DomainError::invariant(format!("cannot {action} a game that is {status}"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use slowpitch_baserunning::{Base, RuleSet};
    use slowpitch_core::PlayerId;

    fn pid(s: &str) -> PlayerId {
        PlayerId::new(s).unwrap()
    }

    fn lineup(size: usize) -> Lineup {
        let order = (1..=size).map(|i| pid(&format!("P{i}"))).collect();
        Lineup::new(LineupId::new(), order, &RuleSet::default()).unwrap()
    }

    fn game_in_progress(size: usize) -> Game {
        let mut game = Game::new(GameId::new(), TeamId::new(), "Sandlot Sluggers", Utc::now()).unwrap();
        let lineup = lineup(size);
        let lineup_id = *lineup.id();
        game.set_lineup(lineup).unwrap();
        game.start_game(lineup_id).unwrap();
        game
    }

    #[test]
    fn new_game_starts_in_setup() {
        let game = Game::new(GameId::new(), TeamId::new(), "  Bombers ", Utc::now()).unwrap();
        assert_eq!(game.status(), GameStatus::Setup);
        assert_eq!(game.opponent(), "Bombers");
        assert_eq!(game.version(), 0);
        assert!(game.current_batter().is_none());

        assert!(Game::new(GameId::new(), TeamId::new(), " ", Utc::now()).is_err());
    }

    #[test]
    fn start_requires_the_installed_lineup() {
        let mut game = Game::new(GameId::new(), TeamId::new(), "Bombers", Utc::now()).unwrap();
        assert!(matches!(
            game.start_game(LineupId::new()),
            Err(DomainError::Validation(_))
        ));

        game.set_lineup(lineup(9)).unwrap();
        assert!(game.start_game(LineupId::new()).is_err());
        assert_eq!(game.status(), GameStatus::Setup);
    }

    #[test]
    fn start_initialises_play_state() {
        let game = game_in_progress(10);
        assert_eq!(game.status(), GameStatus::InProgress);
        assert_eq!(game.inning(), 1);
        assert_eq!(game.half(), InningHalf::Top);
        assert_eq!(game.outs(), 0);
        assert!(game.baserunners().is_empty());
        assert_eq!(
            game.current_batter(),
            Some(CurrentBatter {
                player_id: pid("P1"),
                batting_order: 1
            })
        );
    }

    #[test]
    fn lineup_is_frozen_after_start() {
        let mut game = game_in_progress(9);
        assert!(game.set_lineup(lineup(9)).is_err());
    }

    #[test]
    fn suspend_resume_keeps_state() {
        let mut game = game_in_progress(9);
        game.add_outs(1).unwrap();
        game.add_runs(2).unwrap();
        game.advance_to_next_batter().unwrap();

        game.suspend_game().unwrap();
        assert_eq!(game.status(), GameStatus::Suspended);
        assert!(game.add_outs(1).is_err());

        game.resume_game().unwrap();
        assert_eq!(game.outs(), 1);
        assert_eq!(game.score().away(), 2);
        assert_eq!(game.current_batter().unwrap().batting_order, 2);
    }

    #[test]
    fn transitions_are_one_directional() {
        let mut game = game_in_progress(9);
        assert!(game.resume_game().is_err());
        game.complete_game().unwrap();

        assert!(game.suspend_game().is_err());
        assert!(game.resume_game().is_err());
        assert!(game.complete_game().is_err());
        assert!(game.add_runs(1).is_err());
        assert_eq!(game.status(), GameStatus::Completed);
    }

    #[test]
    fn status_guard_messages_are_distinct() {
        let setup = Game::new(GameId::new(), TeamId::new(), "Bombers", Utc::now()).unwrap();
        let mut suspended = game_in_progress(9);
        suspended.suspend_game().unwrap();
        let mut completed = game_in_progress(9);
        completed.complete_game().unwrap();

        let messages: Vec<String> = [setup, suspended, completed]
            .iter()
            .map(|g| g.ensure_in_progress().unwrap_err().to_string())
            .collect();
        assert!(messages[0].contains("not started"));
        assert!(messages[1].contains("suspended"));
        assert!(messages[2].contains("completed"));
    }

    #[test]
    fn third_out_flags_inning_advance() {
        let mut game = game_in_progress(9);
        game.update_baserunners(
            BaserunnerState::empty()
                .add_runner_to_first(pid("P9"))
                .unwrap(),
        )
        .unwrap();
        game.add_outs(2).unwrap();
        game.advance_to_next_batter().unwrap();

        let advance = game.add_outs(1).unwrap();
        assert!(advance);
        assert_eq!(game.outs(), 3);
        assert!(game.baserunners().is_occupied(Base::First));

        game.advance_inning().unwrap();
        game.clear_baserunners().unwrap();
        game.advance_to_next_batter().unwrap();

        assert_eq!(game.outs(), 0);
        assert_eq!(game.half(), InningHalf::Bottom);
        assert_eq!(game.inning(), 1);
        assert!(game.baserunners().is_empty());
        assert_eq!(game.current_batter().unwrap().batting_order, 3);
    }

    #[test]
    fn too_many_outs_are_rejected() {
        let mut game = game_in_progress(9);
        game.add_outs(2).unwrap();
        assert!(game.add_outs(2).is_err());
        assert_eq!(game.outs(), 2);
    }

    #[test]
    fn bottom_to_top_increments_inning() {
        let mut game = game_in_progress(9);
        game.advance_inning().unwrap();
        assert_eq!((game.inning(), game.half()), (1, InningHalf::Bottom));
        game.advance_inning().unwrap();
        assert_eq!((game.inning(), game.half()), (2, InningHalf::Top));
    }

    #[test]
    fn runs_go_to_the_batting_side() {
        let mut game = game_in_progress(9);
        game.add_runs(3).unwrap();
        game.advance_inning().unwrap();
        game.add_runs(1).unwrap();
        game.add_runs(0).unwrap();

        assert_eq!(game.score().away(), 3);
        assert_eq!(game.score().home(), 1);
        assert_eq!(game.score().innings().len(), 1);
    }

    proptest! {
        #![proptest_config(ProptestConfig { cases: 256, ..ProptestConfig::default() })]

        #[test]
        fn batter_pointer_cycles_over_lineup(size in 9usize..=12, start in 0usize..12) {
            let mut game = game_in_progress(size);
            for _ in 0..(start % size) {
                game.advance_to_next_batter().unwrap();
            }
            let before = game.current_batter();

            for _ in 0..size {
                game.advance_to_next_batter().unwrap();
            }
            prop_assert_eq!(game.current_batter(), before);
        }

        #[test]
        fn outs_never_exceed_three(plays in proptest::collection::vec(0u8..=2, 1..40)) {
            let mut game = game_in_progress(9);
            let mut halves = 0u32;
            for outs in plays {
                match game.add_outs(outs) {
                    Ok(true) => {
                        game.advance_inning().unwrap();
                        game.clear_baserunners().unwrap();
                        halves += 1;
                        prop_assert_eq!(game.outs(), 0);
                    }
                    Ok(false) => prop_assert!(game.outs() < 3),
                    Err(_) => prop_assert!(game.outs() + outs > 3),
                }
                prop_assert!(game.outs() <= 2);
            }
            prop_assert_eq!(u32::from(game.inning()), 1 + halves / 2);
        }
    }
}
