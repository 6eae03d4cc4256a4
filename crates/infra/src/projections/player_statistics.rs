use std::collections::BTreeSet;

use thiserror::Error;

use slowpitch_core::{DomainError, GameId, PlayerId};
use slowpitch_games::AtBat;
use slowpitch_statistics::{CountingStats, PlayerStatistics};

use crate::repository::{AtBatRepository, RepositoryError};

#[derive(Debug, Error)]
pub enum PlayerStatisticsError {
    #[error(transparent)]
    Repository(#[from] RepositoryError),
    #[error(transparent)]
    Domain(#[from] DomainError),
}

/// Batting line for one player, rebuilt from the at-bat log.
///
/// Nothing is cached: every call re-reads the log and recomputes the ratios
/// from the counts.
#[derive(Debug)]
pub struct PlayerStatisticsProjection<A> {
    at_bats: A,
    tolerance: f64,
}

impl<A> PlayerStatisticsProjection<A>
where
    A: AtBatRepository,
{
    pub fn new(at_bats: A, tolerance: f64) -> Self {
        Self { at_bats, tolerance }
    }

    pub fn player_statistics(
        &self,
        player_id: &PlayerId,
    ) -> Result<PlayerStatistics, PlayerStatisticsError> {
        let own = self.at_bats.find_by_batter_id(player_id)?;

        // Runs are credited on other batters' at-bats too, so read the full
        // log of every game the player batted in.
        let games: BTreeSet<GameId> = own.iter().map(|a| a.game_id).collect();
        let mut game_logs = Vec::new();
        for game_id in &games {
            game_logs.extend(self.at_bats.find_by_game_id(*game_id)?);
        }

        let counting = fold_at_bats(player_id, &own, &game_logs);
        let stats = PlayerStatistics::new(player_id.clone(), counting)?;
        stats.validate_with_tolerance(self.tolerance)?;

        tracing::debug!(
            player_id = %player_id,
            at_bats = counting.at_bats,
            hits = counting.hits,
            "player statistics rebuilt"
        );
        Ok(stats)
    }
}

/// Counting stats from the player's own plate appearances plus the runs they
/// scored anywhere in `game_logs`.
pub fn fold_at_bats(player_id: &PlayerId, own: &[AtBat], game_logs: &[AtBat]) -> CountingStats {
    let mut stats = CountingStats::default();
    let mut games = BTreeSet::new();

    for at_bat in own.iter().filter(|a| &a.batter_id == player_id) {
        stats.record(at_bat.result, at_bat.rbis);
        games.insert(at_bat.game_id);
    }
    stats.games = games.len() as u32;
    stats.runs = game_logs
        .iter()
        .flat_map(|a| a.scoring_runners.iter())
        .filter(|runner| *runner == player_id)
        .count() as u32;
    stats
}
