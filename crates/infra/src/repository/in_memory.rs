use std::collections::HashMap;
use std::sync::RwLock;

use slowpitch_core::{AggregateRoot, Entity, ExpectedVersion, GameId, PlayerId};
use slowpitch_games::{AtBat, Game};

use super::r#trait::{AtBatRepository, GameRepository, RepositoryError};

fn poisoned() -> RepositoryError {
    RepositoryError::Unavailable("lock poisoned".to_string())
}

/// In-memory game store with optimistic concurrency.
///
/// Intended for tests/dev.
#[derive(Debug, Default)]
pub struct InMemoryGameRepository {
    games: RwLock<HashMap<GameId, Game>>,
}

impl InMemoryGameRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

impl GameRepository for InMemoryGameRepository {
    fn find_by_id(&self, id: GameId) -> Result<Option<Game>, RepositoryError> {
        let games = self.games.read().map_err(|_| poisoned())?;
        Ok(games.get(&id).cloned())
    }

    fn save(&self, game: &Game) -> Result<u64, RepositoryError> {
        let mut games = self.games.write().map_err(|_| poisoned())?;

        let current = games.get(game.id()).map(|g| g.version()).unwrap_or(0);
        ExpectedVersion::Exact(game.version())
            .check(current)
            .map_err(|e| RepositoryError::Conflict(format!("game {}: {e}", game.id())))?;

        let next = current + 1;
        games.insert(*game.id(), game.clone().with_version(next));
        tracing::debug!(game_id = %game.id(), version = next, "game saved");
        Ok(next)
    }
}

/// In-memory append-only at-bat log.
///
/// Intended for tests/dev. Queries scan the log.
#[derive(Debug, Default)]
pub struct InMemoryAtBatRepository {
    at_bats: RwLock<Vec<AtBat>>,
}

impl InMemoryAtBatRepository {
    pub fn new() -> Self {
        Self::default()
    }

    fn filtered(&self, keep: impl Fn(&AtBat) -> bool) -> Result<Vec<AtBat>, RepositoryError> {
        let at_bats = self.at_bats.read().map_err(|_| poisoned())?;
        Ok(at_bats.iter().filter(|a| keep(a)).cloned().collect())
    }
}

impl AtBatRepository for InMemoryAtBatRepository {
    fn save(&self, at_bat: &AtBat) -> Result<(), RepositoryError> {
        let mut at_bats = self.at_bats.write().map_err(|_| poisoned())?;
        if at_bats.iter().any(|a| a.id() == at_bat.id()) {
            return Err(RepositoryError::Conflict(format!(
                "at-bat {} already recorded",
                at_bat.id()
            )));
        }
        at_bats.push(at_bat.clone());
        Ok(())
    }

    fn find_by_game_id(&self, game_id: GameId) -> Result<Vec<AtBat>, RepositoryError> {
        self.filtered(|a| a.game_id == game_id)
    }

    fn find_by_batter_id(&self, batter_id: &PlayerId) -> Result<Vec<AtBat>, RepositoryError> {
        self.filtered(|a| &a.batter_id == batter_id)
    }

    fn find_by_inning(&self, game_id: GameId, inning: u8) -> Result<Vec<AtBat>, RepositoryError> {
        self.filtered(|a| a.game_id == game_id && a.inning == inning)
    }
}
