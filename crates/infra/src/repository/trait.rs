use std::sync::Arc;

use thiserror::Error;

use slowpitch_core::{GameId, PlayerId};
use slowpitch_games::{AtBat, Game};

/// Persistence failure.
///
/// These are infrastructure errors, as opposed to the domain's validation and
/// invariant errors. The use case never retries them.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RepositoryError {
    #[error("record not found: {0}")]
    NotFound(String),

    /// Stale write: the stored record moved on since it was loaded.
    #[error("concurrent modification: {0}")]
    Conflict(String),

    #[error("storage unavailable: {0}")]
    Unavailable(String),
}

/// Game persistence port.
///
/// `save` must compare the game's loaded version with the stored one and
/// reject stale writes with `RepositoryError::Conflict`, so that two callers
/// racing on the same game cannot silently overwrite each other.
pub trait GameRepository: Send + Sync {
    fn find_by_id(&self, id: GameId) -> Result<Option<Game>, RepositoryError>;

    /// Persist the game and return its new version.
    fn save(&self, game: &Game) -> Result<u64, RepositoryError>;
}

/// At-bat persistence port. Records are append-only.
pub trait AtBatRepository: Send + Sync {
    fn save(&self, at_bat: &AtBat) -> Result<(), RepositoryError>;

    /// At-bats of one game, in recording order.
    fn find_by_game_id(&self, game_id: GameId) -> Result<Vec<AtBat>, RepositoryError>;

    /// Every at-bat taken by one player, across games.
    fn find_by_batter_id(&self, batter_id: &PlayerId) -> Result<Vec<AtBat>, RepositoryError>;

    /// At-bats from both halves of one inning of a game.
    fn find_by_inning(&self, game_id: GameId, inning: u8) -> Result<Vec<AtBat>, RepositoryError>;
}

impl<S> GameRepository for Arc<S>
where
    S: GameRepository + ?Sized,
{
    fn find_by_id(&self, id: GameId) -> Result<Option<Game>, RepositoryError> {
        (**self).find_by_id(id)
    }

    fn save(&self, game: &Game) -> Result<u64, RepositoryError> {
        (**self).save(game)
    }
}

impl<S> AtBatRepository for Arc<S>
where
    S: AtBatRepository + ?Sized,
{
    fn save(&self, at_bat: &AtBat) -> Result<(), RepositoryError> {
        (**self).save(at_bat)
    }

    fn find_by_game_id(&self, game_id: GameId) -> Result<Vec<AtBat>, RepositoryError> {
        (**self).find_by_game_id(game_id)
    }

    fn find_by_batter_id(&self, batter_id: &PlayerId) -> Result<Vec<AtBat>, RepositoryError> {
        (**self).find_by_batter_id(batter_id)
    }

    fn find_by_inning(&self, game_id: GameId, inning: u8) -> Result<Vec<AtBat>, RepositoryError> {
        (**self).find_by_inning(game_id, inning)
    }
}
