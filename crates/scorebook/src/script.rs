use std::sync::Arc;

use anyhow::Context;
use chrono::Utc;
use serde::{Deserialize, Serialize};

use slowpitch_baserunning::{BattingResult, ManualOverrides};
use slowpitch_core::{AggregateRoot, Entity, GameId, LineupId, PlayerId, TeamId};
use slowpitch_games::{AtBat, Game, Lineup, PitchCount};
use slowpitch_infra::{
    AtBatRepository, GameRepository, InMemoryAtBatRepository, InMemoryGameRepository,
    RecordAtBat, RecordAtBatCommand, ScorekeepingConfig,
};

/// A game to replay: the batting order and the plays in recording order.
#[derive(Debug, Clone, Deserialize)]
pub struct Script {
    #[serde(default = "default_opponent")]
    pub opponent: String,
    pub lineup: Vec<PlayerId>,
    pub plays: Vec<Play>,
    /// Mark the game completed after the last play.
    #[serde(default)]
    pub complete: bool,
}

fn default_opponent() -> String {
    "Visitors".to_string()
}

#[derive(Debug, Clone, Deserialize)]
pub struct Play {
    /// Defaults to whoever is due up.
    #[serde(default)]
    pub batter: Option<PlayerId>,
    /// Scorebook code (`"2B"`) or result name (`"DOUBLE"`).
    pub result: String,
    #[serde(default)]
    pub overrides: ManualOverrides,
    #[serde(default)]
    pub rbis: Option<u32>,
    #[serde(default)]
    pub count: Option<PitchCount>,
    #[serde(default)]
    pub pitches: Option<Vec<String>>,
}

#[derive(Debug, Serialize)]
pub struct Replay {
    pub game: Game,
    pub at_bats: Vec<AtBat>,
}

pub fn replay(script: &Script, config: &ScorekeepingConfig) -> anyhow::Result<Replay> {
    let games = Arc::new(InMemoryGameRepository::new());
    let at_bats = Arc::new(InMemoryAtBatRepository::new());

    let lineup = Lineup::new(LineupId::new(), script.lineup.clone(), &config.rule_set())
        .context("invalid lineup")?;
    let lineup_id = *lineup.id();
    let mut game = Game::new(GameId::new(), TeamId::new(), script.opponent.as_str(), Utc::now())?;
    game.set_lineup(lineup)?;
    game.start_game(lineup_id)?;
    let game_id = *game.id();
    games.save(&game)?;

    let use_case = RecordAtBat::new(games.clone(), at_bats.clone(), config.rule_engine());

    for (n, play) in script.plays.iter().enumerate() {
        let number = n + 1;
        let result: BattingResult = play
            .result
            .parse()
            .with_context(|| format!("play {number}"))?;

        let batter = match &play.batter {
            Some(batter) => batter.clone(),
            None => games
                .find_by_id(game_id)?
                .and_then(|g| g.current_batter())
                .map(|c| c.player_id)
                .with_context(|| format!("play {number}: no batter is due up"))?,
        };

        let mut command =
            RecordAtBatCommand::new(game_id, batter, result).with_overrides(play.overrides.clone());
        command.rbis = play.rbis;
        command.final_count = play.count.unwrap_or_default();
        command.pitch_sequence = play.pitches.clone();

        let summary = use_case
            .execute(command)
            .with_context(|| format!("play {number} ({}) was rejected", play.result))?;
        tracing::debug!(
            play = number,
            runs = summary.runs_scored,
            rbis = summary.rbis,
            advance_inning = summary.advance_inning,
            "play replayed"
        );
    }

    if script.complete {
        let mut game = games.find_by_id(game_id)?.context("game disappeared")?;
        game.complete_game()?;
        games.save(&game)?;
    }

    let game = games.find_by_id(game_id)?.context("game disappeared")?;
    let at_bats = at_bats.find_by_game_id(game_id)?;
    Ok(Replay { game, at_bats })
}
