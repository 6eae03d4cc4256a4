use serde::{Deserialize, Serialize};

use slowpitch_baserunning::RuleSet;
use slowpitch_core::{DomainError, DomainResult, Entity, LineupId, PlayerId};

/// Ordered batting list a team cycles through.
///
/// Deserialized lineups are checked against the default bounds, so a stored
/// game can never carry a lineup `new` would have refused.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "StoredLineup")]
pub struct Lineup {
    id: LineupId,
    batting_order: Vec<PlayerId>,
}

impl Lineup {
    /// Size must fall within the league's configured bounds (9-12 at most) and
    /// no player may bat twice.
    pub fn new(id: LineupId, batting_order: Vec<PlayerId>, rules: &RuleSet) -> DomainResult<Self> {
        if !rules.allows_lineup_size(batting_order.len()) {
            return Err(DomainError::validation(format!(
                "lineup must have between {} and {} batters, got {}",
                rules.min_lineup_size(),
                rules.max_lineup_size(),
                batting_order.len()
            )));
        }
        for (i, player) in batting_order.iter().enumerate() {
            if batting_order[i + 1..].contains(player) {
                return Err(DomainError::validation(format!(
                    "player {player} appears more than once in the batting order"
                )));
            }
        }
        Ok(Self { id, batting_order })
    }

    pub fn batting_order(&self) -> &[PlayerId] {
        &self.batting_order
    }

    pub fn len(&self) -> usize {
        self.batting_order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.batting_order.is_empty()
    }

    /// Player in 0-based slot `index`.
    pub fn batter_at(&self, index: usize) -> Option<&PlayerId> {
        self.batting_order.get(index)
    }

    pub fn position_of(&self, player: &PlayerId) -> Option<usize> {
        self.batting_order.iter().position(|p| p == player)
    }
}

/// Unchecked wire form of a `Lineup`.
#[derive(Deserialize)]
struct StoredLineup {
    id: LineupId,
    batting_order: Vec<PlayerId>,
}

impl TryFrom<StoredLineup> for Lineup {
    type Error = DomainError;

    fn try_from(stored: StoredLineup) -> Result<Self, Self::Error> {
        Lineup::new(stored.id, stored.batting_order, &RuleSet::default())
    }
}

impl Entity for Lineup {
    type Id = LineupId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

/// The batter due up, with their 1-based spot in the order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CurrentBatter {
    pub player_id: PlayerId,
    pub batting_order: u8,
}
