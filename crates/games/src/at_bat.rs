use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use slowpitch_baserunning::{BaserunnerState, BattingResult};
use slowpitch_core::{AtBatId, DomainError, DomainResult, Entity, GameId, PlayerId, ValueObject};

use crate::score::InningHalf;

/// Final ball/strike count of a plate appearance.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PitchCount {
    pub balls: u8,
    pub strikes: u8,
}

impl PitchCount {
    /// Four balls or three strikes end the plate appearance, so a final count
    /// never exceeds them.
    pub fn new(balls: u8, strikes: u8) -> DomainResult<Self> {
        if balls > 4 || strikes > 3 {
            return Err(DomainError::validation(format!(
                "impossible count {balls}-{strikes}"
            )));
        }
        Ok(Self { balls, strikes })
    }
}

impl ValueObject for PitchCount {}

impl core::fmt::Display for PitchCount {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}-{}", self.balls, self.strikes)
    }
}

/// Record of one completed plate appearance. Written once, never mutated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AtBat {
    pub id: AtBatId,
    pub game_id: GameId,
    pub inning: u8,
    pub half: InningHalf,
    pub batter_id: PlayerId,
    pub batting_order: u8,
    pub result: BattingResult,
    pub rbis: u32,
    /// Runners who crossed the plate, in scoring order.
    pub scoring_runners: Vec<PlayerId>,
    /// Runners who crossed the plate on a play whose third out cancelled
    /// their runs.
    #[serde(default)]
    pub voided_runners: Vec<PlayerId>,
    pub put_out: Vec<PlayerId>,
    pub outs: u8,
    pub baserunners_before: BaserunnerState,
    pub baserunners_after: BaserunnerState,
    pub final_count: PitchCount,
    /// Informational only.
    pub pitch_sequence: Option<Vec<String>>,
    pub description: String,
    pub created_at: DateTime<Utc>,
}

impl AtBat {
    pub fn runs_scored(&self) -> u32 {
        self.scoring_runners.len() as u32
    }

    /// Scorebook-style summary, e.g. `"P4 double; P2, P1 scored; 2 RBI"`.
    pub fn describe(
        batter: &PlayerId,
        result: BattingResult,
        scoring_runners: &[PlayerId],
        voided_runners: &[PlayerId],
        put_out: &[PlayerId],
        rbis: u32,
    ) -> String {
        let mut out = format!("{batter} {result}");

        let runners_out: Vec<&str> = put_out
            .iter()
            .filter(|p| *p != batter)
            .map(PlayerId::as_str)
            .collect();
        if !runners_out.is_empty() {
            out.push_str(&format!("; {} out", runners_out.join(", ")));
        }

        if !scoring_runners.is_empty() {
            let scorers: Vec<&str> = scoring_runners.iter().map(PlayerId::as_str).collect();
            out.push_str(&format!("; {} scored", scorers.join(", ")));
        }

        if !voided_runners.is_empty() {
            let voided: Vec<&str> = voided_runners.iter().map(PlayerId::as_str).collect();
            out.push_str(&format!("; no run for {} on the third out", voided.join(", ")));
        }

        if rbis > 0 {
            out.push_str(&format!("; {rbis} RBI"));
        }
        out
    }
}

impl Entity for AtBat {
    type Id = AtBatId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}
