//! Outcome of a plate appearance.

use core::str::FromStr;

use serde::{Deserialize, Serialize};

use slowpitch_core::{DomainError, ValueObject};

use crate::error::BaserunningError;
use crate::rules::OUTS_PER_HALF_INNING;

/// Closed set of at-bat outcomes.
///
/// Advancement defaults, outs and RBI eligibility all match exhaustively on this
/// enum, so a new outcome is a compile-checked change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BattingResult {
    Single,
    Double,
    Triple,
    HomeRun,
    Walk,
    IntentionalWalk,
    SacrificeFly,
    #[serde(rename = "ERROR")]
    ReachedOnError,
    FieldersChoice,
    Strikeout,
    GroundOut,
    AirOut,
    DoublePlay,
}

impl ValueObject for BattingResult {}

impl BattingResult {
    pub const ALL: [BattingResult; 13] = [
        BattingResult::Single,
        BattingResult::Double,
        BattingResult::Triple,
        BattingResult::HomeRun,
        BattingResult::Walk,
        BattingResult::IntentionalWalk,
        BattingResult::SacrificeFly,
        BattingResult::ReachedOnError,
        BattingResult::FieldersChoice,
        BattingResult::Strikeout,
        BattingResult::GroundOut,
        BattingResult::AirOut,
        BattingResult::DoublePlay,
    ];

    /// Scorebook abbreviation.
    pub fn code(self) -> &'static str {
        match self {
            BattingResult::Single => "1B",
            BattingResult::Double => "2B",
            BattingResult::Triple => "3B",
            BattingResult::HomeRun => "HR",
            BattingResult::Walk => "BB",
            BattingResult::IntentionalWalk => "IBB",
            BattingResult::SacrificeFly => "SF",
            BattingResult::ReachedOnError => "E",
            BattingResult::FieldersChoice => "FC",
            BattingResult::Strikeout => "SO",
            BattingResult::GroundOut => "GO",
            BattingResult::AirOut => "AO",
            BattingResult::DoublePlay => "DP",
        }
    }

    pub fn is_hit(self) -> bool {
        self.total_bases() > 0
    }

    pub fn is_walk(self) -> bool {
        matches!(self, BattingResult::Walk | BattingResult::IntentionalWalk)
    }

    /// Walks and sacrifice flies are plate appearances but not official at-bats.
    pub fn is_official_at_bat(self) -> bool {
        !self.is_walk() && self != BattingResult::SacrificeFly
    }

    /// Bases credited to the batter for slugging.
    pub fn total_bases(self) -> u32 {
        match self {
            BattingResult::Single => 1,
            BattingResult::Double => 2,
            BattingResult::Triple => 3,
            BattingResult::HomeRun => 4,
            _ => 0,
        }
    }

    pub fn batter_is_out(self) -> bool {
        matches!(
            self,
            BattingResult::Strikeout
                | BattingResult::GroundOut
                | BattingResult::AirOut
                | BattingResult::SacrificeFly
                | BattingResult::DoublePlay
        )
    }

    /// Outs the result records by default.
    pub fn outs_produced(self) -> u8 {
        match self {
            BattingResult::DoublePlay => 2,
            BattingResult::Strikeout
            | BattingResult::GroundOut
            | BattingResult::AirOut
            | BattingResult::SacrificeFly => 1,
            BattingResult::Single
            | BattingResult::Double
            | BattingResult::Triple
            | BattingResult::HomeRun
            | BattingResult::Walk
            | BattingResult::IntentionalWalk
            | BattingResult::ReachedOnError
            | BattingResult::FieldersChoice => 0,
        }
    }

    /// Most outs a single play of this kind can record.
    pub fn max_outs(self) -> u8 {
        match self {
            BattingResult::DoublePlay => 2,
            _ => 1,
        }
    }

    /// Whether runs scoring on this play are credited to the batter.
    ///
    /// No RBI on an error, a fielder's choice, or a double play; outs other than
    /// the sacrifice fly never carry an RBI.
    pub fn credits_rbi(self) -> bool {
        match self {
            BattingResult::Single
            | BattingResult::Double
            | BattingResult::Triple
            | BattingResult::HomeRun
            | BattingResult::Walk
            | BattingResult::IntentionalWalk
            | BattingResult::SacrificeFly => true,
            BattingResult::ReachedOnError
            | BattingResult::FieldersChoice
            | BattingResult::Strikeout
            | BattingResult::GroundOut
            | BattingResult::AirOut
            | BattingResult::DoublePlay => false,
        }
    }

    /// Whether the play can happen given base occupancy (first, second, third)
    /// and the outs before the at-bat.
    pub fn legality(self, occupancy: [bool; 3], outs_before: u8) -> Result<(), BaserunningError> {
        let illegal = |reason: &str| -> Result<(), BaserunningError> {
            Err(BaserunningError::IllegalPlay {
                result: self,
                reason: reason.to_string(),
            })
        };
        let any_runner = occupancy.iter().any(|o| *o);

        match self {
            BattingResult::SacrificeFly if !occupancy[2] => {
                illegal("a sacrifice fly requires a runner on third")
            }
            BattingResult::SacrificeFly if outs_before + 1 >= OUTS_PER_HALF_INNING => {
                illegal("a sacrifice fly cannot be recorded with two outs")
            }
            BattingResult::DoublePlay if !any_runner => {
                illegal("a double play requires at least one runner on base")
            }
            BattingResult::DoublePlay if outs_before + 2 > OUTS_PER_HALF_INNING => {
                illegal("a double play cannot be turned with two outs")
            }
            BattingResult::FieldersChoice if !any_runner => {
                illegal("a fielder's choice requires at least one runner on base")
            }
            _ => Ok(()),
        }
    }
}

impl core::fmt::Display for BattingResult {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(match self {
            BattingResult::Single => "single",
            BattingResult::Double => "double",
            BattingResult::Triple => "triple",
            BattingResult::HomeRun => "home run",
            BattingResult::Walk => "walk",
            BattingResult::IntentionalWalk => "intentional walk",
            BattingResult::SacrificeFly => "sacrifice fly",
            BattingResult::ReachedOnError => "error",
            BattingResult::FieldersChoice => "fielder's choice",
            BattingResult::Strikeout => "strikeout",
            BattingResult::GroundOut => "ground out",
            BattingResult::AirOut => "air out",
            BattingResult::DoublePlay => "double play",
        })
    }
}

impl FromStr for BattingResult {
    type Err = DomainError;

    /// Accepts the scorebook code (`"1B"`) or the serialized name (`"SINGLE"`).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_uppercase();
        BattingResult::ALL
            .into_iter()
            .find(|r| r.code() == wanted || serialized_name(*r) == wanted)
            .ok_or_else(|| DomainError::validation(format!("unknown batting result '{s}'")))
    }
}

fn serialized_name(result: BattingResult) -> &'static str {
    match result {
        BattingResult::Single => "SINGLE",
        BattingResult::Double => "DOUBLE",
        BattingResult::Triple => "TRIPLE",
        BattingResult::HomeRun => "HOME_RUN",
        BattingResult::Walk => "WALK",
        BattingResult::IntentionalWalk => "INTENTIONAL_WALK",
        BattingResult::SacrificeFly => "SACRIFICE_FLY",
        BattingResult::ReachedOnError => "ERROR",
        BattingResult::FieldersChoice => "FIELDERS_CHOICE",
        BattingResult::Strikeout => "STRIKEOUT",
        BattingResult::GroundOut => "GROUND_OUT",
        BattingResult::AirOut => "AIR_OUT",
        BattingResult::DoublePlay => "DOUBLE_PLAY",
    }
}
