//! Games domain module.
//!
//! The `Game` aggregate (status lifecycle, inning/outs/batter tracking and the
//! line score), the batting lineup it cycles through, and the immutable
//! `AtBat` record written once per plate appearance.

pub mod at_bat;
pub mod game;
pub mod lineup;
pub mod score;

pub use at_bat::{AtBat, PitchCount};
pub use game::{Game, GameStatus};
pub use lineup::{CurrentBatter, Lineup};
pub use score::{InningHalf, InningScore, Score};
