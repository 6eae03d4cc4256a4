//! Baserunning rules module.
//!
//! Pure, deterministic softball rules: base occupancy, batting outcomes, the
//! default and scorer-directed advancement of runners, and validation of a
//! proposed at-bat transition against the official rules (no IO, no storage).

pub mod advancement;
pub mod batting_result;
pub mod error;
pub mod rules;
pub mod state;

pub use advancement::{
    AdvancementOutcome, BaserunnerAdvancementService, ManualOverrides, RunnerDestination,
};
pub use batting_result::BattingResult;
pub use error::BaserunningError;
pub use rules::{
    AtBatTransition, GameRuleEngine, MAX_LINEUP_SIZE, MIN_LINEUP_SIZE, OUTS_PER_HALF_INNING,
    RuleSet, RuleViolation, SnapshotRole, ValidationReport,
};
pub use state::{Advancement, Base, BaseSnapshot, BaserunnerState};
