use thiserror::Error;

use slowpitch_core::{DomainError, PlayerId};

use crate::batting_result::BattingResult;
use crate::state::Base;

/// Baserunning failure.
///
/// Collisions carry the destination base so the scorer can be told exactly
/// which base two runners were sent to.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum BaserunningError {
    #[error("{base} base is already occupied")]
    OccupiedBase { base: Base },

    #[error("runner {player} cannot occupy more than one base")]
    DuplicateRunner { player: PlayerId },

    #[error("{player} is neither a baserunner nor the batter")]
    UnknownRunner { player: PlayerId },

    #[error("invalid destination for {player}: {reason}")]
    InvalidDestination { player: PlayerId, reason: String },

    #[error("{result} is not possible in this situation: {reason}")]
    IllegalPlay { result: BattingResult, reason: String },
}

impl From<BaserunningError> for DomainError {
    fn from(value: BaserunningError) -> Self {
        match value {
            BaserunningError::OccupiedBase { .. } | BaserunningError::DuplicateRunner { .. } => {
                DomainError::invariant(value.to_string())
            }
            BaserunningError::UnknownRunner { .. }
            | BaserunningError::InvalidDestination { .. }
            | BaserunningError::IllegalPlay { .. } => DomainError::validation(value.to_string()),
        }
    }
}
