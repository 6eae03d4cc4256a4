//! `slowpitch-core` — domain foundation building blocks.
//!
//! This crate contains **pure domain** primitives shared by the scorekeeping
//! modules (no persistence, no UI concerns).

pub mod aggregate;
pub mod entity;
pub mod error;
pub mod id;
pub mod value_object;

pub use aggregate::{AggregateRoot, ExpectedVersion};
pub use entity::Entity;
pub use error::{DomainError, DomainResult};
pub use id::{AtBatId, GameId, LineupId, PlayerId, TeamId};
pub use value_object::ValueObject;
