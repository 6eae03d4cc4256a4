//! Persistence ports for games and at-bats.
//!
//! The core only needs load/save for the `Game` aggregate and append/query for
//! `AtBat` records. Storage engines live behind these traits; the in-memory
//! adapters here back tests, the scorebook binary and local development.

pub mod in_memory;
pub mod r#trait;

pub use in_memory::{InMemoryAtBatRepository, InMemoryGameRepository};
pub use r#trait::{AtBatRepository, GameRepository, RepositoryError};
