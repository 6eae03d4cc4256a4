//! Application and infrastructure layer: persistence ports and adapters, the
//! record-at-bat use case, configuration and read-side projections.

pub mod config;
pub mod projections;
pub mod record_at_bat;
pub mod repository;


pub use config::ScorekeepingConfig;
pub use record_at_bat::{RecordAtBat, RecordAtBatCommand, RecordAtBatError, RecordAtBatSummary};
pub use repository::{
    AtBatRepository, GameRepository, InMemoryAtBatRepository, InMemoryGameRepository,
    RepositoryError,
};
