//! Read-side projections over the at-bat log.
//!
//! Projections are disposable: they hold no state of their own and are
//! rebuilt from `AtBatRepository` queries on demand.

pub mod player_statistics;

pub use player_statistics::{PlayerStatisticsError, PlayerStatisticsProjection, fold_at_bats};
