//! Batting statistics.
//!
//! Counting stats accumulate per plate appearance; the ratio stats are always
//! recomputed from them, never updated incrementally.

pub mod counting;
pub mod derived;

pub use counting::CountingStats;
pub use derived::{
    DEFAULT_TOLERANCE, DerivedStatistics, PlayerStatistics, calculate_derived_statistics,
};
