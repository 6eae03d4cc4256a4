//! Value object trait: equality by value, not identity.

/// Marker trait for value objects.
///
/// Value objects are **immutable** and **compared by value**. A baserunner
/// configuration or a batting result is a value object: two states with the
/// same runners on the same bases are the same state, and "changing" one
/// produces a new instance.
///
/// ```ignore
/// #[derive(Debug, Clone, PartialEq, Eq)]
/// struct PitchCount {
///     balls: u8,
///     strikes: u8,
/// }
///
/// impl ValueObject for PitchCount {}
/// ```
pub trait ValueObject: Clone + PartialEq + core::fmt::Debug {}
