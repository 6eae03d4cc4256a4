//! Things with identity.

/// A domain object identified by its id rather than its contents.
///
/// Two at-bats with the same outcome are still different plate appearances,
/// and a lineup keeps its id when the batting order is replaced.
pub trait Entity {
    type Id: Clone + Eq + core::hash::Hash + core::fmt::Debug;

    fn id(&self) -> &Self::Id;
}
