//! Entity trait: records that keep their ledger identity across state changes.

/// Entity marker + minimal interface.
///
/// Parcels keep their id when ownership moves; requests keep theirs when they
/// leave `Pending`.
pub trait Entity {
    /// Ledger-assigned identifier.
    type Id: Clone + Eq + core::hash::Hash + core::fmt::Debug;

    /// Returns the entity identifier.
    fn id(&self) -> &Self::Id;
}
