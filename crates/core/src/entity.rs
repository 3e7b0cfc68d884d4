//! Identity for long-lived HR records.

/// A record that keeps its identity while its attributes change
/// (salary revisions, new absences, rating updates).
pub trait Entity {
    type Id: Clone + Eq + core::hash::Hash + core::fmt::Debug;

    /// Stable identifier; never reassigned once the record exists.
    fn id(&self) -> &Self::Id;
}
