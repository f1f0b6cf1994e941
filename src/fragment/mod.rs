//! Input fragments and the dimension inspector.

/// Header probing over one or many fragments.
pub mod inspect;
/// `Fragment` and `FragmentSet`.
pub mod model;
