//! Base trait for store state.

/// Marker trait for state objects.
///
/// States should be:
/// - Immutable (Clone to create new states)
/// - Self-contained (everything selectors need)
/// - Comparable (PartialEq for detecting changes)
pub trait State: Clone + PartialEq + Default + Send + 'static {}
