//! Base trait for actions.

/// Marker trait for action messages.
///
/// Actions represent:
/// - Intents (a request to load, create, update or delete)
/// - Outcomes (the success or failure result of an intent)
///
/// Actions are processed by reducers to produce new states.
pub trait Action: Clone + Send + 'static {}
