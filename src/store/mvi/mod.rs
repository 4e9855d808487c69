//! Unidirectional data flow primitives.
//!
//! ```text
//! Action ──→ Reducer ──→ State ──→ Selectors
//!    ↑                                 │
//!    └──────── Effects ←───────────────┘
//! ```
//!
//! - **State**: immutable snapshot of the store
//! - **Action**: intent or outcome message
//! - **Reducer**: pure function that transforms state based on actions

mod action;
mod reducer;
mod state;

pub use action::Action;
pub use reducer::Reducer;
pub use state::State;
