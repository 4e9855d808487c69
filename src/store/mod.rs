//! Client-side normalized entity store.
//!
//! Intents are dispatched to a [`StoreHandle`]; the [`Store`] task reduces
//! them, effects perform the backend call and dispatch the outcome, and
//! selectors read the resulting [`AppState`].

pub mod action;
pub mod collection;
pub mod effects;
pub mod mvi;
pub mod reducer;
pub mod runtime;
pub mod selectors;
pub mod state;

pub use action::{AppAction, EntityAction, Phase, Verb};
pub use collection::{CollectionError, CollectionState};
pub use effects::EntityEffects;
pub use reducer::{CollectionReducer, RootReducer};
pub use runtime::{Dispatcher, Effect, Store, StoreError, StoreHandle};
pub use state::{AppState, StoreEntity};
