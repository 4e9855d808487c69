//! Root store state and the slice mapping for each entity type.

use std::sync::Arc;

use crate::domain::{Company, Entity, User};
use crate::store::action::{AppAction, EntityAction};
use crate::store::collection::CollectionState;
use crate::store::mvi::State;

/// Snapshot of every collection held by the store.
///
/// Slices sit behind `Arc` so that untouched slices keep their identity
/// across transitions and memoized selectors can skip recomputation.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct AppState {
    pub users: Arc<CollectionState<User>>,
    pub companies: Arc<CollectionState<Company>>,
}

impl State for AppState {}

/// Entity types that own a slice of [`AppState`].
pub trait StoreEntity: Entity {
    fn slice(state: &AppState) -> &Arc<CollectionState<Self>>;

    fn slice_mut(state: &mut AppState) -> &mut Arc<CollectionState<Self>>;

    fn embed(action: EntityAction<Self>) -> AppAction;

    fn project(action: &AppAction) -> Option<&EntityAction<Self>>;
}

impl StoreEntity for User {
    fn slice(state: &AppState) -> &Arc<CollectionState<Self>> {
        &state.users
    }

    fn slice_mut(state: &mut AppState) -> &mut Arc<CollectionState<Self>> {
        &mut state.users
    }

    fn embed(action: EntityAction<Self>) -> AppAction {
        AppAction::Users(action)
    }

    fn project(action: &AppAction) -> Option<&EntityAction<Self>> {
        match action {
            AppAction::Users(action) => Some(action),
            _ => None,
        }
    }
}

impl StoreEntity for Company {
    fn slice(state: &AppState) -> &Arc<CollectionState<Self>> {
        &state.companies
    }

    fn slice_mut(state: &mut AppState) -> &mut Arc<CollectionState<Self>> {
        &mut state.companies
    }

    fn embed(action: EntityAction<Self>) -> AppAction {
        AppAction::Companies(action)
    }

    fn project(action: &AppAction) -> Option<&EntityAction<Self>> {
        match action {
            AppAction::Companies(action) => Some(action),
            _ => None,
        }
    }
}
