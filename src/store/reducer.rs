//! State transitions for entity collections.
//!
//! The machine is flat: every action is accepted in any state. Outcomes
//! arriving out of order simply overwrite `is_loading` and `error`, the
//! last one applied wins.

use std::marker::PhantomData;
use std::sync::Arc;

use crate::domain::Entity;
use crate::store::action::{AppAction, EntityAction};
use crate::store::collection::CollectionState;
use crate::store::mvi::Reducer;
use crate::store::state::{AppState, StoreEntity};

/// Reducer for a single collection slice.
pub struct CollectionReducer<E>(PhantomData<E>);

impl<E: Entity> Reducer for CollectionReducer<E> {
    type State = CollectionState<E>;
    type Action = EntityAction<E>;

    fn reduce(mut state: Self::State, action: Self::Action) -> Self::State {
        match action {
            EntityAction::Load
            | EntityAction::Create { .. }
            | EntityAction::Update { .. }
            | EntityAction::Delete { .. } => start_request(&mut state),
            EntityAction::LoadOne { id } => {
                start_request(&mut state);
                state.selected_id = Some(id);
            }

            EntityAction::LoadSuccess { records } => {
                state.set_all(records);
                finish_request(&mut state);
            }
            EntityAction::LoadOneSuccess { record } | EntityAction::UpdateSuccess { record } => {
                state.upsert_one(record);
                finish_request(&mut state);
            }
            EntityAction::CreateSuccess { record } => match state.add_one(record) {
                Ok(()) => finish_request(&mut state),
                Err(err) => {
                    state.is_loading = false;
                    state.error = Some(err.to_string());
                }
            },
            EntityAction::DeleteSuccess { id } => {
                state.remove_one(&id);
                finish_request(&mut state);
            }

            EntityAction::LoadFailure { message }
            | EntityAction::LoadOneFailure { message }
            | EntityAction::CreateFailure { message }
            | EntityAction::UpdateFailure { message }
            | EntityAction::DeleteFailure { message } => {
                state.is_loading = false;
                state.error = Some(message);
            }
        }
        state
    }
}

fn start_request<E: Entity>(state: &mut CollectionState<E>) {
    state.is_loading = true;
    state.error = None;
}

fn finish_request<E: Entity>(state: &mut CollectionState<E>) {
    state.is_loading = false;
    state.error = None;
}

/// Routes root actions to the matching slice.
pub struct RootReducer;

impl Reducer for RootReducer {
    type State = AppState;
    type Action = AppAction;

    fn reduce(mut state: Self::State, action: Self::Action) -> Self::State {
        match action {
            AppAction::Users(action) => reduce_slice(&mut state, action),
            AppAction::Companies(action) => reduce_slice(&mut state, action),
        }
        state
    }
}

/// Replace one slice, leaving the other slices' `Arc`s untouched.
fn reduce_slice<E: StoreEntity>(state: &mut AppState, action: EntityAction<E>) {
    let slice = E::slice_mut(state);
    let current = std::mem::take(slice);
    *slice = Arc::new(CollectionReducer::<E>::reduce(
        Arc::unwrap_or_clone(current),
        action,
    ));
}
