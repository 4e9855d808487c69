//! Read-only projections over store state.
//!
//! Selectors are the sanctioned read path for callers. They never mutate
//! state and never perform I/O.

use std::collections::HashMap;
use std::sync::Arc;

use crate::domain::Entity;
use crate::store::collection::CollectionState;

/// Records in `ids` order.
pub fn select_all<E: Entity>(state: &CollectionState<E>) -> Vec<E> {
    state
        .ids()
        .iter()
        .filter_map(|id| state.get(id))
        .cloned()
        .collect()
}

pub fn select_entities<E: Entity>(state: &CollectionState<E>) -> &HashMap<E::Key, E> {
    state.entities()
}

pub fn select_by_id<'a, E: Entity>(state: &'a CollectionState<E>, key: &E::Key) -> Option<&'a E> {
    state.get(key)
}

/// The selected record, if a selection is set and still present.
pub fn select_selected<E: Entity>(state: &CollectionState<E>) -> Option<&E> {
    state.selected_id.as_ref().and_then(|id| state.get(id))
}

pub fn select_is_loading<E: Entity>(state: &CollectionState<E>) -> bool {
    state.is_loading
}

pub fn select_error<E: Entity>(state: &CollectionState<E>) -> Option<&str> {
    state.error.as_deref()
}

pub fn select_count<E: Entity>(state: &CollectionState<E>) -> usize {
    state.ids().len()
}

/// Caches a projection and recomputes it only when the input `Arc`
/// changes identity.
pub struct Memoized<S, T> {
    project: fn(&S) -> T,
    last: Option<(Arc<S>, T)>,
    computations: u64,
}

impl<S, T: Clone> Memoized<S, T> {
    pub fn new(project: fn(&S) -> T) -> Self {
        Self {
            project,
            last: None,
            computations: 0,
        }
    }

    pub fn select(&mut self, input: &Arc<S>) -> T {
        if let Some((cached_input, cached)) = &self.last {
            if Arc::ptr_eq(cached_input, input) {
                return cached.clone();
            }
        }
        let value = (self.project)(input);
        self.computations += 1;
        self.last = Some((Arc::clone(input), value.clone()));
        value
    }

    /// Number of times the projection actually ran.
    pub fn computations(&self) -> u64 {
        self.computations
    }
}
