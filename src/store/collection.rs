//! Normalized, keyed collection of entities.
//!
//! A collection keeps the display order in `ids` and the records in
//! `entities`. Both always describe the same set of keys. Records are never
//! mutated in place: every write replaces the stored value wholesale.

use std::collections::HashMap;

use thiserror::Error;

use crate::domain::Entity;
use crate::store::mvi::State;

/// Errors raised by collection writes.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CollectionError {
    #[error("{kind} '{key}' already exists")]
    DuplicateKey { kind: &'static str, key: String },
}

/// Store slice for one entity type.
#[derive(Debug, Clone, PartialEq)]
pub struct CollectionState<E: Entity> {
    ids: Vec<E::Key>,
    entities: HashMap<E::Key, E>,
    /// Record the UI focuses on (last `LoadOne` target).
    pub selected_id: Option<E::Key>,
    /// True while a request for this entity type is outstanding.
    pub is_loading: bool,
    /// Last failure message, cleared when the next request starts.
    pub error: Option<String>,
}

impl<E: Entity> Default for CollectionState<E> {
    fn default() -> Self {
        Self {
            ids: Vec::new(),
            entities: HashMap::new(),
            selected_id: None,
            is_loading: false,
            error: None,
        }
    }
}

impl<E: Entity> State for CollectionState<E> {}

impl<E: Entity> CollectionState<E> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Keys in display order.
    pub fn ids(&self) -> &[E::Key] {
        &self.ids
    }

    pub fn entities(&self) -> &HashMap<E::Key, E> {
        &self.entities
    }

    pub fn get(&self, key: &E::Key) -> Option<&E> {
        self.entities.get(key)
    }

    pub fn contains(&self, key: &E::Key) -> bool {
        self.entities.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    /// Replace the whole collection.
    ///
    /// A key repeated in `records` keeps its first position and the last
    /// record seen for it.
    pub fn set_all(&mut self, records: Vec<E>) {
        self.ids.clear();
        self.entities.clear();
        for record in records {
            let key = record.key().clone();
            if self.entities.insert(key.clone(), record).is_none() {
                self.ids.push(key);
            }
        }
    }

    /// Insert a record, or replace the existing one keeping its position.
    pub fn upsert_one(&mut self, record: E) {
        let key = record.key().clone();
        if self.entities.insert(key.clone(), record).is_none() {
            self.ids.push(key);
        }
    }

    /// Insert a new record. An existing key is rejected and leaves the
    /// collection unchanged.
    pub fn add_one(&mut self, record: E) -> Result<(), CollectionError> {
        let key = record.key();
        if self.entities.contains_key(key) {
            return Err(CollectionError::DuplicateKey {
                kind: E::KIND,
                key: key.to_string(),
            });
        }
        let key = key.clone();
        self.ids.push(key.clone());
        self.entities.insert(key, record);
        Ok(())
    }

    /// Remove a record. Returns false when the key was absent.
    pub fn remove_one(&mut self, key: &E::Key) -> bool {
        if self.entities.remove(key).is_none() {
            return false;
        }
        self.ids.retain(|id| id != key);
        if self.selected_id.as_ref() == Some(key) {
            self.selected_id = None;
        }
        true
    }
}
