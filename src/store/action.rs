//! Closed action vocabulary for entity collections.

use std::fmt;

use crate::domain::{Company, Entity, User};
use crate::store::mvi::Action;

/// Server operation an action belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Verb {
    LoadAll,
    LoadOne,
    Create,
    Update,
    Delete,
}

impl Verb {
    /// Whether the verb changes server data.
    pub fn is_mutation(self) -> bool {
        matches!(self, Verb::Create | Verb::Update | Verb::Delete)
    }
}

impl fmt::Display for Verb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Verb::LoadAll => "load-all",
            Verb::LoadOne => "load-one",
            Verb::Create => "create",
            Verb::Update => "update",
            Verb::Delete => "delete",
        };
        f.write_str(name)
    }
}

/// Whether an action asks for work or reports its result.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Intent,
    Success,
    Failure,
}

/// Intent and outcome messages for one entity type.
#[derive(Debug, Clone, PartialEq)]
pub enum EntityAction<E: Entity> {
    Load,
    LoadSuccess { records: Vec<E> },
    LoadFailure { message: String },

    LoadOne { id: E::Key },
    LoadOneSuccess { record: E },
    LoadOneFailure { message: String },

    Create { draft: E::Draft },
    CreateSuccess { record: E },
    CreateFailure { message: String },

    Update { id: E::Key, draft: E::Draft },
    UpdateSuccess { record: E },
    UpdateFailure { message: String },

    Delete { id: E::Key },
    DeleteSuccess { id: E::Key },
    DeleteFailure { message: String },
}

impl<E: Entity> Action for EntityAction<E> {}

impl<E: Entity> EntityAction<E> {
    pub fn verb(&self) -> Verb {
        match self {
            Self::Load | Self::LoadSuccess { .. } | Self::LoadFailure { .. } => Verb::LoadAll,
            Self::LoadOne { .. } | Self::LoadOneSuccess { .. } | Self::LoadOneFailure { .. } => {
                Verb::LoadOne
            }
            Self::Create { .. } | Self::CreateSuccess { .. } | Self::CreateFailure { .. } => {
                Verb::Create
            }
            Self::Update { .. } | Self::UpdateSuccess { .. } | Self::UpdateFailure { .. } => {
                Verb::Update
            }
            Self::Delete { .. } | Self::DeleteSuccess { .. } | Self::DeleteFailure { .. } => {
                Verb::Delete
            }
        }
    }

    pub fn phase(&self) -> Phase {
        match self {
            Self::Load
            | Self::LoadOne { .. }
            | Self::Create { .. }
            | Self::Update { .. }
            | Self::Delete { .. } => Phase::Intent,
            Self::LoadSuccess { .. }
            | Self::LoadOneSuccess { .. }
            | Self::CreateSuccess { .. }
            | Self::UpdateSuccess { .. }
            | Self::DeleteSuccess { .. } => Phase::Success,
            Self::LoadFailure { .. }
            | Self::LoadOneFailure { .. }
            | Self::CreateFailure { .. }
            | Self::UpdateFailure { .. }
            | Self::DeleteFailure { .. } => Phase::Failure,
        }
    }

    pub fn is_intent(&self) -> bool {
        self.phase() == Phase::Intent
    }

    pub fn is_outcome(&self) -> bool {
        !self.is_intent()
    }

    /// Build the failure action matching this action's verb.
    pub fn failure(verb: Verb, message: impl Into<String>) -> Self {
        let message = message.into();
        match verb {
            Verb::LoadAll => Self::LoadFailure { message },
            Verb::LoadOne => Self::LoadOneFailure { message },
            Verb::Create => Self::CreateFailure { message },
            Verb::Update => Self::UpdateFailure { message },
            Verb::Delete => Self::DeleteFailure { message },
        }
    }

    /// Failure message carried by the action, if any.
    pub fn failure_message(&self) -> Option<&str> {
        match self {
            Self::LoadFailure { message }
            | Self::LoadOneFailure { message }
            | Self::CreateFailure { message }
            | Self::UpdateFailure { message }
            | Self::DeleteFailure { message } => Some(message),
            _ => None,
        }
    }
}

/// Root action dispatched to the store.
#[derive(Debug, Clone, PartialEq)]
pub enum AppAction {
    Users(EntityAction<User>),
    Companies(EntityAction<Company>),
}

impl Action for AppAction {}

impl AppAction {
    pub fn verb(&self) -> Verb {
        match self {
            AppAction::Users(action) => action.verb(),
            AppAction::Companies(action) => action.verb(),
        }
    }

    pub fn phase(&self) -> Phase {
        match self {
            AppAction::Users(action) => action.phase(),
            AppAction::Companies(action) => action.phase(),
        }
    }

    pub fn is_intent(&self) -> bool {
        self.phase() == Phase::Intent
    }

    pub fn is_outcome(&self) -> bool {
        !self.is_intent()
    }

    pub fn failure_message(&self) -> Option<&str> {
        match self {
            AppAction::Users(action) => action.failure_message(),
            AppAction::Companies(action) => action.failure_message(),
        }
    }

    /// Label of the collection the action targets.
    pub fn collection(&self) -> &'static str {
        match self {
            AppAction::Users(_) => User::PLURAL,
            AppAction::Companies(_) => Company::PLURAL,
        }
    }

    /// Whether `self` is an outcome of the same collection and verb as `intent`.
    pub fn answers(&self, intent: &AppAction) -> bool {
        self.is_outcome()
            && self.collection() == intent.collection()
            && self.verb() == intent.verb()
    }
}

impl From<EntityAction<User>> for AppAction {
    fn from(action: EntityAction<User>) -> Self {
        AppAction::Users(action)
    }
}

impl From<EntityAction<Company>> for AppAction {
    fn from(action: EntityAction<Company>) -> Self {
        AppAction::Companies(action)
    }
}
