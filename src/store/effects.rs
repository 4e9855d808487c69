//! Side-effect coordinator.
//!
//! Turns intent actions into backend calls and every call into exactly one
//! outcome action. Failures become `-Failure` actions; they never escape
//! and never stop later intents from being served.

use std::sync::Arc;

use tracing::Instrument;
use uuid::Uuid;

use crate::api::{ApiError, EntityApi};
use crate::domain::Entity;
use crate::notify::{NotificationLevel, Notifier};
use crate::store::action::{AppAction, EntityAction, Verb};
use crate::store::runtime::{Dispatcher, Effect};
use crate::store::state::StoreEntity;

/// Effects for one entity type.
pub struct EntityEffects<E: Entity> {
    api: Arc<dyn EntityApi<E>>,
    notifier: Arc<dyn Notifier>,
}

impl<E: Entity> Clone for EntityEffects<E> {
    fn clone(&self) -> Self {
        Self {
            api: Arc::clone(&self.api),
            notifier: Arc::clone(&self.notifier),
        }
    }
}

impl<E: Entity> EntityEffects<E> {
    pub fn new(api: Arc<dyn EntityApi<E>>, notifier: Arc<dyn Notifier>) -> Self {
        Self { api, notifier }
    }

    /// Perform the call behind `action`.
    ///
    /// Returns the single outcome action for an intent, `None` for any
    /// other action.
    pub async fn execute(&self, action: EntityAction<E>) -> Option<EntityAction<E>> {
        let verb = action.verb();
        let result = match action {
            EntityAction::Load => self
                .api
                .list_all()
                .await
                .map(|records| EntityAction::LoadSuccess { records }),
            EntityAction::LoadOne { id } => self
                .api
                .get_by_id(&id)
                .await
                .map(|record| EntityAction::LoadOneSuccess { record }),
            EntityAction::Create { draft } => self
                .api
                .create(&draft)
                .await
                .map(|record| EntityAction::CreateSuccess { record }),
            EntityAction::Update { id, draft } => self
                .api
                .update(&id, &draft)
                .await
                .map(|record| EntityAction::UpdateSuccess { record }),
            EntityAction::Delete { id } => self
                .api
                .delete_by_id(&id)
                .await
                .map(|()| EntityAction::DeleteSuccess { id }),
            _ => return None,
        };

        let outcome = match result {
            Ok(outcome) => {
                tracing::debug!(collection = E::PLURAL, verb = %verb, "Request succeeded");
                if let Some(message) = success_message::<E>(verb) {
                    self.notifier.notify(NotificationLevel::Success, message);
                }
                outcome
            }
            Err(err) => {
                let message = failure_message::<E>(&err, verb);
                tracing::warn!(
                    collection = E::PLURAL,
                    verb = %verb,
                    kind = err.kind(),
                    error = %err,
                    "Request failed"
                );
                self.notifier
                    .notify(NotificationLevel::Error, message.clone());
                EntityAction::failure(verb, message)
            }
        };
        Some(outcome)
    }
}

impl<E: StoreEntity> Effect for EntityEffects<E> {
    fn on_action(&self, action: &AppAction, dispatcher: &Dispatcher) {
        let Some(action) = E::project(action) else {
            return;
        };
        if !action.is_intent() {
            return;
        }
        let Some(sender) = dispatcher.upgrade() else {
            tracing::debug!("Store closed, dropping intent");
            return;
        };

        let request_id = Uuid::new_v4();
        let span = tracing::info_span!(
            "effect",
            request_id = %request_id,
            collection = E::PLURAL,
            verb = %action.verb()
        );
        let effects = self.clone();
        let action = action.clone();

        // Every intent gets its own task: overlapping intents of the same
        // verb all run to completion and all report back.
        tokio::spawn(
            async move {
                if let Some(outcome) = effects.execute(action).await {
                    if sender.send(E::embed(outcome)).await.is_err() {
                        tracing::debug!("Store closed before outcome was delivered");
                    }
                }
            }
            .instrument(span),
        );
    }
}

/// User-facing message for a failed call.
///
/// Prefers the server's own message, then the transport error text, then
/// a per-verb default.
pub fn failure_message<E: Entity>(err: &ApiError, verb: Verb) -> String {
    err.user_message()
        .unwrap_or_else(|| default_failure_message::<E>(verb))
}

pub fn default_failure_message<E: Entity>(verb: Verb) -> String {
    match verb {
        Verb::LoadAll => format!("Unable to load {}", E::PLURAL),
        Verb::LoadOne => format!("Unable to load {}", E::KIND),
        Verb::Create => format!("Unable to create {}", E::KIND),
        Verb::Update => format!("Unable to update {}", E::KIND),
        Verb::Delete => format!("Unable to delete {}", E::KIND),
    }
}

/// Notification text for a successful mutation; loads stay silent.
pub fn success_message<E: Entity>(verb: Verb) -> Option<String> {
    let past = match verb {
        Verb::Create => "created",
        Verb::Update => "updated",
        Verb::Delete => "deleted",
        Verb::LoadAll | Verb::LoadOne => return None,
    };
    Some(format!("{} {} successfully", capitalize(E::KIND), past))
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
