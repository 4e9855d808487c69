//! Serialized store task.
//!
//! One task owns the state. Actions arrive over a bounded channel and are
//! reduced strictly in receive order, so no two transitions ever overlap.
//! After each transition the new state is published on a `watch` channel,
//! the action on a `broadcast` channel, and registered effects get a look
//! at it.

use std::sync::Arc;

use thiserror::Error;
use tokio::sync::broadcast::error::RecvError;
use tokio::sync::{broadcast, mpsc, watch};

use crate::store::action::AppAction;
use crate::store::mvi::Reducer;
use crate::store::reducer::RootReducer;
use crate::store::state::AppState;

const STORE_BUFFER: usize = 64;
const ACTION_BUFFER: usize = 256;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    #[error("Store is closed")]
    Closed,
    #[error("Action stream lagged, {0} actions skipped")]
    Lagged(u64),
}

/// Reacts to applied actions, typically by starting async work.
///
/// Implementations must not block: long work is spawned and reports back
/// through the [`Dispatcher`].
pub trait Effect: Send + Sync + 'static {
    fn on_action(&self, action: &AppAction, dispatcher: &Dispatcher);
}

/// Route back into the store for effects.
///
/// Holds a weak sender so the store can shut down once every
/// [`StoreHandle`] is gone; in-flight work upgrades it first and keeps
/// the store alive until its outcome is delivered.
#[derive(Clone)]
pub struct Dispatcher {
    sender: mpsc::WeakSender<AppAction>,
}

impl Dispatcher {
    pub fn upgrade(&self) -> Option<mpsc::Sender<AppAction>> {
        self.sender.upgrade()
    }
}

pub struct Store {
    receiver: mpsc::Receiver<AppAction>,
    dispatcher: Dispatcher,
    state: watch::Sender<AppState>,
    actions: broadcast::Sender<AppAction>,
    effects: Vec<Arc<dyn Effect>>,
}

impl Store {
    pub fn new(initial: AppState) -> (StoreHandle, Store) {
        let (sender, receiver) = mpsc::channel(STORE_BUFFER);
        let (state_tx, state_rx) = watch::channel(initial);
        let (actions_tx, _) = broadcast::channel(ACTION_BUFFER);

        let store = Store {
            receiver,
            dispatcher: Dispatcher {
                sender: sender.downgrade(),
            },
            state: state_tx,
            actions: actions_tx.clone(),
            effects: Vec::new(),
        };
        let handle = StoreHandle {
            sender,
            state: state_rx,
            actions: actions_tx,
        };
        (handle, store)
    }

    pub fn with_effect(mut self, effect: impl Effect) -> Self {
        self.effects.push(Arc::new(effect));
        self
    }

    /// Process actions until every handle and in-flight effect is gone.
    pub async fn run(mut self) {
        while let Some(action) = self.receiver.recv().await {
            tracing::debug!(
                collection = action.collection(),
                verb = %action.verb(),
                phase = ?action.phase(),
                "Applying action"
            );

            // Reduced in place so slices no snapshot shares are moved, not cloned.
            self.state.send_modify(|state| {
                let current = std::mem::take(state);
                *state = RootReducer::reduce(current, action.clone());
            });

            if self.actions.send(action.clone()).is_err() {
                tracing::trace!("No action subscribers");
            }

            for effect in &self.effects {
                effect.on_action(&action, &self.dispatcher);
            }
        }
        tracing::debug!("Store stopped");
    }
}

/// Cloneable front door to a running [`Store`].
#[derive(Clone)]
pub struct StoreHandle {
    sender: mpsc::Sender<AppAction>,
    state: watch::Receiver<AppState>,
    actions: broadcast::Sender<AppAction>,
}

impl StoreHandle {
    pub async fn dispatch(&self, action: impl Into<AppAction>) -> Result<(), StoreError> {
        self.sender
            .send(action.into())
            .await
            .map_err(|_| StoreError::Closed)
    }

    /// Latest published state.
    pub fn state(&self) -> AppState {
        self.state.borrow().clone()
    }

    /// Run a projection against the latest state without cloning it.
    pub fn select<T>(&self, project: impl FnOnce(&AppState) -> T) -> T {
        project(&self.state.borrow())
    }

    /// Receiver notified after every transition.
    pub fn subscribe(&self) -> watch::Receiver<AppState> {
        self.state.clone()
    }

    /// Stream of applied actions, in application order.
    pub fn actions(&self) -> broadcast::Receiver<AppAction> {
        self.actions.subscribe()
    }

    /// Dispatch an intent and wait for the first outcome of the same
    /// collection and verb.
    ///
    /// Outcomes are not correlated to a specific intent: with several
    /// intents of the same verb in flight, the first outcome to arrive is
    /// returned. Waits forever if no effect handles the intent.
    pub async fn dispatch_and_wait(
        &self,
        action: impl Into<AppAction>,
    ) -> Result<AppAction, StoreError> {
        let intent = action.into();
        let mut actions = self.actions();
        self.dispatch(intent.clone()).await?;

        loop {
            match actions.recv().await {
                Ok(applied) if applied.answers(&intent) => return Ok(applied),
                Ok(_) => continue,
                Err(RecvError::Closed) => return Err(StoreError::Closed),
                Err(RecvError::Lagged(skipped)) => return Err(StoreError::Lagged(skipped)),
            }
        }
    }
}
