//! Shared test utilities and fixtures.

#![allow(dead_code, unused_imports)]

pub mod mock_backend;

use admin_console::api::{ApiError, EntityApi, RestClient};
use admin_console::config::ApiConfig;
use admin_console::domain::{Company, Entity, User, UserDraft};
use admin_console::notify::{NotificationLevel, Notifier};
use admin_console::store::{AppState, EntityEffects, Store, StoreHandle};
use async_trait::async_trait;
use chrono::{TimeZone, Utc};
use parking_lot::Mutex;
use std::collections::{HashMap, VecDeque};
use std::sync::Arc;
use std::time::Duration;

pub fn user(id: u64, first_name: &str) -> User {
    let at = Utc.with_ymd_and_hms(2024, 5, 1, 9, 0, 0).unwrap();
    User {
        id,
        first_name: first_name.to_string(),
        last_name: "Doe".to_string(),
        email: format!("{}@example.com", first_name.to_lowercase()),
        phone: None,
        company_id: None,
        created_at: at,
        updated_at: at,
        verified_at: None,
    }
}

pub fn company(id: &str, name: &str) -> Company {
    let at = Utc.with_ymd_and_hms(2024, 5, 1, 9, 0, 0).unwrap();
    Company {
        id: id.to_string(),
        name: name.to_string(),
        email: None,
        phone: None,
        address: None,
        created_at: at,
        updated_at: at,
        deleted_at: None,
    }
}

pub fn user_draft(first_name: &str) -> UserDraft {
    UserDraft {
        first_name: first_name.to_string(),
        last_name: "Doe".to_string(),
        email: format!("{}@example.com", first_name.to_lowercase()),
        phone: None,
        company_id: None,
    }
}

pub fn rest_client(base_url: &str) -> RestClient {
    RestClient::new(&ApiConfig {
        base_url: base_url.to_string(),
        timeout_seconds: 2,
        connect_timeout_seconds: 1,
        ..ApiConfig::default()
    })
    .expect("rest client")
}

/// Notifier that records everything it receives.
#[derive(Default)]
pub struct RecordingNotifier {
    pub seen: Mutex<Vec<(NotificationLevel, String)>>,
}

impl RecordingNotifier {
    pub fn messages(&self) -> Vec<(NotificationLevel, String)> {
        self.seen.lock().clone()
    }
}

impl Notifier for RecordingNotifier {
    fn notify(&self, level: NotificationLevel, message: String) {
        self.seen.lock().push((level, message));
    }
}

/// Scripted reply for [`FakeApi`].
pub enum Reply<E: Entity> {
    One(E),
    Many(Vec<E>),
    Done,
    Fail(ApiError),
}

/// In-memory collaborator answering from per-call scripts.
///
/// Calls are keyed like `"list_all"` or `"delete_by_id 3"`; each reply may
/// be held back by a delay so tests can force an arrival order.
pub struct FakeApi<E: Entity> {
    replies: Mutex<HashMap<String, VecDeque<(Duration, Reply<E>)>>>,
    calls: Mutex<Vec<String>>,
}

impl<E: Entity> Default for FakeApi<E> {
    fn default() -> Self {
        Self {
            replies: Mutex::new(HashMap::new()),
            calls: Mutex::new(Vec::new()),
        }
    }
}

impl<E: Entity> FakeApi<E> {
    pub fn reply(&self, call: &str, reply: Reply<E>) {
        self.reply_after(call, Duration::ZERO, reply);
    }

    pub fn reply_after(&self, call: &str, delay: Duration, reply: Reply<E>) {
        self.replies
            .lock()
            .entry(call.to_string())
            .or_default()
            .push_back((delay, reply));
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().clone()
    }

    async fn next(&self, call: String) -> Reply<E> {
        self.calls.lock().push(call.clone());
        let scripted = self
            .replies
            .lock()
            .get_mut(&call)
            .and_then(VecDeque::pop_front);
        let (delay, reply) =
            scripted.unwrap_or((Duration::ZERO, Reply::Fail(ApiError::Unknown(None))));
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
        reply
    }
}

fn unexpected<T>() -> Result<T, ApiError> {
    Err(ApiError::Unknown(Some("unexpected scripted reply".to_string())))
}

#[async_trait]
impl<E: Entity> EntityApi<E> for FakeApi<E> {
    async fn list_all(&self) -> Result<Vec<E>, ApiError> {
        match self.next("list_all".to_string()).await {
            Reply::Many(records) => Ok(records),
            Reply::Fail(err) => Err(err),
            _ => unexpected(),
        }
    }

    async fn get_by_id(&self, id: &E::Key) -> Result<E, ApiError> {
        match self.next(format!("get_by_id {}", id)).await {
            Reply::One(record) => Ok(record),
            Reply::Fail(err) => Err(err),
            _ => unexpected(),
        }
    }

    async fn create(&self, _draft: &E::Draft) -> Result<E, ApiError> {
        match self.next("create".to_string()).await {
            Reply::One(record) => Ok(record),
            Reply::Fail(err) => Err(err),
            _ => unexpected(),
        }
    }

    async fn update(&self, id: &E::Key, _draft: &E::Draft) -> Result<E, ApiError> {
        match self.next(format!("update {}", id)).await {
            Reply::One(record) => Ok(record),
            Reply::Fail(err) => Err(err),
            _ => unexpected(),
        }
    }

    async fn delete_by_id(&self, id: &E::Key) -> Result<(), ApiError> {
        match self.next(format!("delete_by_id {}", id)).await {
            Reply::Done => Ok(()),
            Reply::Fail(err) => Err(err),
            _ => unexpected(),
        }
    }
}

/// Store wired to fake collaborators for both collections.
pub struct Harness {
    pub handle: StoreHandle,
    pub users: Arc<FakeApi<User>>,
    pub companies: Arc<FakeApi<Company>>,
    pub notifier: Arc<RecordingNotifier>,
}

impl Harness {
    pub fn start() -> Self {
        Self::start_with(AppState::default())
    }

    pub fn start_with(initial: AppState) -> Self {
        let users = Arc::new(FakeApi::<User>::default());
        let companies = Arc::new(FakeApi::<Company>::default());
        let notifier = Arc::new(RecordingNotifier::default());

        let (handle, store) = Store::new(initial);
        let store = store
            .with_effect(EntityEffects::<User>::new(
                Arc::clone(&users) as _,
                Arc::clone(&notifier) as _,
            ))
            .with_effect(EntityEffects::<Company>::new(
                Arc::clone(&companies) as _,
                Arc::clone(&notifier) as _,
            ));
        tokio::spawn(store.run());

        Self {
            handle,
            users,
            companies,
            notifier,
        }
    }

    /// Wait until `done` holds for the published state.
    pub async fn settle(&self, done: impl FnMut(&AppState) -> bool) -> AppState {
        let mut state = self.handle.subscribe();
        let settled = tokio::time::timeout(Duration::from_secs(5), state.wait_for(done))
            .await
            .expect("store did not settle")
            .expect("store stopped")
            .clone();
        settled
    }
}
