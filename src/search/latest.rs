use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use tokio::sync::watch;
use tokio::task::JoinHandle;

use super::Lookup;

/// Published state of a latest-only lookup.
#[derive(Debug, Clone, PartialEq)]
pub struct LookupState<Q, T> {
    /// Latest input, `None` before the first one.
    pub query: Option<Q>,
    /// True from input until its result (or failure) is published.
    pub pending: bool,
    pub result: Option<T>,
    pub error: Option<String>,
}

impl<Q, T> Default for LookupState<Q, T> {
    fn default() -> Self {
        Self {
            query: None,
            pending: false,
            result: None,
            error: None,
        }
    }
}

/// Runs `L` for the latest input only.
pub struct LatestOnly<L: Lookup> {
    lookup: Arc<L>,
    debounce: Duration,
    generation: Arc<AtomicU64>,
    in_flight: Mutex<Option<JoinHandle<()>>>,
    state: Arc<watch::Sender<LookupState<L::Query, L::Output>>>,
}

impl<L: Lookup> LatestOnly<L> {
    pub fn new(lookup: L, debounce: Duration) -> Self {
        let (state, _) = watch::channel(LookupState::default());
        Self {
            lookup: Arc::new(lookup),
            debounce,
            generation: Arc::new(AtomicU64::new(0)),
            in_flight: Mutex::new(None),
            state: Arc::new(state),
        }
    }

    pub fn subscribe(&self) -> watch::Receiver<LookupState<L::Query, L::Output>> {
        self.state.subscribe()
    }

    pub fn state(&self) -> LookupState<L::Query, L::Output> {
        self.state.borrow().clone()
    }

    /// Feed a new input.
    ///
    /// Cancels the previous lookup, waits out the debounce period, then
    /// queries the backend. Must be called from within a tokio runtime.
    pub fn input(&self, query: L::Query) {
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        if let Some(previous) = self.in_flight.lock().take() {
            previous.abort();
        }

        if self.lookup.is_empty(&query) {
            self.state.send_replace(LookupState {
                query: Some(query),
                ..LookupState::default()
            });
            return;
        }

        self.state.send_modify(|state| {
            state.query = Some(query.clone());
            state.pending = true;
            state.error = None;
        });

        let lookup = Arc::clone(&self.lookup);
        let latest = Arc::clone(&self.generation);
        let state = Arc::clone(&self.state);
        let debounce = self.debounce;

        let task = tokio::spawn(async move {
            if !debounce.is_zero() {
                tokio::time::sleep(debounce).await;
            }
            if latest.load(Ordering::SeqCst) != generation {
                return;
            }

            let result = lookup
                .lookup(query)
                .await
                .map_err(|err| {
                    tracing::debug!(error = %err, kind = err.kind(), "Lookup failed");
                    err.user_message()
                        .unwrap_or_else(|| lookup.failure_message().to_string())
                });

            if !publish(&*state, &*latest, generation, result) {
                tracing::trace!(generation, "Discarding stale lookup result");
            }
        });

        *self.in_flight.lock() = Some(task);
    }

    /// Cancel any pending lookup and clear the state.
    pub fn reset(&self) {
        self.generation.fetch_add(1, Ordering::SeqCst);
        if let Some(previous) = self.in_flight.lock().take() {
            previous.abort();
        }
        self.state.send_replace(LookupState::default());
    }
}

/// Publish the outcome of lookup `generation` unless a newer input exists.
///
/// The generation is compared while the watch lock is held; `input` and
/// `reset` bump it before they publish, so a stale result can never land
/// on top of a newer query.
fn publish<Q, T>(
    state: &watch::Sender<LookupState<Q, T>>,
    latest: &AtomicU64,
    generation: u64,
    result: Result<T, String>,
) -> bool {
    state.send_if_modified(|state| {
        if latest.load(Ordering::SeqCst) != generation {
            return false;
        }
        state.pending = false;
        match result {
            Ok(output) => {
                state.result = Some(output);
                state.error = None;
            }
            Err(message) => {
                state.result = None;
                state.error = Some(message);
            }
        }
        true
    })
}

impl<L: Lookup> Drop for LatestOnly<L> {
    fn drop(&mut self) {
        if let Some(task) = self.in_flight.get_mut().take() {
            task.abort();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::ApiError;
    use async_trait::async_trait;
    use std::sync::atomic::AtomicUsize;

    /// Echoes the query length after a per-query delay.
    struct SlowLength {
        calls: Arc<AtomicUsize>,
    }

    #[async_trait]
    impl Lookup for SlowLength {
        type Query = String;
        type Output = usize;

        async fn lookup(&self, query: String) -> Result<usize, ApiError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            match query.as_str() {
                "fail" => return Err(ApiError::Unknown(Some("no categories".to_string()))),
                "silent" => return Err(ApiError::Unknown(None)),
                _ => {}
            }
            // Shorter queries are slower, so earlier inputs resolve last.
            let delay = 100u64.saturating_sub(query.len() as u64 * 10);
            tokio::time::sleep(Duration::from_millis(delay)).await;
            Ok(query.len())
        }

        fn is_empty(&self, query: &String) -> bool {
            query.trim().is_empty()
        }
    }

    fn latest(debounce: Duration) -> (LatestOnly<SlowLength>, Arc<AtomicUsize>) {
        let calls = Arc::new(AtomicUsize::new(0));
        let lookup = SlowLength {
            calls: Arc::clone(&calls),
        };
        (LatestOnly::new(lookup, debounce), calls)
    }

    #[tokio::test(start_paused = true)]
    async fn debounce_collapses_rapid_inputs() {
        let (search, calls) = latest(Duration::from_millis(300));
        let mut state = search.subscribe();

        search.input("a".to_string());
        search.input("ab".to_string());
        search.input("abc".to_string());

        let done = state.wait_for(|s| !s.pending && s.result.is_some()).await.unwrap().clone();
        assert_eq!(done.query.as_deref(), Some("abc"));
        assert_eq!(done.result, Some(3));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn newer_input_wins_over_slower_older_call() {
        let (search, calls) = latest(Duration::ZERO);
        let mut state = search.subscribe();

        search.input("a".to_string());
        tokio::task::yield_now().await;
        search.input("abcdefgh".to_string());

        let done = state.wait_for(|s| !s.pending).await.unwrap().clone();
        assert_eq!(done.result, Some(8));

        // Give the aborted call time to (not) publish.
        tokio::time::sleep(Duration::from_millis(200)).await;
        assert_eq!(search.state().result, Some(8));
        assert!(calls.load(Ordering::SeqCst) >= 1);
    }

    #[tokio::test(start_paused = true)]
    async fn blank_query_clears_without_calling() {
        let (search, calls) = latest(Duration::from_millis(10));
        search.input("   ".to_string());

        let state = search.state();
        assert!(!state.pending);
        assert!(state.result.is_none());
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn failure_is_published_as_error() {
        let (search, _) = latest(Duration::ZERO);
        let mut state = search.subscribe();

        search.input("fail".to_string());
        let done = state.wait_for(|s| !s.pending).await.unwrap().clone();
        assert!(done.result.is_none());
        assert_eq!(done.error.as_deref(), Some("no categories"));
    }

    #[tokio::test(start_paused = true)]
    async fn failure_without_message_uses_lookup_default() {
        let (search, _) = latest(Duration::ZERO);
        let mut state = search.subscribe();

        search.input("silent".to_string());
        let done = state.wait_for(|s| !s.pending).await.unwrap().clone();
        assert_eq!(done.error.as_deref(), Some("Lookup failed"));
    }

    #[test]
    fn result_for_superseded_generation_is_not_published() {
        let (state, _) = watch::channel(LookupState::<String, usize> {
            query: Some("newer".to_string()),
            pending: true,
            ..LookupState::default()
        });
        let latest = AtomicU64::new(2);

        assert!(!publish(&state, &latest, 1, Ok(5)));
        let current = state.borrow().clone();
        assert!(current.pending);
        assert_eq!(current.result, None);
        assert_eq!(current.query.as_deref(), Some("newer"));

        assert!(publish(&state, &latest, 2, Ok(5)));
        assert_eq!(state.borrow().result, Some(5));
        assert!(!state.borrow().pending);
    }

    #[test]
    fn failure_for_current_generation_clears_result() {
        let (state, _) = watch::channel(LookupState::<String, usize> {
            result: Some(3),
            pending: true,
            ..LookupState::default()
        });
        let latest = AtomicU64::new(7);

        assert!(publish(&state, &latest, 7, Err("offline".to_string())));
        let current = state.borrow().clone();
        assert_eq!(current.result, None);
        assert_eq!(current.error.as_deref(), Some("offline"));
    }

    #[tokio::test(start_paused = true)]
    async fn reset_cancels_pending_lookup() {
        let (search, calls) = latest(Duration::from_millis(50));
        search.input("abc".to_string());
        search.reset();

        tokio::time::sleep(Duration::from_millis(500)).await;
        assert_eq!(search.state(), LookupState::default());
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }
}
