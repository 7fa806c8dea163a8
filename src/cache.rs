use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;

use tokio::sync::Mutex;
use tracing::debug;

use crate::domain::query::{QueryKey, QueryState};
use crate::error::AppResult;

/// Last known result per logical key, plus single-flight coordination.
///
/// Entries are only written by [`QueryCache::fetch`] for its own key and by
/// [`QueryCache::invalidate`]. Failed fetches are stored as the key's error
/// state and are never retried here.
pub struct QueryCache<V> {
    entries: Mutex<HashMap<QueryKey, CacheEntry<V>>>,
    inflight: Mutex<HashMap<QueryKey, Arc<Mutex<()>>>>,
}

struct CacheEntry<V> {
    state: QueryState<V>,
    stale: bool,
    completed_fetches: u64,
    invalidations: u64,
}

impl<V> CacheEntry<V> {
    fn empty() -> Self {
        Self {
            state: QueryState::Pending,
            stale: false,
            completed_fetches: 0,
            invalidations: 0,
        }
    }

    fn is_fresh_data(&self) -> bool {
        !self.stale && matches!(self.state, QueryState::Data(_))
    }
}

impl<V: Clone> QueryCache<V> {
    pub fn new() -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
            inflight: Mutex::new(HashMap::new()),
        }
    }

    /// Current state of `key` without fetching.
    pub async fn state(&self, key: QueryKey) -> QueryState<V> {
        self.entries
            .lock()
            .await
            .get(&key)
            .map(|entry| entry.state.clone())
            .unwrap_or(QueryState::Pending)
    }

    /// Marks `key` stale. Its last state stays readable; the next fetch goes to the source.
    pub async fn invalidate(&self, key: QueryKey) {
        let mut entries = self.entries.lock().await;
        let entry = entries.entry(key).or_insert_with(CacheEntry::empty);
        entry.stale = true;
        entry.invalidations += 1;
        debug!(%key, "invalidated query");
    }

    /// Returns fresh cached data for `key`, or runs `fetcher` with at most one
    /// fetch in flight per key. Callers that queued behind a fetch receive its
    /// result, success or failure, instead of fetching again.
    pub async fn fetch<F, Fut>(&self, key: QueryKey, fetcher: F) -> QueryState<V>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = AppResult<V>>,
    {
        let observed = {
            let entries = self.entries.lock().await;
            match entries.get(&key) {
                Some(entry) if entry.is_fresh_data() => {
                    debug!(%key, "query cache hit");
                    return entry.state.clone();
                }
                Some(entry) => entry.completed_fetches,
                None => 0,
            }
        };

        let flight = self.flight_lock(key).await;
        let _guard = flight.lock().await;

        let invalidations = {
            let entries = self.entries.lock().await;
            match entries.get(&key) {
                Some(entry)
                    if !entry.stale
                        && (entry.completed_fetches > observed || entry.is_fresh_data()) =>
                {
                    debug!(%key, "sharing result of concurrent fetch");
                    return entry.state.clone();
                }
                Some(entry) => entry.invalidations,
                None => 0,
            }
        };

        debug!(%key, "fetching query");
        let state = QueryState::from(fetcher().await);

        let mut entries = self.entries.lock().await;
        let entry = entries.entry(key).or_insert_with(CacheEntry::empty);
        entry.completed_fetches += 1;
        entry.stale = entry.invalidations != invalidations;
        entry.state = state.clone();
        state
    }

    async fn flight_lock(&self, key: QueryKey) -> Arc<Mutex<()>> {
        let mut inflight = self.inflight.lock().await;
        Arc::clone(
            inflight
                .entry(key)
                .or_insert_with(|| Arc::new(Mutex::new(()))),
        )
    }
}

impl<V: Clone> Default for QueryCache<V> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use tokio::sync::{Notify, oneshot};

    use super::*;
    use crate::error::AppError;

    const KEY: QueryKey = QueryKey::new("tickets");
    const OTHER: QueryKey = QueryKey::new("sites");

    async fn settle() {
        for _ in 0..16 {
            tokio::task::yield_now().await;
        }
    }

    #[tokio::test]
    async fn serves_cached_data_without_refetching() {
        let cache = QueryCache::new();
        let calls = AtomicUsize::new(0);
        let counter = &calls;
        let fetch = move || async move {
            counter.fetch_add(1, Ordering::SeqCst);
            Ok(vec![1, 2])
        };

        assert!(cache.state(KEY).await.is_pending());
        let first = cache.fetch(KEY, fetch).await;
        let second = cache.fetch(KEY, fetch).await;
        assert_eq!(first.data(), Some(&vec![1, 2]));
        assert_eq!(second.data(), Some(&vec![1, 2]));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn keys_are_independent() {
        let cache = QueryCache::new();
        cache.fetch(KEY, || async { Ok(1) }).await;
        cache.fetch(OTHER, || async { Ok(2) }).await;
        cache.invalidate(OTHER).await;

        assert_eq!(cache.fetch(KEY, || async { Ok(10) }).await.data(), Some(&1));
        assert_eq!(cache.fetch(OTHER, || async { Ok(20) }).await.data(), Some(&20));
    }

    #[tokio::test]
    async fn failure_is_surfaced_without_retry() {
        let cache: QueryCache<u32> = QueryCache::new();
        let calls = AtomicUsize::new(0);
        let counter = &calls;

        let state = cache
            .fetch(KEY, move || async move {
                counter.fetch_add(1, Ordering::SeqCst);
                Err(AppError::transport("connection refused"))
            })
            .await;

        assert!(matches!(state.error(), Some(AppError::Transport { .. })));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert!(cache.state(KEY).await.error().is_some());
    }

    #[tokio::test]
    async fn concurrent_fetches_share_one_call() {
        let cache = Arc::new(QueryCache::new());
        let calls = Arc::new(AtomicUsize::new(0));
        let gate = Arc::new(Notify::new());

        let mut joins = Vec::new();
        for _ in 0..8 {
            let cache = Arc::clone(&cache);
            let calls = Arc::clone(&calls);
            let gate = Arc::clone(&gate);
            joins.push(tokio::spawn(async move {
                cache
                    .fetch(KEY, || async move {
                        calls.fetch_add(1, Ordering::SeqCst);
                        gate.notified().await;
                        Ok(vec!["t1".to_string()])
                    })
                    .await
            }));
        }

        settle().await;
        gate.notify_one();
        for join in joins {
            let state = join.await.expect("join handle");
            assert_eq!(state.data(), Some(&vec!["t1".to_string()]));
        }
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn queued_callers_share_a_failure() {
        let cache: Arc<QueryCache<u32>> = Arc::new(QueryCache::new());
        let calls = Arc::new(AtomicUsize::new(0));
        let gate = Arc::new(Notify::new());

        let mut joins = Vec::new();
        for _ in 0..4 {
            let cache = Arc::clone(&cache);
            let calls = Arc::clone(&calls);
            let gate = Arc::clone(&gate);
            joins.push(tokio::spawn(async move {
                cache
                    .fetch(KEY, || async move {
                        calls.fetch_add(1, Ordering::SeqCst);
                        gate.notified().await;
                        Err(AppError::http_status(502, "bad gateway"))
                    })
                    .await
            }));
        }

        settle().await;
        gate.notify_one();
        for join in joins {
            let state = join.await.expect("join handle");
            assert_eq!(state.error().and_then(AppError::status), Some(502));
        }
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn invalidation_forces_refetch_and_keeps_last_state() {
        let cache = QueryCache::new();
        cache.fetch(KEY, || async { Ok("old") }).await;

        cache.invalidate(KEY).await;
        assert_eq!(cache.state(KEY).await.data(), Some(&"old"));

        let state = cache.fetch(KEY, || async { Ok("new") }).await;
        assert_eq!(state.data(), Some(&"new"));
        assert_eq!(cache.fetch(KEY, || async { Ok("newer") }).await.data(), Some(&"new"));
    }

    #[tokio::test]
    async fn fetch_started_before_invalidation_stays_stale() {
        let cache = Arc::new(QueryCache::new());
        let release = Arc::new(Notify::new());
        let (started_tx, started_rx) = oneshot::channel();

        let slow = {
            let cache = Arc::clone(&cache);
            let release = Arc::clone(&release);
            tokio::spawn(async move {
                cache
                    .fetch(KEY, || async move {
                        let _ = started_tx.send(());
                        release.notified().await;
                        Ok("before create")
                    })
                    .await
            })
        };

        started_rx.await.expect("fetch started");
        cache.invalidate(KEY).await;
        release.notify_one();
        let late = slow.await.expect("join handle");
        assert_eq!(late.data(), Some(&"before create"));

        let next = cache.fetch(KEY, || async { Ok("after create") }).await;
        assert_eq!(next.data(), Some(&"after create"));
    }

    #[tokio::test]
    async fn invalidating_unknown_key_is_harmless() {
        let cache: QueryCache<u8> = QueryCache::default();
        cache.invalidate(KEY).await;
        assert!(cache.state(KEY).await.is_pending());
        assert_eq!(cache.fetch(KEY, || async { Ok(3) }).await.data(), Some(&3));
    }
}
