use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Weak};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::broadcast::error::RecvError;
use tokio::sync::{watch, RwLock};
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use super::{Collection, InvalidationBus};
use crate::error::Result;

/// Source of a list's records, usually one of the API clients
#[async_trait]
pub trait Loader<T>: Send + Sync {
    async fn load(&self) -> Result<Vec<T>>;
}

/// Where the latest request stands
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadPhase {
    Idle,
    Pending,
    Resolved,
    Failed,
    Aborted,
}

/// What a call to [`ListStore::refresh`] ended up doing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshOutcome {
    /// The response replaced the collection
    Applied,
    /// A newer refresh was issued meanwhile; this response was dropped
    Superseded,
    /// The store was unmounted; nothing was fetched or applied
    Unmounted,
    /// The fetch failed; the previous collection is kept
    Failed,
}

struct ListState<T> {
    items: Vec<T>,
    phase: LoadPhase,
    last_error: Option<String>,
    loaded_at: Option<DateTime<Utc>>,
}

/// In-memory copy of one collection, refreshed on demand
///
/// Every refresh gets a generation number. A response is applied only if
/// the store is still mounted and no newer refresh was issued in between.
pub struct ListStore<T> {
    collection: Collection,
    loader: Arc<dyn Loader<T>>,
    state: RwLock<ListState<T>>,
    issued: AtomicU64,
    mounted: watch::Sender<bool>,
    version: watch::Sender<u64>,
}

impl<T: Clone + Send + Sync + 'static> ListStore<T> {
    pub fn new(collection: Collection, loader: Arc<dyn Loader<T>>) -> Self {
        let (mounted, _) = watch::channel(true);
        let (version, _) = watch::channel(0);
        Self {
            collection,
            loader,
            state: RwLock::new(ListState {
                items: Vec::new(),
                phase: LoadPhase::Idle,
                last_error: None,
                loaded_at: None,
            }),
            issued: AtomicU64::new(0),
            mounted,
            version,
        }
    }

    pub fn collection(&self) -> Collection {
        self.collection
    }

    pub fn is_mounted(&self) -> bool {
        *self.mounted.borrow()
    }

    /// Refetch and replace the collection
    pub async fn refresh(&self) -> RefreshOutcome {
        if !self.is_mounted() {
            return RefreshOutcome::Unmounted;
        }
        let generation = self.issued.fetch_add(1, Ordering::SeqCst) + 1;
        self.state.write().await.phase = LoadPhase::Pending;
        debug!(collection = %self.collection, generation, "Refreshing list");

        let result = self.loader.load().await;

        let mut state = self.state.write().await;
        if !self.is_mounted() {
            debug!(collection = %self.collection, generation, "Dropping response after unmount");
            // unmount() may have lost the race for the lock
            if state.phase == LoadPhase::Pending {
                state.phase = LoadPhase::Aborted;
            }
            return RefreshOutcome::Unmounted;
        }
        if generation != self.issued.load(Ordering::SeqCst) {
            debug!(collection = %self.collection, generation, "Dropping superseded response");
            return RefreshOutcome::Superseded;
        }

        match result {
            Ok(items) => {
                state.items = items;
                state.phase = LoadPhase::Resolved;
                state.last_error = None;
                state.loaded_at = Some(Utc::now());
                drop(state);
                self.version.send_modify(|v| *v += 1);
                RefreshOutcome::Applied
            }
            Err(e) => {
                warn!(collection = %self.collection, error = %e, "Refresh failed, keeping previous list");
                state.phase = LoadPhase::Failed;
                state.last_error = Some(e.to_string());
                RefreshOutcome::Failed
            }
        }
    }

    /// Stop applying responses; in-flight requests are discarded when they land
    pub fn unmount(&self) {
        self.mounted.send_replace(false);
        if let Ok(mut state) = self.state.try_write() {
            if state.phase == LoadPhase::Pending {
                state.phase = LoadPhase::Aborted;
            }
        }
    }

    pub async fn items(&self) -> Vec<T> {
        self.state.read().await.items.clone()
    }

    pub async fn len(&self) -> usize {
        self.state.read().await.items.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.state.read().await.items.is_empty()
    }

    pub async fn phase(&self) -> LoadPhase {
        self.state.read().await.phase
    }

    pub async fn is_loading(&self) -> bool {
        self.phase().await == LoadPhase::Pending
    }

    /// Message of the last failed refresh, cleared by the next success
    pub async fn last_error(&self) -> Option<String> {
        self.state.read().await.last_error.clone()
    }

    pub async fn loaded_at(&self) -> Option<DateTime<Utc>> {
        self.state.read().await.loaded_at
    }

    /// Ticks every time a response is applied
    pub fn changes(&self) -> watch::Receiver<u64> {
        self.version.subscribe()
    }

    /// Refresh whenever this store's collection is published on the bus
    ///
    /// The listener ends when the store is unmounted or dropped, or the bus
    /// goes away.
    pub fn attach(self: &Arc<Self>, bus: &InvalidationBus) -> JoinHandle<()> {
        let store: Weak<Self> = Arc::downgrade(self);
        let collection = self.collection;
        let mut invalidations = bus.subscribe();
        let mut mounted = self.mounted.subscribe();

        tokio::spawn(async move {
            loop {
                tokio::select! {
                    changed = mounted.changed() => {
                        if changed.is_err() || !*mounted.borrow() {
                            break;
                        }
                    }
                    received = invalidations.recv() => {
                        match received {
                            Ok(stale) if stale == collection => {}
                            Ok(_) => continue,
                            Err(RecvError::Lagged(skipped)) => {
                                debug!(%collection, skipped, "Invalidation listener lagged, refreshing");
                            }
                            Err(RecvError::Closed) => break,
                        }
                        let Some(store) = store.upgrade() else { break };
                        if store.refresh().await == RefreshOutcome::Unmounted {
                            break;
                        }
                    }
                }
            }
            debug!(%collection, "Invalidation listener stopped");
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use std::collections::VecDeque;
    use std::sync::Mutex;
    use std::time::Duration;
    use tokio::sync::oneshot;

    /// Hands out queued responses; each load waits for its own trigger
    struct ScriptedLoader {
        pending: Mutex<VecDeque<oneshot::Receiver<Result<Vec<u32>>>>>,
    }

    impl ScriptedLoader {
        fn new(n: usize) -> (Arc<Self>, Vec<oneshot::Sender<Result<Vec<u32>>>>) {
            let mut senders = Vec::new();
            let mut receivers = VecDeque::new();
            for _ in 0..n {
                let (tx, rx) = oneshot::channel();
                senders.push(tx);
                receivers.push_back(rx);
            }
            (
                Arc::new(Self {
                    pending: Mutex::new(receivers),
                }),
                senders,
            )
        }
    }

    #[async_trait]
    impl Loader<u32> for ScriptedLoader {
        async fn load(&self) -> Result<Vec<u32>> {
            let rx = self.pending.lock().unwrap().pop_front().expect("unexpected load");
            rx.await.unwrap_or_else(|_| Err(Error::general("dropped")))
        }
    }

    struct Fixed(Vec<u32>);

    #[async_trait]
    impl Loader<u32> for Fixed {
        async fn load(&self) -> Result<Vec<u32>> {
            Ok(self.0.clone())
        }
    }

    #[tokio::test]
    async fn newer_response_wins_even_if_older_lands_last() {
        let (loader, mut senders) = ScriptedLoader::new(2);
        let store = Arc::new(ListStore::new(Collection::Artworks, loader));

        let first = tokio::spawn({
            let store = store.clone();
            async move { store.refresh().await }
        });
        tokio::time::sleep(Duration::from_millis(20)).await;
        let second = tokio::spawn({
            let store = store.clone();
            async move { store.refresh().await }
        });
        tokio::time::sleep(Duration::from_millis(20)).await;

        let older = senders.remove(0);
        let newer = senders.remove(0);
        newer.send(Ok(vec![2, 3])).unwrap();
        assert_eq!(second.await.unwrap(), RefreshOutcome::Applied);
        older.send(Ok(vec![1])).unwrap();
        assert_eq!(first.await.unwrap(), RefreshOutcome::Superseded);

        assert_eq!(store.items().await, vec![2, 3]);
        assert_eq!(store.phase().await, LoadPhase::Resolved);
    }

    #[tokio::test]
    async fn failure_keeps_last_good_collection() {
        let (loader, mut senders) = ScriptedLoader::new(2);
        let store = ListStore::new(Collection::Events, loader);

        senders.remove(0).send(Ok(vec![7, 8])).unwrap();
        assert_eq!(store.refresh().await, RefreshOutcome::Applied);

        senders
            .remove(0)
            .send(Err(Error::general("connection refused")))
            .unwrap();
        assert_eq!(store.refresh().await, RefreshOutcome::Failed);

        assert_eq!(store.items().await, vec![7, 8]);
        assert_eq!(store.phase().await, LoadPhase::Failed);
        assert_eq!(store.last_error().await.as_deref(), Some("connection refused"));
    }

    #[tokio::test]
    async fn responses_after_unmount_are_dropped() {
        let (loader, mut senders) = ScriptedLoader::new(1);
        let store = Arc::new(ListStore::new(Collection::Comments, loader));

        let inflight = tokio::spawn({
            let store = store.clone();
            async move { store.refresh().await }
        });
        tokio::time::sleep(Duration::from_millis(20)).await;
        store.unmount();
        senders.remove(0).send(Ok(vec![1, 2, 3])).unwrap();

        assert_eq!(inflight.await.unwrap(), RefreshOutcome::Unmounted);
        assert!(store.is_empty().await);
        assert_eq!(store.refresh().await, RefreshOutcome::Unmounted);
    }

    #[tokio::test]
    async fn unmount_while_state_is_read_still_aborts() {
        let (loader, mut senders) = ScriptedLoader::new(1);
        let store = Arc::new(ListStore::new(Collection::Artworks, loader));

        let inflight = tokio::spawn({
            let store = store.clone();
            async move { store.refresh().await }
        });
        tokio::time::sleep(Duration::from_millis(20)).await;
        {
            let _reader = store.state.read().await;
            store.unmount();
        }
        assert!(store.is_loading().await);

        senders.remove(0).send(Ok(vec![9])).unwrap();
        assert_eq!(inflight.await.unwrap(), RefreshOutcome::Unmounted);
        assert_eq!(store.phase().await, LoadPhase::Aborted);
        assert!(!store.is_loading().await);
    }

    #[tokio::test]
    async fn attached_store_refreshes_on_matching_invalidation() {
        let bus = InvalidationBus::new();
        let store = Arc::new(ListStore::new(
            Collection::Reservations,
            Arc::new(Fixed(vec![4, 5])),
        ));
        let mut changes = store.changes();
        let listener = store.attach(&bus);

        bus.invalidate(Collection::Events);
        bus.invalidate(Collection::Reservations);

        tokio::time::timeout(Duration::from_secs(2), changes.changed())
            .await
            .expect("store was not refreshed")
            .unwrap();
        assert_eq!(store.items().await, vec![4, 5]);

        store.unmount();
        tokio::time::timeout(Duration::from_secs(2), listener)
            .await
            .expect("listener did not stop")
            .unwrap();
    }
}
