//! Cache-backed fetching with fallback to the last good snapshot
//!
//! A [`CachedFetcher`] wraps one remote [`DataSource`] and one key in the
//! [`KeyValueStore`]. Every [`CachedFetcher::load`] publishes the stored
//! snapshot first, then asks the network, and only replaces (and re-persists)
//! the displayed value when the network returns something non-empty. Failures
//! and empty results leave the displayed value alone and set a status the UI
//! can show.
//!
//! Loads are independent: two concurrent loads of the same kind both hit the
//! network, and by default whichever succeeds last wins. With
//! [`ResultOrdering::LastIssued`] a result from an older load that finishes
//! after a newer one has been applied is dropped instead.

use async_trait::async_trait;
use serde::{de::DeserializeOwned, Serialize};
use std::fmt;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use tokio::sync::watch;
use tracing::{debug, warn};

use crate::store::{self, KeyValueStore, NEWS_SNAPSHOT_KEY, WEATHER_SNAPSHOT_KEY};

/// The kinds of data the application fetches
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DataKind {
    News,
    Weather,
}

impl DataKind {
    /// Store key for this kind's snapshot
    pub fn snapshot_key(self) -> &'static str {
        match self {
            DataKind::News => NEWS_SNAPSHOT_KEY,
            DataKind::Weather => WEATHER_SNAPSHOT_KEY,
        }
    }

    fn no_results_message(self) -> &'static str {
        match self {
            DataKind::News => {
                "No news articles found. Try different search terms or pull to refresh."
            }
            // Unreachable while `WeatherClient::is_empty` is always false
            DataKind::Weather => "No weather data available for this location.",
        }
    }

    fn failure_message(self) -> &'static str {
        match self {
            DataKind::News => "Failed to fetch news. Showing cached articles.",
            DataKind::Weather => "Weather fetch failed. Showing last known conditions.",
        }
    }
}

impl fmt::Display for DataKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DataKind::News => write!(f, "news"),
            DataKind::Weather => write!(f, "weather"),
        }
    }
}

/// Outcome of the most recent load, as shown to the user
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FetchStatus {
    /// Nothing has completed yet
    #[default]
    Idle,
    /// The displayed value came from the network on the last load
    Fresh,
    /// The network answered but had nothing; the previous value is kept
    NoResults,
    /// The network request failed; the previous value is kept
    Failed,
}

/// Which completed result is allowed to replace the displayed value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ResultOrdering {
    /// Any successful result is applied when it arrives
    #[default]
    LastCompleted,
    /// A result is applied only if no newer load has already been applied
    LastIssued,
}

/// What a fetcher currently has to show
#[derive(Debug, Clone, PartialEq)]
pub struct Snapshot<T> {
    pub kind: DataKind,
    /// Displayed value: fresh, cached, or from an earlier success
    pub value: Option<T>,
    pub status: FetchStatus,
    /// A network request is in flight
    pub loading: bool,
}

impl<T> Snapshot<T> {
    fn empty(kind: DataKind) -> Self {
        Self {
            kind,
            value: None,
            status: FetchStatus::Idle,
            loading: false,
        }
    }

    /// User-visible banner text for the current status, if any
    pub fn message(&self) -> Option<&'static str> {
        match self.status {
            FetchStatus::NoResults => Some(self.kind.no_results_message()),
            FetchStatus::Failed => Some(self.kind.failure_message()),
            FetchStatus::Idle | FetchStatus::Fresh => None,
        }
    }
}

/// A remote endpoint that produces one kind of data
#[async_trait]
pub trait DataSource: Send + Sync {
    /// Request parameters
    type Params: Send + Sync;
    /// Value produced on success; persisted verbatim as the snapshot
    type Value: Serialize + DeserializeOwned + Clone + Send + Sync;
    type Error: std::error::Error + Send + Sync;

    fn kind(&self) -> DataKind;

    /// Whether a successful response carries nothing worth displaying
    fn is_empty(value: &Self::Value) -> bool;

    async fn fetch(&self, params: &Self::Params) -> Result<Self::Value, Self::Error>;
}

/// Orchestrates read cache → request network → reconcile → persist for one kind
pub struct CachedFetcher<D: DataSource, S> {
    source: D,
    store: S,
    /// Whether snapshots are read and written at all
    persist: bool,
    ordering: ResultOrdering,
    issued: AtomicU64,
    applied: AtomicU64,
    in_flight: AtomicUsize,
    state: watch::Sender<Snapshot<D::Value>>,
}

impl<D, S> CachedFetcher<D, S>
where
    D: DataSource,
    S: KeyValueStore,
{
    pub fn new(source: D, store: S) -> Self {
        let (state, _) = watch::channel(Snapshot::empty(source.kind()));
        Self {
            source,
            store,
            persist: true,
            ordering: ResultOrdering::default(),
            issued: AtomicU64::new(0),
            applied: AtomicU64::new(0),
            in_flight: AtomicUsize::new(0),
            state,
        }
    }

    /// Disables snapshot persistence for this kind
    pub fn without_persistence(mut self) -> Self {
        self.persist = false;
        self
    }

    pub fn with_ordering(mut self, ordering: ResultOrdering) -> Self {
        self.ordering = ordering;
        self
    }

    pub fn kind(&self) -> DataKind {
        self.source.kind()
    }

    pub fn source(&self) -> &D {
        &self.source
    }

    /// Current state without waiting
    pub fn current(&self) -> Snapshot<D::Value> {
        self.state.borrow().clone()
    }

    /// Watches state changes, including the stale value published at the start of a load
    pub fn subscribe(&self) -> watch::Receiver<Snapshot<D::Value>> {
        self.state.subscribe()
    }

    /// Reads the persisted snapshot, if any
    pub async fn cached(&self) -> Option<D::Value> {
        if !self.persist {
            return None;
        }
        store::read_json(&self.store, self.kind().snapshot_key()).await
    }

    /// Publishes the persisted snapshot without touching the network
    ///
    /// Used on cold start so something is displayed before the first load.
    pub async fn restore(&self) -> Snapshot<D::Value> {
        if let Some(cached) = self.cached().await {
            self.state.send_if_modified(|s| {
                let empty = s.value.is_none();
                if empty {
                    s.value = Some(cached);
                }
                empty
            });
        }
        self.current()
    }

    /// Loads the freshest available value, degrading to the cached one
    pub async fn load(&self, params: &D::Params) -> Snapshot<D::Value> {
        let kind = self.kind();
        let seq = self.issued.fetch_add(1, Ordering::SeqCst) + 1;

        self.in_flight.fetch_add(1, Ordering::SeqCst);
        self.state.send_modify(|s| s.loading = true);

        // The stored snapshot only fills an empty display; it never replaces a value already shown
        let showing = self.state.borrow().value.is_some();
        if !showing {
            if let Some(cached) = self.cached().await {
                debug!(%kind, "showing cached snapshot while fetching");
                self.state.send_if_modified(|s| {
                    if s.value.is_none() {
                        s.value = Some(cached);
                        true
                    } else {
                        false
                    }
                });
            }
        }

        match self.source.fetch(params).await {
            Ok(value) if !D::is_empty(&value) => {
                if self.claim(seq) {
                    self.state.send_modify(|s| {
                        s.value = Some(value.clone());
                        s.status = FetchStatus::Fresh;
                    });
                    if self.persist {
                        if let Err(err) =
                            store::write_json(&self.store, kind.snapshot_key(), &value).await
                        {
                            warn!(%kind, error = %err, "failed to persist snapshot");
                        }
                    }
                } else {
                    debug!(%kind, seq, "discarding result superseded by a newer load");
                }
            }
            Ok(_) => {
                debug!(%kind, "fetch returned no results");
                self.state.send_modify(|s| s.status = FetchStatus::NoResults);
            }
            Err(err) => {
                warn!(%kind, error = %err, "fetch failed, keeping previous value");
                self.state.send_modify(|s| s.status = FetchStatus::Failed);
            }
        }

        let remaining = self.in_flight.fetch_sub(1, Ordering::SeqCst) - 1;
        self.state.send_modify(|s| s.loading = remaining > 0);
        self.current()
    }

    /// Decides whether the result of load `seq` may be applied
    fn claim(&self, seq: u64) -> bool {
        let newest_applied = self.applied.fetch_max(seq, Ordering::SeqCst);
        match self.ordering {
            ResultOrdering::LastCompleted => true,
            ResultOrdering::LastIssued => newest_applied < seq,
        }
    }
}
