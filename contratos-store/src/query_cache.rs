//! Keyed response cache.
//!
//! Entries are addressed by a [`QueryKey`]: a collection plus the sorted,
//! non-empty request parameters. Each entry carries a generation number.
//! A request records the generation when it starts, and its response is
//! committed only if the generation is unchanged when it resolves.
//! Invalidation bumps the generation, so responses that were in flight at
//! that moment are dropped.
//!
//! One key is active at a time, set by [`QueryCache::activate`].
//! [`QueryCache::displayed`] reads the active key only, so a late response
//! for an abandoned key lands in its own entry and never replaces what is
//! displayed. Requests are only started for the active key.

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use contratos_core::FilterSet;
use contratos_fetch::FetchError;
use tokio::sync::{RwLock, watch};
use tracing::debug;

// ============================================================================
// Keys
// ============================================================================

/// Cached collections.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Collection {
    /// `GET /contratos`.
    Contratos,
}

impl std::fmt::Display for Collection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Collection::Contratos => write!(f, "contratos"),
        }
    }
}

/// Cache key: collection plus sorted request parameters.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct QueryKey {
    /// Collection the key belongs to.
    pub collection: Collection,
    /// Non-empty parameters, sorted by name.
    pub params: BTreeMap<String, String>,
}

impl QueryKey {
    /// Builds the key for a filter set.
    pub fn new(collection: Collection, filters: &FilterSet) -> Self {
        let params = filters
            .params()
            .into_iter()
            .map(|(k, v)| (k.to_string(), v))
            .collect();
        Self { collection, params }
    }
}

impl std::fmt::Display for QueryKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.collection)?;
        for (i, (k, v)) in self.params.iter().enumerate() {
            let sep = if i == 0 { '?' } else { '&' };
            write!(f, "{sep}{k}={v}")?;
        }
        Ok(())
    }
}

// ============================================================================
// Entries
// ============================================================================

/// Cached state of one key.
#[derive(Debug)]
struct CacheEntry<T> {
    data: Option<Arc<T>>,
    error: Option<FetchError>,
    is_fetching: bool,
    stale: bool,
    generation: u64,
    updated_at: Option<DateTime<Utc>>,
}

impl<T> Default for CacheEntry<T> {
    fn default() -> Self {
        Self {
            data: None,
            error: None,
            is_fetching: false,
            stale: false,
            generation: 0,
            updated_at: None,
        }
    }
}

impl<T> CacheEntry<T> {
    /// Data present, not stale, and the last fetch succeeded.
    fn is_fresh(&self) -> bool {
        self.data.is_some() && !self.stale && self.error.is_none()
    }

    fn snapshot(&self) -> QuerySnapshot<T> {
        QuerySnapshot {
            data: self.data.clone(),
            is_loading: self.is_fetching && self.data.is_none(),
            is_fetching: self.is_fetching,
            is_error: self.error.is_some(),
            error: self.error.clone(),
            updated_at: self.updated_at,
        }
    }
}

/// Observable state of a query.
#[derive(Debug)]
pub struct QuerySnapshot<T> {
    /// Last successfully fetched data. Kept while refetching and after errors.
    pub data: Option<Arc<T>>,
    /// A request is in flight and there is no data yet.
    pub is_loading: bool,
    /// A request is in flight.
    pub is_fetching: bool,
    /// The last request failed.
    pub is_error: bool,
    /// Error of the last request.
    pub error: Option<FetchError>,
    /// When the data was last committed.
    pub updated_at: Option<DateTime<Utc>>,
}

impl<T> Clone for QuerySnapshot<T> {
    fn clone(&self) -> Self {
        Self {
            data: self.data.clone(),
            is_loading: self.is_loading,
            is_fetching: self.is_fetching,
            is_error: self.is_error,
            error: self.error.clone(),
            updated_at: self.updated_at,
        }
    }
}

impl<T> Default for QuerySnapshot<T> {
    fn default() -> Self {
        CacheEntry::default().snapshot()
    }
}

/// Permission to commit one response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchTicket {
    key: QueryKey,
    generation: u64,
}

impl FetchTicket {
    /// Key the request was issued for.
    pub fn key(&self) -> &QueryKey {
        &self.key
    }
}

/// Outcome of [`QueryCache::begin`].
#[derive(Debug)]
pub enum Begin<T> {
    /// Cached data is fresh; no request needed.
    Fresh(QuerySnapshot<T>),
    /// The caller must issue the request and resolve the ticket.
    Started(FetchTicket),
    /// A request for this key is already in flight.
    InFlight,
    /// The key needs a request but is no longer active; none was started.
    Inactive(QuerySnapshot<T>),
}

// ============================================================================
// Cache
// ============================================================================

/// Maximum number of cached keys.
///
/// Past this, inserting a new key evicts the least recently updated entry
/// that is neither active nor fetching.
pub const MAX_ENTRIES: usize = 64;

struct CacheInner<T> {
    entries: HashMap<QueryKey, CacheEntry<T>>,
    active: Option<QueryKey>,
}

impl<T> CacheInner<T> {
    /// Drops one idle entry if the map is full.
    fn make_room(&mut self) {
        if self.entries.len() < MAX_ENTRIES {
            return;
        }
        let victim = self
            .entries
            .iter()
            .filter(|(key, entry)| !entry.is_fetching && self.active.as_ref() != Some(*key))
            .min_by_key(|(_, entry)| entry.updated_at)
            .map(|(key, _)| key.clone());
        if let Some(key) = victim {
            debug!(key = %key, "Evicting cache entry");
            self.entries.remove(&key);
        }
    }
}

/// Keyed query cache with change notifications.
///
/// Holds at most [`MAX_ENTRIES`] keys, plus any that are active or fetching
/// when the limit is reached.
pub struct QueryCache<T> {
    inner: Arc<RwLock<CacheInner<T>>>,
    notify: watch::Sender<u64>,
}

impl<T> Default for QueryCache<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> QueryCache<T> {
    /// Creates an empty cache.
    pub fn new() -> Self {
        let (notify, _) = watch::channel(0);
        Self {
            inner: Arc::new(RwLock::new(CacheInner {
                entries: HashMap::new(),
                active: None,
            })),
            notify,
        }
    }

    /// Subscribes to cache changes.
    pub fn subscribe(&self) -> watch::Receiver<u64> {
        self.notify.subscribe()
    }

    fn notify_change(&self) {
        self.notify.send_modify(|version| *version += 1);
    }

    /// Makes `key` the displayed key.
    pub async fn activate(&self, key: &QueryKey) {
        let switched = {
            let mut inner = self.inner.write().await;
            if inner.active.as_ref() == Some(key) {
                false
            } else {
                inner.active = Some(key.clone());
                true
            }
        };
        if switched {
            debug!(key = %key, "Active key changed");
            self.notify_change();
        }
    }

    /// Decides whether a request for `key` is needed. Leaves the active key
    /// unchanged.
    ///
    /// At most one request per key is in flight: the first caller gets
    /// [`Begin::Started`], later callers get [`Begin::InFlight`] until the
    /// ticket is resolved or the key is invalidated. A request is only
    /// started for the active key; any other key that needs one yields
    /// [`Begin::Inactive`] with its current state.
    pub async fn begin(&self, key: &QueryKey) -> Begin<T> {
        let begin = {
            let mut inner = self.inner.write().await;
            let is_active = inner.active.as_ref() == Some(key);
            if !inner.entries.contains_key(key) {
                inner.make_room();
            }
            let entry = inner.entries.entry(key.clone()).or_default();

            if entry.is_fetching {
                debug!(key = %key, "Joining in-flight request");
                Begin::InFlight
            } else if entry.is_fresh() {
                debug!(key = %key, "Serving cached page");
                Begin::Fresh(entry.snapshot())
            } else if !is_active {
                debug!(key = %key, "Key no longer active, not fetching");
                Begin::Inactive(entry.snapshot())
            } else {
                entry.is_fetching = true;
                debug!(key = %key, generation = entry.generation, stale = entry.stale, "Starting request");
                Begin::Started(FetchTicket {
                    key: key.clone(),
                    generation: entry.generation,
                })
            }
        };
        if matches!(begin, Begin::Started(_)) {
            self.notify_change();
        }
        begin
    }

    /// Commits a response if its ticket is still current.
    ///
    /// Returns `false` when the entry was invalidated since the request
    /// started; the response is dropped.
    pub async fn resolve(&self, ticket: FetchTicket, result: Result<T, FetchError>) -> bool {
        let committed = {
            let mut inner = self.inner.write().await;
            let Some(entry) = inner.entries.get_mut(&ticket.key) else {
                debug!(key = %ticket.key, "Discarding response for evicted key");
                return false;
            };

            if entry.generation == ticket.generation {
                entry.is_fetching = false;
                match result {
                    Ok(data) => {
                        entry.data = Some(Arc::new(data));
                        entry.error = None;
                        entry.stale = false;
                        entry.updated_at = Some(Utc::now());
                    }
                    Err(e) => {
                        debug!(key = %ticket.key, error = %e, "Request failed");
                        entry.error = Some(e);
                    }
                }
                true
            } else {
                debug!(
                    key = %ticket.key,
                    issued = ticket.generation,
                    current = entry.generation,
                    "Discarding outdated response"
                );
                false
            }
        };
        if committed {
            self.notify_change();
        }
        committed
    }

    /// Marks every entry of `collection` stale and drops in-flight tickets.
    ///
    /// Data stays visible until the refetch commits.
    pub async fn invalidate(&self, collection: Collection) {
        let count = {
            let mut inner = self.inner.write().await;
            let mut count = 0usize;
            for (key, entry) in &mut inner.entries {
                if key.collection == collection {
                    entry.stale = true;
                    entry.is_fetching = false;
                    entry.generation += 1;
                    count += 1;
                }
            }
            count
        };
        debug!(collection = %collection, entries = count, "Invalidated");
        self.notify_change();
    }

    /// State of `key`.
    pub async fn snapshot(&self, key: &QueryKey) -> QuerySnapshot<T> {
        self.inner
            .read()
            .await
            .entries
            .get(key)
            .map(CacheEntry::snapshot)
            .unwrap_or_default()
    }

    /// State of the active key.
    pub async fn displayed(&self) -> QuerySnapshot<T> {
        let inner = self.inner.read().await;
        inner
            .active
            .as_ref()
            .and_then(|key| inner.entries.get(key))
            .map(CacheEntry::snapshot)
            .unwrap_or_default()
    }

    /// The active key, if any.
    pub async fn active_key(&self) -> Option<QueryKey> {
        self.inner.read().await.active.clone()
    }

    /// Number of cached keys.
    pub async fn entry_count(&self) -> usize {
        self.inner.read().await.entries.len()
    }

    /// Returns true if `key` has stale data.
    pub async fn is_stale(&self, key: &QueryKey) -> bool {
        self.inner
            .read()
            .await
            .entries
            .get(key)
            .is_some_and(|e| e.stale)
    }
}

// ============================================================================
// Invalidation Contract
// ============================================================================

/// Receives invalidation after a successful mutation.
#[async_trait]
pub trait Invalidate: Send + Sync {
    /// Marks cached data of `collection` as stale.
    async fn invalidate(&self, collection: Collection);
}

#[async_trait]
impl<T: Send + Sync> Invalidate for QueryCache<T> {
    async fn invalidate(&self, collection: Collection) {
        QueryCache::invalidate(self, collection).await;
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use contratos_core::FilterField;

    use super::*;

    fn key(page: u32) -> QueryKey {
        let mut filters = FilterSet::with_defaults();
        filters.set_page(page);
        QueryKey::new(Collection::Contratos, &filters)
    }

    async fn start(cache: &QueryCache<u32>, page: u32) -> FetchTicket {
        cache.activate(&key(page)).await;
        started(cache.begin(&key(page)).await)
    }

    fn started(begin: Begin<u32>) -> FetchTicket {
        match begin {
            Begin::Started(ticket) => ticket,
            other => panic!("expected Started, got {other:?}"),
        }
    }

    #[test]
    fn test_key_ignores_construction_order() {
        let a = FilterSet::new()
            .with(FilterField::Status, "ATIVO")
            .unwrap()
            .with(FilterField::NomeCliente, "Ana")
            .unwrap();
        let b = FilterSet::new()
            .with(FilterField::NomeCliente, "Ana")
            .unwrap()
            .with(FilterField::Status, "ATIVO")
            .unwrap();
        assert_eq!(
            QueryKey::new(Collection::Contratos, &a),
            QueryKey::new(Collection::Contratos, &b)
        );
    }

    #[test]
    fn test_key_skips_empty_values() {
        let filters = FilterSet::with_defaults()
            .with(FilterField::NomeCliente, "")
            .unwrap();
        let key = QueryKey::new(Collection::Contratos, &filters);
        assert!(!key.params.contains_key("nome_cliente"));
        assert_eq!(key.to_string(), "contratos?limit=20&page=1");
    }

    #[tokio::test]
    async fn test_begin_then_fresh() {
        let cache = QueryCache::<u32>::new();
        let ticket = start(&cache, 1).await;

        assert!(matches!(cache.begin(&key(1)).await, Begin::InFlight));
        assert!(cache.displayed().await.is_loading);

        assert!(cache.resolve(ticket, Ok(7)).await);
        match cache.begin(&key(1)).await {
            Begin::Fresh(snapshot) => assert_eq!(snapshot.data.as_deref(), Some(&7)),
            other => panic!("expected Fresh, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_late_response_for_other_key_is_not_displayed() {
        let cache = QueryCache::<u32>::new();
        let k1 = start(&cache, 1).await;
        let k2 = start(&cache, 2).await;

        assert!(cache.resolve(k2, Ok(2)).await);
        assert!(cache.resolve(k1, Ok(1)).await);

        assert_eq!(cache.active_key().await, Some(key(2)));
        assert_eq!(cache.displayed().await.data.as_deref(), Some(&2));
        assert_eq!(cache.snapshot(&key(1)).await.data.as_deref(), Some(&1));
    }

    #[tokio::test]
    async fn test_invalidate_drops_in_flight_response() {
        let cache = QueryCache::<u32>::new();
        let ticket = start(&cache, 1).await;

        cache.invalidate(Collection::Contratos).await;
        assert!(!cache.resolve(ticket, Ok(1)).await);
        assert!(cache.displayed().await.data.is_none());

        let ticket = start(&cache, 1).await;
        assert!(cache.resolve(ticket, Ok(2)).await);
        assert_eq!(cache.displayed().await.data.as_deref(), Some(&2));
    }

    #[tokio::test]
    async fn test_invalidate_keeps_data_visible() {
        let cache = QueryCache::<u32>::new();
        let ticket = start(&cache, 1).await;
        cache.resolve(ticket, Ok(10)).await;

        cache.invalidate(Collection::Contratos).await;
        assert!(cache.is_stale(&key(1)).await);

        let _ticket = start(&cache, 1).await;
        let shown = cache.displayed().await;
        assert_eq!(shown.data.as_deref(), Some(&10));
        assert!(shown.is_fetching);
        assert!(!shown.is_loading);
    }

    #[tokio::test]
    async fn test_error_keeps_previous_data_and_refetches() {
        let cache = QueryCache::<u32>::new();
        let ticket = start(&cache, 1).await;
        cache.resolve(ticket, Ok(3)).await;
        cache.invalidate(Collection::Contratos).await;

        let ticket = start(&cache, 1).await;
        cache
            .resolve(ticket, Err(FetchError::Network("down".into())))
            .await;

        let shown = cache.displayed().await;
        assert!(shown.is_error);
        assert_eq!(shown.data.as_deref(), Some(&3));

        assert!(matches!(cache.begin(&key(1)).await, Begin::Started(_)));
    }

    #[tokio::test]
    async fn test_changes_are_published() {
        let cache = QueryCache::<u32>::new();
        let mut rx = cache.subscribe();

        let ticket = start(&cache, 1).await;
        assert!(rx.has_changed().unwrap());
        rx.borrow_and_update();

        cache.resolve(ticket, Ok(1)).await;
        assert!(rx.has_changed().unwrap());
    }

    #[tokio::test]
    async fn test_begin_leaves_active_key_alone() {
        let cache = QueryCache::<u32>::new();
        let ticket = start(&cache, 1).await;
        assert!(matches!(cache.begin(&key(1)).await, Begin::InFlight));

        cache.activate(&key(2)).await;
        assert!(matches!(cache.begin(&key(1)).await, Begin::InFlight));
        assert_eq!(cache.active_key().await, Some(key(2)));

        assert!(cache.resolve(ticket, Ok(1)).await);
        assert!(matches!(cache.begin(&key(1)).await, Begin::Fresh(_)));
        assert_eq!(cache.active_key().await, Some(key(2)));
    }

    #[tokio::test]
    async fn test_inactive_key_is_not_refetched() {
        let cache = QueryCache::<u32>::new();
        let ticket = start(&cache, 1).await;
        cache.activate(&key(2)).await;

        cache.invalidate(Collection::Contratos).await;
        assert!(!cache.resolve(ticket, Ok(1)).await);

        match cache.begin(&key(1)).await {
            Begin::Inactive(snapshot) => assert!(snapshot.data.is_none()),
            other => panic!("expected Inactive, got {other:?}"),
        }
        assert!(matches!(cache.begin(&key(2)).await, Begin::Started(_)));
    }

    #[tokio::test]
    async fn test_activation_is_published_once() {
        let cache = QueryCache::<u32>::new();
        let mut rx = cache.subscribe();

        cache.activate(&key(1)).await;
        assert_eq!(*rx.borrow_and_update(), 1);

        cache.activate(&key(1)).await;
        assert!(!rx.has_changed().unwrap());

        cache.invalidate(Collection::Contratos).await;
        assert_eq!(*rx.borrow_and_update(), 2);
    }

    #[tokio::test]
    async fn test_entry_count_is_capped() {
        let cache = QueryCache::<u32>::new();
        let pinned = start(&cache, 1).await;

        for page in 2..=(MAX_ENTRIES as u32 + 10) {
            let ticket = start(&cache, page).await;
            cache.resolve(ticket, Ok(page)).await;
        }
        assert!(cache.entry_count().await <= MAX_ENTRIES);

        let last = MAX_ENTRIES as u32 + 10;
        assert_eq!(cache.displayed().await.data.as_deref(), Some(&last));
        assert!(cache.snapshot(&key(2)).await.data.is_none());

        assert!(cache.resolve(pinned, Ok(1)).await);
        assert_eq!(cache.snapshot(&key(1)).await.data.as_deref(), Some(&1));
    }
}
