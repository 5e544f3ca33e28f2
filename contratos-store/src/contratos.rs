//! Contract list queries over the [`QueryCache`].

use std::sync::Arc;

use async_trait::async_trait;
use contratos_core::{ContratosResponse, FilterSet};
use contratos_fetch::ContratosApi;
use tokio::sync::watch;
use tracing::{debug, instrument};

use crate::query_cache::{Begin, Collection, Invalidate, QueryCache, QueryKey, QuerySnapshot};

/// Snapshot of a contract list query.
pub type ContratosSnapshot = QuerySnapshot<ContratosResponse>;

/// Fetches contract pages through the cache.
pub struct ContratosQuery {
    cache: QueryCache<ContratosResponse>,
    api: Arc<dyn ContratosApi>,
}

impl ContratosQuery {
    /// Creates a query layer over `api` with an empty cache.
    pub fn new(api: Arc<dyn ContratosApi>) -> Self {
        Self {
            cache: QueryCache::new(),
            api,
        }
    }

    /// Shows the page for `filters`, fetching it if needed.
    ///
    /// Fresh cached data is returned without a request, and a caller that
    /// finds a request for the same key in flight waits for it instead of
    /// sending another. The returned snapshot is the state of `filters`'
    /// key; [`ContratosQuery::displayed`] is the state of the key most
    /// recently asked for. Once another key has been asked for, an outdated
    /// response for this one is not retried.
    #[instrument(skip(self, filters), fields(page = filters.page()))]
    pub async fn fetch_page(&self, filters: &FilterSet) -> ContratosSnapshot {
        let key = QueryKey::new(Collection::Contratos, filters);
        self.cache.activate(&key).await;

        loop {
            let mut rx = self.cache.subscribe();
            match self.cache.begin(&key).await {
                Begin::Fresh(snapshot) | Begin::Inactive(snapshot) => return snapshot,
                Begin::Started(ticket) => {
                    let result = self.api.list_contratos(filters).await;
                    if self.cache.resolve(ticket, result).await {
                        return self.cache.snapshot(&key).await;
                    }
                    debug!(key = %key, "Response outdated");
                }
                Begin::InFlight => {
                    if rx.changed().await.is_err() {
                        return self.cache.snapshot(&key).await;
                    }
                }
            }
        }
    }

    /// State of the most recently requested key.
    pub async fn displayed(&self) -> ContratosSnapshot {
        self.cache.displayed().await
    }

    /// Subscribes to cache changes.
    pub fn subscribe(&self) -> watch::Receiver<u64> {
        self.cache.subscribe()
    }

    /// Underlying cache.
    pub fn cache(&self) -> &QueryCache<ContratosResponse> {
        &self.cache
    }
}

#[async_trait]
impl Invalidate for ContratosQuery {
    async fn invalidate(&self, collection: Collection) {
        self.cache.invalidate(collection).await;
    }
}
