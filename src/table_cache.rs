use crate::errors::AppError;
use crate::loader::TableLoader;
use crate::models::RecordTable;
use moka::future::Cache;
use std::sync::Arc;
use std::time::Duration;

const TABLE_KEY: &str = "dataset";

/// Holds the loaded dataset snapshot.
///
/// Concurrent requests for a missing or expired snapshot share a single load. Requests
/// always get a complete `Arc<RecordTable>`; a reload never mutates one in place.
pub struct TableCache {
    cache: Cache<&'static str, Arc<RecordTable>>,
    loader: Arc<TableLoader>,
}

impl TableCache {
    pub fn new(loader: TableLoader, ttl: Option<Duration>) -> Self {
        let builder = Cache::<&'static str, Arc<RecordTable>>::builder();
        let cache = match ttl {
            Some(ttl) => builder.time_to_live(ttl).build(),
            None => builder.build(),
        };
        Self {
            cache,
            loader: Arc::new(loader),
        }
    }

    /// Cache pre-filled with an already built table that never expires.
    pub async fn preloaded(loader: TableLoader, table: RecordTable) -> Self {
        let cache = Self::new(loader, None);
        cache.cache.insert(TABLE_KEY, Arc::new(table)).await;
        cache
    }

    /// Current snapshot, loading it first when absent or expired.
    pub async fn table(&self) -> Result<Arc<RecordTable>, AppError> {
        let loader = Arc::clone(&self.loader);
        self.cache
            .try_get_with(TABLE_KEY, async move { loader.load().await.map(Arc::new) })
            .await
            .map_err(|e: Arc<AppError>| (*e).clone())
    }

    /// Drop the snapshot so the next request reloads it.
    pub async fn invalidate(&self) {
        tracing::info!("Invalidating dataset snapshot from {}", self.loader.describe());
        self.cache.invalidate(TABLE_KEY).await;
    }
}
