use futures::stream::{self, StreamExt, TryStreamExt};
use std::sync::Arc;
use crate::core::labels::CategoryCatalog;
use crate::models::{Category, Profile, ProfileSnapshot};
use crate::services::cache::{CacheError, CacheKey, CacheManager};
use crate::services::store::{ProfileStore, StoreError};

/// Materialises profile snapshots before any scoring happens
///
/// Snapshots and the category table go through the cache when one is
/// attached. Cache failures are logged and fall through to the store.
#[derive(Clone)]
pub struct SnapshotLoader {
    store: Arc<dyn ProfileStore>,
    cache: Option<Arc<CacheManager>>,
    concurrency: usize,
}

impl SnapshotLoader {
    pub fn new(store: Arc<dyn ProfileStore>, cache: Option<Arc<CacheManager>>, concurrency: usize) -> Self {
        Self {
            store,
            cache,
            concurrency: concurrency.max(1),
        }
    }

    pub fn store(&self) -> &Arc<dyn ProfileStore> {
        &self.store
    }

    /// Load the category lookup table
    pub async fn catalog(&self) -> Result<CategoryCatalog, StoreError> {
        let key = CacheKey::categories();

        if let Some(categories) = self.cached::<Vec<Category>>(&key).await {
            return Ok(CategoryCatalog::new(categories));
        }

        let categories = self.store.categories().await?;
        self.remember(&key, &categories).await;

        Ok(CategoryCatalog::new(categories))
    }

    /// Load one profile's offerings and wants
    pub async fn load(&self, profile: Profile, catalog: &CategoryCatalog) -> Result<ProfileSnapshot, StoreError> {
        let key = CacheKey::snapshot(&profile.id);

        if let Some(snapshot) = self.cached::<ProfileSnapshot>(&key).await {
            if snapshot.profile == profile {
                return Ok(snapshot);
            }
        }

        let (offerings, wants) = tokio::try_join!(
            self.store.offerings(&profile.id),
            self.store.wants(&profile.id)
        )?;

        let snapshot = ProfileSnapshot {
            offerings: catalog.resolve_all(&offerings),
            wants: catalog.resolve_all(&wants),
            profile,
        };

        self.remember(&key, &snapshot).await;

        Ok(snapshot)
    }

    /// Load many snapshots with bounded concurrency, keeping input order
    pub async fn load_many(
        &self,
        profiles: Vec<Profile>,
        catalog: &CategoryCatalog,
    ) -> Result<Vec<ProfileSnapshot>, StoreError> {
        stream::iter(profiles)
            .map(|profile| self.load(profile, catalog))
            .buffered(self.concurrency)
            .try_collect()
            .await
    }

    async fn cached<T>(&self, key: &str) -> Option<T>
    where
        T: for<'de> serde::Deserialize<'de>,
    {
        let cache = self.cache.as_ref()?;
        match cache.get(key).await {
            Ok(value) => Some(value),
            Err(CacheError::CacheMiss(_)) => None,
            Err(e) => {
                tracing::warn!("Cache read failed for {}: {}", key, e);
                // Undecodable entries are evicted so the store copy replaces them
                if matches!(e, CacheError::SerializationError(_)) {
                    if let Err(e) = cache.delete(key).await {
                        tracing::warn!("Cache eviction failed for {}: {}", key, e);
                    }
                }
                None
            }
        }
    }

    async fn remember<T: serde::Serialize>(&self, key: &str, value: &T) {
        if let Some(cache) = &self.cache {
            if let Err(e) = cache.set(key, value).await {
                tracing::warn!("Cache write failed for {}: {}", key, e);
            }
        }
    }
}
