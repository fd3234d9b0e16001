//! Schema cache.
//!
//! Schemas are fetched once per domain and reused by every session sharing the
//! cache. Entries do not expire: the remote schema is assumed stable for the
//! life of the process unless a caller invalidates it explicitly.

use crate::schema::ApiSchema;
use std::collections::HashMap;
use std::sync::{Arc, OnceLock};
use tokio::sync::RwLock;

/// Domain to schema map, cheap to clone and share.
#[derive(Debug, Clone, Default)]
pub struct SchemaCache {
    inner: Arc<RwLock<HashMap<String, Arc<ApiSchema>>>>,
}

impl SchemaCache {
    /// Create an empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// The process-wide cache used by sessions that are not given one.
    pub fn shared() -> Self {
        static SHARED: OnceLock<SchemaCache> = OnceLock::new();
        SHARED.get_or_init(SchemaCache::new).clone()
    }

    /// Get the cached schema for a domain.
    pub async fn get(&self, domain: &str) -> Option<Arc<ApiSchema>> {
        self.inner.read().await.get(domain).cloned()
    }

    /// Store a schema unless one is already cached, returning the cached one.
    ///
    /// Two sessions racing on an uncached domain both fetch; the first
    /// insert wins and both end up using it.
    pub async fn insert(&self, domain: &str, schema: ApiSchema) -> Arc<ApiSchema> {
        self.inner
            .write()
            .await
            .entry(domain.to_string())
            .or_insert_with(|| Arc::new(schema))
            .clone()
    }

    /// Drop the cached schema of a domain. Returns whether one was cached.
    pub async fn invalidate(&self, domain: &str) -> bool {
        self.inner.write().await.remove(domain).is_some()
    }

    /// Drop every cached schema.
    pub async fn clear(&self) {
        self.inner.write().await.clear();
    }

    /// Number of cached domains.
    pub async fn len(&self) -> usize {
        self.inner.read().await.len()
    }

    /// Whether nothing is cached.
    pub async fn is_empty(&self) -> bool {
        self.inner.read().await.is_empty()
    }
}
