use ahash::AHashMap as HashMap;
use parking_lot::RwLock;
use std::sync::Arc;

/// Last-known remote state of one resource kind, keyed by identifier.
///
/// Written only by the owning clients' confirmed mutations and the initial
/// synchronization, so it never diverges from a write this process
/// performed. It may lag writes from other controllers until the next full
/// synchronization. A miss is a valid "unknown" result.
pub trait Cache<T>: Send + Sync {
    fn get(&self, id: &str) -> Option<Arc<T>>;
    fn insert(&self, id: &str, value: T);
    fn delete(&self, id: &str);
    fn list(&self) -> Vec<Arc<T>>;
}

/// Lock-guarded map cache, safe for any number of concurrent callers.
#[derive(Debug)]
pub struct MemoryCache<T>(RwLock<HashMap<String, Arc<T>>>);

impl<T> Default for MemoryCache<T> {
    fn default() -> Self {
        Self(RwLock::new(HashMap::default()))
    }
}

impl<T: Send + Sync> Cache<T> for MemoryCache<T> {
    fn get(&self, id: &str) -> Option<Arc<T>> {
        self.0.read().get(id).cloned()
    }

    fn insert(&self, id: &str, value: T) {
        self.0.write().insert(id.to_string(), Arc::new(value));
    }

    fn delete(&self, id: &str) {
        self.0.write().remove(id);
    }

    fn list(&self) -> Vec<Arc<T>> {
        self.0.read().values().cloned().collect()
    }
}

/// Cache that remembers nothing, for call sites that do not need caching
/// semantics. Lookups always miss and listings are always empty.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoopCache;

impl<T: Send + Sync> Cache<T> for NoopCache {
    fn get(&self, _id: &str) -> Option<Arc<T>> {
        None
    }

    fn insert(&self, _id: &str, _value: T) {}

    fn delete(&self, _id: &str) {}

    fn list(&self) -> Vec<Arc<T>> {
        Vec::new()
    }
}
