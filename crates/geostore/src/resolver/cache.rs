use geostore_core::feature::Object;

use lru::LruCache;
use parking_lot::Mutex;
use std::{num::NonZeroUsize, sync::Arc};

/// Resolved objects by global id, evicting the least recently used entry
/// once `capacity` is reached.
#[derive(Debug)]
pub struct FeatureCache {
    inner: Mutex<LruCache<String, Arc<Object>>>,
}

impl FeatureCache {
    pub fn new(capacity: NonZeroUsize) -> Self {
        Self {
            inner: Mutex::new(LruCache::new(capacity)),
        }
    }

    /// Looks up an entry, marking it as recently used.
    pub fn get(&self, key: &str) -> Option<Arc<Object>> {
        self.inner.lock().get(key).cloned()
    }

    pub fn insert(&self, key: impl Into<String>, object: Arc<Object>) {
        self.inner.lock().put(key.into(), object);
    }

    pub fn remove(&self, key: &str) -> Option<Arc<Object>> {
        self.inner.lock().pop(key)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.inner.lock().contains(key)
    }

    pub fn len(&self) -> usize {
        self.inner.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn capacity(&self) -> usize {
        self.inner.lock().cap().get()
    }

    pub fn clear(&self) {
        self.inner.lock().clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn object(href: &str) -> Arc<Object> {
        Arc::new(Object::External {
            href: href.to_string(),
            bytes: vec![],
        })
    }

    #[test]
    fn evicts_least_recently_used() {
        let cache = FeatureCache::new(NonZeroUsize::new(2).unwrap());
        cache.insert("a", object("a"));
        cache.insert("b", object("b"));

        // Touch `a` so that `b` is the eviction candidate
        assert!(cache.get("a").is_some());
        cache.insert("c", object("c"));

        assert_eq!(cache.len(), 2);
        assert!(cache.contains("a"));
        assert!(!cache.contains("b"));
        assert!(cache.contains("c"));
    }

    #[test]
    fn remove_returns_the_entry() {
        let cache = FeatureCache::new(NonZeroUsize::new(4).unwrap());
        cache.insert("a", object("a"));
        assert_eq!(cache.remove("a"), Some(object("a")));
        assert!(cache.is_empty());
        assert_eq!(cache.remove("a"), None);
    }
}
