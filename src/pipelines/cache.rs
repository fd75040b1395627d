use crate::error::Result;
use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, Weak};

/// Options that select a model checkpoint, usable as a cache key.
pub trait ModelOptions {
    /// Stable identifier for the checkpoint these options select.
    fn cache_key(&self) -> String;
}

// Cache stores WEAK references - models are freed when all pipelines using
// them drop. Repeated builds with the same options reuse loaded weights.
type CacheStorage = HashMap<(TypeId, String), Box<dyn Any + Send + Sync>>;

pub struct ModelCache {
    cache: Arc<Mutex<CacheStorage>>,
}

impl ModelCache {
    pub fn new() -> Self {
        Self {
            cache: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    pub fn get_or_create<M, F>(&self, key: &str, loader: F) -> Result<Arc<M>>
    where
        M: Send + Sync + 'static,
        F: FnOnce() -> Result<M>,
    {
        let type_id = TypeId::of::<M>();
        let cache_key = (type_id, key.to_string());

        {
            let mut cache = self.cache.lock().unwrap();
            if let Some(boxed) = cache.get(&cache_key) {
                if let Some(weak) = boxed.downcast_ref::<Weak<M>>() {
                    if let Some(strong) = weak.upgrade() {
                        return Ok(strong);
                    }
                }
                // Weak ref dead, remove stale entry
                cache.remove(&cache_key);
            }
        }

        let model = Arc::new(loader()?);

        {
            let mut cache = self.cache.lock().unwrap();
            let weak: Weak<M> = Arc::downgrade(&model);
            cache.insert(cache_key, Box::new(weak));
        }

        Ok(model)
    }

    #[allow(dead_code)]
    pub fn clear(&self) {
        let mut cache = self.cache.lock().unwrap();
        cache.clear();
    }

    #[allow(dead_code)]
    pub fn len(&self) -> usize {
        let cache = self.cache.lock().unwrap();
        cache.len()
    }

    #[allow(dead_code)]
    pub fn is_empty(&self) -> bool {
        let cache = self.cache.lock().unwrap();
        cache.is_empty()
    }
}

impl Default for ModelCache {
    fn default() -> Self {
        Self::new()
    }
}

static GLOBAL_MODEL_CACHE: once_cell::sync::Lazy<ModelCache> =
    once_cell::sync::Lazy::new(ModelCache::new);

pub fn global_cache() -> &'static ModelCache {
    &GLOBAL_MODEL_CACHE
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Clone)]
    struct FakeModel {
        id: String,
    }

    #[test]
    fn returns_cached_instance_for_same_key() {
        let cache = ModelCache::new();
        let first = cache
            .get_or_create::<FakeModel, _>("base-cpu", || {
                Ok(FakeModel {
                    id: "original".into(),
                })
            })
            .unwrap();
        let second = cache
            .get_or_create::<FakeModel, _>("base-cpu", || Ok(FakeModel { id: "new".into() }))
            .unwrap();
        assert_eq!(first.id, second.id);
    }

    #[test]
    fn different_keys_are_independent() {
        let cache = ModelCache::new();
        let base = cache
            .get_or_create::<FakeModel, _>("base-cpu", || Ok(FakeModel { id: "base".into() }))
            .unwrap();
        let large = cache
            .get_or_create::<FakeModel, _>("large-cpu", || Ok(FakeModel { id: "large".into() }))
            .unwrap();
        assert_ne!(base.id, large.id);
    }

    #[test]
    fn reloads_after_all_handles_drop() {
        let cache = ModelCache::new();
        let first = cache
            .get_or_create::<FakeModel, _>("base-cpu", || Ok(FakeModel { id: "first".into() }))
            .unwrap();
        drop(first);

        let second = cache
            .get_or_create::<FakeModel, _>("base-cpu", || {
                Ok(FakeModel {
                    id: "second".into(),
                })
            })
            .unwrap();
        assert_eq!(second.id, "second");
    }

    #[test]
    fn clear_empties_the_cache() {
        let cache = ModelCache::new();
        let _held = cache
            .get_or_create::<FakeModel, _>("base-cpu", || Ok(FakeModel { id: "held".into() }))
            .unwrap();
        assert!(!cache.is_empty());
        cache.clear();
        assert!(cache.is_empty());
    }
}
