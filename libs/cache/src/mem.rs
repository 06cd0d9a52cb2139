//! In-memory caching utilities.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use once_cell::sync::OnceCell;

use crate::ContentKey;

/// A thread-safe map from [`ContentKey`]s to immutable values.
///
/// Each key is generated at most once. Failed generations are not cached,
/// so a later request for the same key runs its generator again.
///
/// Generators may themselves consult the cache for other keys.
/// A generator that requests its own key deadlocks.
///
/// # Examples
///
/// ```
/// use cache::{mem::ContentCache, ContentKey, Namespace};
///
/// let cache = ContentCache::new();
/// let key = ContentKey::new(Namespace::new("demo")?, &(5u64, 6u64))?;
///
/// let v = cache.get_or_try_generate(key.clone(), || Ok::<_, ()>(11u64)).unwrap();
/// assert_eq!(*v, 11);
///
/// // Does not call the generator again as the result has been cached.
/// let v = cache.get_or_try_generate(key, || -> Result<u64, ()> { unreachable!() }).unwrap();
/// assert_eq!(*v, 11);
/// # Ok::<(), cache::Error>(())
/// ```
#[derive(Debug)]
pub struct ContentCache<V> {
    cells: Mutex<HashMap<ContentKey, Arc<OnceCell<Arc<V>>>>>,
    hits: AtomicU64,
    misses: AtomicU64,
}

impl<V> Default for ContentCache<V> {
    fn default() -> Self {
        Self {
            cells: Mutex::new(HashMap::new()),
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
        }
    }
}

impl<V> ContentCache<V> {
    /// Creates a new, empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    fn cell(&self, key: ContentKey) -> Arc<OnceCell<Arc<V>>> {
        let mut cells = self.cells.lock().unwrap_or_else(PoisonError::into_inner);
        cells.entry(key).or_default().clone()
    }

    /// Returns the value for `key`, running `generate_fn` if it has not been generated.
    pub fn get_or_try_generate<E>(
        &self,
        key: ContentKey,
        generate_fn: impl FnOnce() -> Result<V, E>,
    ) -> Result<Arc<V>, E> {
        // The map lock is released before generating so generators can use the cache.
        let cell = self.cell(key.clone());
        let mut generated = false;
        let value = cell.get_or_try_init(|| {
            generated = true;
            generate_fn().map(Arc::new)
        })?;
        if generated {
            self.misses.fetch_add(1, Ordering::Relaxed);
            tracing::debug!(key = %key, "cache miss");
        } else {
            self.hits.fetch_add(1, Ordering::Relaxed);
            tracing::trace!(key = %key, "cache hit");
        }
        Ok(value.clone())
    }

    /// Returns the value for `key` if it has already been generated.
    pub fn get(&self, key: &ContentKey) -> Option<Arc<V>> {
        let cells = self.cells.lock().unwrap_or_else(PoisonError::into_inner);
        cells.get(key).and_then(|cell| cell.get().cloned())
    }

    /// The number of lookups served from the cache.
    pub fn hits(&self) -> u64 {
        self.hits.load(Ordering::Relaxed)
    }

    /// The number of lookups that ran a generator successfully.
    pub fn misses(&self) -> u64 {
        self.misses.load(Ordering::Relaxed)
    }
}
