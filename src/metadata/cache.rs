// src/metadata/cache.rs

//! Get-or-compute cache of shared in-flight results.
//!
//! The cache stores the *future* of a computation, not just its value, so
//! concurrent callers asking for the same key share a single underlying
//! call. Entries live as long as the cache itself; there is no eviction
//! policy, which makes the cache unbounded for a long-running process.
//! Failed computations are removed so that a later call can retry them.

use std::collections::HashMap;
use std::fmt;
use std::hash::Hash;
use std::sync::{Arc, Mutex, MutexGuard};

use futures::future::{BoxFuture, FutureExt, Shared};

use crate::future::Message;

type SharedResult<V> = Shared<BoxFuture<'static, Result<V, Message>>>;

pub struct SharedCache<K, V> {
    entries: Arc<Mutex<HashMap<K, SharedResult<V>>>>,
}

impl<K, V> fmt::Debug for SharedCache<K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SharedCache").finish_non_exhaustive()
    }
}

impl<K, V> Clone for SharedCache<K, V> {
    fn clone(&self) -> Self {
        Self {
            entries: Arc::clone(&self.entries),
        }
    }
}

impl<K, V> Default for SharedCache<K, V> {
    fn default() -> Self {
        Self {
            entries: Arc::new(Mutex::new(HashMap::new())),
        }
    }
}

impl<K, V> SharedCache<K, V>
where
    K: Eq + Hash + Clone + Send + 'static,
    V: Clone + Send + Sync + 'static,
{
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the cached result for `key`, computing it at most once.
    ///
    /// `compute` is only invoked on a miss.
    pub async fn get_or_compute<F>(&self, key: K, compute: F) -> Result<V, Message>
    where
        F: FnOnce() -> BoxFuture<'static, Result<V, Message>>,
    {
        let shared = {
            let mut entries = self.lock();
            entries
                .entry(key.clone())
                .or_insert_with(|| compute().shared())
                .clone()
        };

        let result = shared.clone().await;

        if result.is_err() {
            let mut entries = self.lock();
            let same = entries
                .get(&key)
                .is_some_and(|current| current.ptr_eq(&shared));
            if same {
                entries.remove(&key);
            }
        }

        result
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<K, SharedResult<V>>> {
        // A poisoned map still holds valid entries.
        self.entries
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}
