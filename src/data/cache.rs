use std::collections::HashMap;
use std::hash::Hash;
use std::sync::{Arc, RwLock};

use once_cell::sync::OnceCell;

// ---------------------------------------------------------------------------
// MemoCache – concurrent read-through memoization
// ---------------------------------------------------------------------------

/// Memoizes one value per key for the lifetime of the cache.
///
/// The map lock is only held to find or create the per-key cell; the value
/// itself is produced through [`OnceCell::get_or_try_init`], so a key is
/// populated at most once while other keys stay readable.  A failed
/// initialiser leaves the cell empty and the next caller tries again.
pub struct MemoCache<K, V> {
    entries: RwLock<HashMap<K, Arc<OnceCell<V>>>>,
}

impl<K, V> Default for MemoCache<K, V> {
    fn default() -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
        }
    }
}

impl<K, V> MemoCache<K, V>
where
    K: Eq + Hash + Clone,
    V: Clone,
{
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the cached value for `key`, computing it with `init` on the
    /// first request.
    pub fn get_or_try_insert_with<E, F>(&self, key: &K, init: F) -> Result<V, E>
    where
        F: FnOnce() -> Result<V, E>,
    {
        let cell = self.cell(key);
        cell.get_or_try_init(init).cloned()
    }

    /// Cached value for `key`, if already populated.
    #[cfg(test)]
    pub fn get(&self, key: &K) -> Option<V> {
        let entries = self.entries.read().unwrap_or_else(|e| e.into_inner());
        entries.get(key).and_then(|cell| cell.get().cloned())
    }

    /// Number of populated entries.
    pub fn len(&self) -> usize {
        let entries = self.entries.read().unwrap_or_else(|e| e.into_inner());
        entries.values().filter(|cell| cell.get().is_some()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn cell(&self, key: &K) -> Arc<OnceCell<V>> {
        {
            let entries = self.entries.read().unwrap_or_else(|e| e.into_inner());
            if let Some(cell) = entries.get(key) {
                return Arc::clone(cell);
            }
        }
        let mut entries = self.entries.write().unwrap_or_else(|e| e.into_inner());
        Arc::clone(entries.entry(key.clone()).or_default())
    }
}
