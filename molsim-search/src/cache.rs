//! Bounded caches keyed on dataset content.
//!
//! Entries are keyed by the SHA-256 digest of the dataset file plus a
//! per-cache key. A file that changes on disk gets a new digest, so stale
//! values are never returned; the entries of its previous digest are dropped
//! as soon as the change is seen. The path to digest table is itself an LRU
//! of the same capacity, so a stream of distinct paths cannot grow it.

use std::hash::Hash;
use std::num::NonZeroUsize;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use lru::LruCache;
use molsim_chem::Fingerprint;
use parking_lot::Mutex;

/// Outcome of fingerprinting one dataset row: the fingerprint, or the reason
/// the descriptor was rejected. Failures are cached too.
pub type FingerprintOutcome = std::result::Result<Fingerprint, String>;

/// Identifies one row fingerprinted with given parameters.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FingerprintKey {
    pub row: usize,
    pub id: String,
    pub radius: usize,
    pub nbits: usize,
}

/// Row fingerprints, keyed by (digest, row, id, radius, nbits).
pub type FingerprintCache = SourceCache<FingerprintKey, FingerprintOutcome>;

/// Identifier to descriptor lookups, keyed by (digest, id). `None` records
/// a miss.
pub type DescriptorCache = SourceCache<String, Option<String>>;

struct Inner<K: Hash + Eq, V> {
    entries: LruCache<(Arc<str>, K), V>,
    sources: LruCache<PathBuf, Arc<str>>,
}

/// A thread-safe LRU cache whose keys are scoped by a content digest.
pub struct SourceCache<K: Hash + Eq, V> {
    inner: Option<Mutex<Inner<K, V>>>,
}

impl<K, V> SourceCache<K, V>
where
    K: Hash + Eq + Clone,
    V: Clone,
{
    /// Create a cache holding at most `capacity` entries. Zero disables it.
    pub fn new(capacity: usize) -> Self {
        let inner = NonZeroUsize::new(capacity).map(|cap| {
            Mutex::new(Inner {
                entries: LruCache::new(cap),
                sources: LruCache::new(cap),
            })
        });
        SourceCache { inner }
    }

    pub fn is_enabled(&self) -> bool {
        self.inner.is_some()
    }

    pub fn capacity(&self) -> usize {
        self.inner
            .as_ref()
            .map_or(0, |inner| inner.lock().entries.cap().get())
    }

    pub fn len(&self) -> usize {
        self.inner.as_ref().map_or(0, |inner| inner.lock().entries.len())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Record that `path` currently has content `digest`.
    ///
    /// If the path was last seen with a different digest, entries under the
    /// old digest are evicted unless another path still has that content.
    /// Returns the shared digest handle to key entries with.
    pub fn observe(&self, path: &Path, digest: &str) -> Arc<str> {
        let Some(inner) = &self.inner else {
            return Arc::from(digest);
        };
        let mut guard = inner.lock();
        let Inner { entries, sources } = &mut *guard;

        if let Some(previous) = sources.get(path).filter(|d| &***d == digest) {
            return Arc::clone(previous);
        }

        let handle = sources
            .iter()
            .map(|(_, d)| d)
            .find(|d| &***d == digest)
            .cloned()
            .unwrap_or_else(|| Arc::from(digest));

        // Entries of a path pushed out of `sources` stay until `entries`
        // evicts them on its own.
        if let Some(old) = sources.put(path.to_path_buf(), Arc::clone(&handle)) {
            let still_used = sources.iter().any(|(_, d)| *d == old);
            if !still_used {
                let stale: Vec<(Arc<str>, K)> = entries
                    .iter()
                    .filter(|((d, _), _)| *d == old)
                    .map(|(k, _)| k.clone())
                    .collect();
                for key in &stale {
                    entries.pop(key);
                }
                tracing::info!(
                    path = %path.display(),
                    old_digest = %old,
                    new_digest = %digest,
                    evicted = stale.len(),
                    "dataset content changed; cache entries invalidated"
                );
            }
        }

        handle
    }

    pub fn get(&self, digest: &Arc<str>, key: &K) -> Option<V> {
        let inner = self.inner.as_ref()?;
        inner
            .lock()
            .entries
            .get(&(Arc::clone(digest), key.clone()))
            .cloned()
    }

    pub fn insert(&self, digest: Arc<str>, key: K, value: V) {
        if let Some(inner) = &self.inner {
            inner.lock().entries.put((digest, key), value);
        }
    }

    /// Return the cached value or compute and store it.
    ///
    /// The lock is released while `compute` runs; two threads racing on
    /// the same key both compute and the later insert wins.
    pub fn get_or_insert_with(&self, digest: &Arc<str>, key: K, compute: impl FnOnce() -> V) -> V {
        if let Some(hit) = self.get(digest, &key) {
            return hit;
        }
        let value = compute();
        self.insert(Arc::clone(digest), key, value.clone());
        value
    }

    pub fn clear(&self) {
        if let Some(inner) = &self.inner {
            let mut guard = inner.lock();
            guard.entries.clear();
            guard.sources.clear();
        }
    }
}

impl<K: Hash + Eq, V> std::fmt::Debug for SourceCache<K, V> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.inner {
            Some(inner) => {
                let guard = inner.lock();
                f.debug_struct("SourceCache")
                    .field("len", &guard.entries.len())
                    .field("capacity", &guard.entries.cap())
                    .field("sources", &guard.sources.len())
                    .finish()
            }
            None => f.write_str("SourceCache(disabled)"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hit_after_insert() {
        let cache: SourceCache<String, u32> = SourceCache::new(4);
        let d = cache.observe(Path::new("a.csv"), "d1");
        assert_eq!(cache.get(&d, &"x".to_string()), None);
        cache.insert(Arc::clone(&d), "x".to_string(), 7);
        assert_eq!(cache.get(&d, &"x".to_string()), Some(7));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn same_key_different_digest_is_a_miss() {
        let cache: SourceCache<String, u32> = SourceCache::new(4);
        cache.insert(Arc::from("d1"), "x".to_string(), 1);
        assert_eq!(cache.get(&Arc::from("d2"), &"x".to_string()), None);
    }

    #[test]
    fn content_change_evicts_old_entries() {
        let cache: SourceCache<String, u32> = SourceCache::new(8);
        let path = Path::new("data/set.csv");
        let d1 = cache.observe(path, "d1");
        cache.insert(Arc::clone(&d1), "a".into(), 1);
        cache.insert(Arc::clone(&d1), "b".into(), 2);
        assert_eq!(cache.len(), 2);

        let d2 = cache.observe(path, "d2");
        assert_eq!(cache.len(), 0);
        assert_eq!(cache.get(&d1, &"a".to_string()), None);
        assert_eq!(&*d2, "d2");
    }

    #[test]
    fn shared_content_survives_other_path_change() {
        let cache: SourceCache<String, u32> = SourceCache::new(8);
        let d = cache.observe(Path::new("a.csv"), "same");
        cache.observe(Path::new("b.csv"), "same");
        cache.insert(Arc::clone(&d), "k".into(), 9);

        cache.observe(Path::new("a.csv"), "changed");
        assert_eq!(cache.get(&d, &"k".to_string()), Some(9));
    }

    #[test]
    fn unchanged_content_keeps_entries() {
        let cache: SourceCache<String, u32> = SourceCache::new(8);
        let d = cache.observe(Path::new("a.csv"), "d1");
        cache.insert(Arc::clone(&d), "k".into(), 3);
        cache.observe(Path::new("a.csv"), "d1");
        assert_eq!(cache.get(&d, &"k".to_string()), Some(3));
    }

    #[test]
    fn tracked_paths_are_bounded() {
        let cache: SourceCache<String, u32> = SourceCache::new(3);
        for i in 0..50 {
            let d = cache.observe(Path::new(&format!("upload-{i}.csv")), &format!("d{i}"));
            cache.insert(d, "k".into(), i);
        }
        let debug = format!("{cache:?}");
        assert!(debug.contains("sources: 3"), "{debug}");
        assert_eq!(cache.len(), 3);

        // The most recent path is still tracked: a content change purges it
        let d49: Arc<str> = Arc::from("d49");
        assert_eq!(cache.get(&d49, &"k".to_string()), Some(49));
        cache.observe(Path::new("upload-49.csv"), "changed");
        assert_eq!(cache.get(&d49, &"k".to_string()), None);
    }

    #[test]
    fn capacity_is_bounded() {
        let cache: SourceCache<usize, usize> = SourceCache::new(2);
        let d: Arc<str> = Arc::from("d");
        for i in 0..5 {
            cache.insert(Arc::clone(&d), i, i);
        }
        assert_eq!(cache.len(), 2);
        assert_eq!(cache.capacity(), 2);
        assert_eq!(cache.get(&d, &0), None);
        assert_eq!(cache.get(&d, &4), Some(4));
    }

    #[test]
    fn zero_capacity_disables_caching() {
        let cache: SourceCache<String, u32> = SourceCache::new(0);
        assert!(!cache.is_enabled());
        let d = cache.observe(Path::new("a.csv"), "d1");
        cache.insert(Arc::clone(&d), "x".into(), 1);
        assert_eq!(cache.get(&d, &"x".to_string()), None);
        assert!(cache.is_empty());
    }

    #[test]
    fn get_or_insert_computes_once() {
        let cache: SourceCache<String, u32> = SourceCache::new(4);
        let d: Arc<str> = Arc::from("d");
        let mut calls = 0;
        let v1 = cache.get_or_insert_with(&d, "k".into(), || {
            calls += 1;
            5
        });
        let v2 = cache.get_or_insert_with(&d, "k".into(), || {
            calls += 1;
            6
        });
        assert_eq!((v1, v2, calls), (5, 5, 1));
    }
}
