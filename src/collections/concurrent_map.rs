//! Concurrent hash map used as the symbol → instrument book registry.
//!
//! Two-level locking: every bucket has its own reader-writer lock, and the
//! whole bucket array sits behind a rehash lock that normal operations take
//! shared and a resize takes exclusive. Entries are never removed, so the
//! `Arc` handed back for a key stays valid for the life of the process and
//! callers may cache it across resizes.

use parking_lot::RwLock;
use std::borrow::Borrow;
use std::collections::hash_map::RandomState;
use std::hash::{BuildHasher, Hash};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use tracing::trace;

const INITIAL_BUCKETS: usize = 16;
const MAX_LOAD_FACTOR: f64 = 0.7;

type Bucket<K, V> = RwLock<Vec<(K, Arc<V>)>>;

/// A growable hash map safe for concurrent use from many threads.
pub struct ConcurrentMap<K, V> {
    /// The outer lock is the rehash lock: shared for lookups and inserts,
    /// exclusive only while the bucket array is being rebuilt.
    buckets: RwLock<Box<[Bucket<K, V>]>>,
    hasher: RandomState,
    len: AtomicUsize,
}

impl<K: Hash + Eq, V> ConcurrentMap<K, V> {
    /// Create a map with the default initial bucket count.
    pub fn new() -> Self {
        Self::with_buckets(INITIAL_BUCKETS)
    }

    /// Create a map with at least `buckets` buckets.
    pub fn with_buckets(buckets: usize) -> Self {
        Self {
            buckets: RwLock::new(Self::allocate_buckets(buckets.max(1))),
            hasher: RandomState::new(),
            len: AtomicUsize::new(0),
        }
    }

    /// Number of entries in the map.
    pub fn len(&self) -> usize {
        self.len.load(Ordering::Relaxed)
    }

    /// Whether the map holds no entries.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Look up `key`, returning a stable handle to its value.
    pub fn get<Q>(&self, key: &Q) -> Option<Arc<V>>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let buckets = self.buckets.read();
        let bucket = buckets[self.bucket_index(key, buckets.len())].read();
        bucket
            .iter()
            .find(|(held, _)| held.borrow() == key)
            .map(|(_, value)| Arc::clone(value))
    }

    /// Whether `key` is present.
    pub fn contains<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.get(key).is_some()
    }

    /// Return the value for `key`, creating it with `factory` if absent.
    ///
    /// Creation is serialized per key under the bucket's write lock: exactly
    /// one caller runs the factory, and every concurrent caller receives a
    /// handle to that same value.
    pub fn get_or_insert(&self, key: K, factory: impl FnOnce() -> V) -> Arc<V> {
        let value = {
            let buckets = self.buckets.read();
            let index = self.bucket_index(&key, buckets.len());

            {
                let bucket = buckets[index].read();
                if let Some((_, value)) = bucket.iter().find(|(held, _)| *held == key) {
                    return Arc::clone(value);
                }
            }

            let mut bucket = buckets[index].write();
            // Another writer may have won the race between the two locks.
            if let Some((_, value)) = bucket.iter().find(|(held, _)| *held == key) {
                return Arc::clone(value);
            }

            let value = Arc::new(factory());
            bucket.push((key, Arc::clone(&value)));
            self.len.fetch_add(1, Ordering::Relaxed);
            value
        };

        // Every shared lock is released before escalating to the exclusive
        // rehash lock, otherwise a resize could deadlock against this thread.
        self.grow_if_overloaded();
        value
    }

    fn bucket_index<Q: Hash + ?Sized>(&self, key: &Q, bucket_count: usize) -> usize {
        (self.hasher.hash_one(key) as usize) % bucket_count
    }

    fn allocate_buckets(count: usize) -> Box<[Bucket<K, V>]> {
        (0..count).map(|_| RwLock::new(Vec::new())).collect()
    }

    fn is_overloaded(&self, bucket_count: usize) -> bool {
        self.len() as f64 > bucket_count as f64 * MAX_LOAD_FACTOR
    }

    fn grow_if_overloaded(&self) {
        {
            let buckets = self.buckets.read();
            if !self.is_overloaded(buckets.len()) {
                return;
            }
        }

        let mut buckets = self.buckets.write();
        // Re-check: a concurrent caller may have grown the map already.
        if !self.is_overloaded(buckets.len()) {
            return;
        }

        let new_count = buckets.len() * 2;
        trace!(
            "Resizing concurrent map: {} -> {} buckets for {} entries",
            buckets.len(),
            new_count,
            self.len()
        );

        let old = std::mem::replace(&mut *buckets, Self::allocate_buckets(new_count));
        for bucket in Vec::from(old) {
            for (key, value) in bucket.into_inner() {
                let index = self.bucket_index(&key, new_count);
                buckets[index].get_mut().push((key, value));
            }
        }
    }
}

impl<K: Hash + Eq, V> Default for ConcurrentMap<K, V> {
    fn default() -> Self {
        Self::new()
    }
}
