use std::{
    borrow::Borrow,
    collections::hash_map::DefaultHasher,
    hash::{Hash, Hasher},
    marker::PhantomData,
    mem,
};

use thiserror::Error;

/// Bucket count used by [`ChainHashMap::new`]
const DEFAULT_CAPACITY: usize = 64;

/// Error returned when a table is requested with zero buckets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("capacity must be at least 1")]
pub struct InvalidCapacity;

/// A key-value entry stored in a bucket's collision chain
#[derive(Debug, Clone)]
struct Entry<K, V> {
    /// The key in the key-value pair
    key: K,
    /// The value associated with the key
    value: V,
}

/// A hash table resolving collisions by separate chaining.
///
/// Each bucket owns a chain of the entries whose hashes collided on its
/// index. The table doubles its bucket count whenever the number of stored
/// entries has reached the number of buckets, which keeps chains short and
/// every operation amortized O(1). Growth only ever doubles, so the capacity
/// stays a power-of-two multiple of whatever the table started with; it is
/// never rounded to a power of two on its own.
///
/// Note: This implementation is not thread-safe. Concurrent callers must
/// guard every operation with their own lock.
#[derive(Debug, Clone)]
pub struct ChainHashMap<K, V> {
    /// The buckets, each holding the chain of entries mapped to its index
    buckets: Vec<Vec<Entry<K, V>>>,
    /// Current number of entries across all chains
    count: usize,
}

impl<K, V> Default for ChainHashMap<K, V>
where
    K: Eq + Hash,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<K, V> Extend<(K, V)> for ChainHashMap<K, V>
where
    K: Eq + Hash,
{
    fn extend<T: IntoIterator<Item = (K, V)>>(&mut self, iter: T) {
        for (key, value) in iter {
            self.insert(key, value);
        }
    }
}

impl<K, V> FromIterator<(K, V)> for ChainHashMap<K, V>
where
    K: Eq + Hash,
{
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        let mut map = Self::new();
        map.extend(iter);
        map
    }
}

impl<K, V> ChainHashMap<K, V>
where
    K: Eq + Hash,
{
    /// Creates a new `ChainHashMap` with the default initial capacity
    #[must_use]
    pub fn new() -> Self {
        Self { buckets: Self::empty_buckets(DEFAULT_CAPACITY), count: 0 }
    }

    /// Creates a `ChainHashMap` with the given number of buckets.
    ///
    /// The bucket count is used exactly as supplied. Every later doubling
    /// therefore keeps the capacity a power-of-two multiple of this initial
    /// value.
    ///
    /// # Errors
    ///
    /// Returns [`InvalidCapacity`] when `capacity` is zero; the table needs
    /// at least one bucket for indexing to be defined.
    pub fn with_capacity(capacity: usize) -> Result<Self, InvalidCapacity> {
        if capacity == 0 {
            return Err(InvalidCapacity);
        }

        Ok(Self { buckets: Self::empty_buckets(capacity), count: 0 })
    }

    /// Allocates `capacity` buckets, each starting with an empty chain
    fn empty_buckets(capacity: usize) -> Vec<Vec<Entry<K, V>>> {
        let mut buckets = Vec::with_capacity(capacity);
        buckets.resize_with(capacity, Vec::new);
        buckets
    }

    /// Computes the hash for a key
    #[allow(clippy::unused_self)]
    fn hash<Q: ?Sized + Hash>(&self, key: &Q) -> u64 {
        let mut hasher = DefaultHasher::new();
        key.hash(&mut hasher);
        hasher.finish()
    }

    /// Maps a key to a bucket index under the current capacity.
    ///
    /// Recomputed on every call and never cached: after a resize the same
    /// key reduces to an index under the new bucket count.
    #[allow(clippy::cast_possible_truncation, clippy::arithmetic_side_effects)]
    fn bucket_index<Q: ?Sized + Hash>(&self, key: &Q) -> usize {
        // `buckets` is never empty (capacity starts at >= 1 and only ever
        // doubles), so the modulo is well defined and the result fits usize.
        (self.hash(key) % self.buckets.len() as u64) as usize
    }

    /// Inserts a key-value pair, returning the previous value if the key
    /// was already present.
    ///
    /// Growth is checked against pre-insertion occupancy: once every bucket
    /// slot is matched by a stored entry (`len() == capacity()`), the bucket
    /// array doubles before this key's index is computed. The load factor
    /// thus never exceeds 1.0 and drops to at most 0.5 right after each
    /// doubling.
    pub fn insert(&mut self, key: K, value: V) -> Option<V> {
        if self.count >= self.buckets.len() {
            self.resize();
        }

        let index = self.bucket_index(&key);
        let bucket = self.buckets.get_mut(index)?;

        for entry in &mut *bucket {
            if entry.key == key {
                return Some(mem::replace(&mut entry.value, value));
            }
        }

        bucket.push(Entry { key, value });
        self.count = self.count.saturating_add(1);
        None
    }

    /// Retrieves a reference to the value stored for a key
    pub fn get<Q>(&self, key: &Q) -> Option<&V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let index = self.bucket_index(key);

        for entry in self.buckets.get(index)? {
            if entry.key.borrow() == key {
                return Some(&entry.value);
            }
        }

        None
    }

    /// Retrieves a mutable reference to the value stored for a key
    pub fn get_mut<Q>(&mut self, key: &Q) -> Option<&mut V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let index = self.bucket_index(key);

        for entry in self.buckets.get_mut(index)? {
            if entry.key.borrow() == key {
                return Some(&mut entry.value);
            }
        }

        None
    }

    /// Removes a key from the table, returning its value.
    ///
    /// `None` reports that the key was not present; the table is left
    /// untouched in that case. Removal never shrinks the bucket array.
    pub fn remove<Q>(&mut self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let index = self.bucket_index(key);
        let bucket = self.buckets.get_mut(index)?;
        let position = bucket.iter().position(|entry| entry.key.borrow() == key)?;

        // Chain order is not observable, so the hole is filled from the back.
        let entry = bucket.swap_remove(position);
        self.count = self.count.saturating_sub(1);
        Some(entry.value)
    }

    /// Doubles the bucket array and redistributes every entry.
    ///
    /// `count` restarts at zero and is rebuilt by routing each old entry
    /// through `insert`, so every one lands at the index its hash reduces to
    /// under the new capacity. The doubled capacity always exceeds the
    /// number of entries being re-inserted, so the growth check in `insert`
    /// stays quiet for the whole pass.
    fn resize(&mut self) {
        let doubled = self.buckets.len().saturating_mul(2);
        let old_buckets = mem::replace(&mut self.buckets, Self::empty_buckets(doubled));
        self.count = 0;

        for bucket in old_buckets {
            for entry in bucket {
                self.insert(entry.key, entry.value);
            }
        }
    }

    /// Returns the number of entries in the hash table
    #[must_use]
    pub fn len(&self) -> usize {
        self.count
    }

    /// Returns true if the hash table is empty
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    /// Returns the number of buckets in the hash table
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.buckets.len()
    }

    /// Returns the current ratio of stored entries to buckets
    #[must_use]
    #[allow(clippy::arithmetic_side_effects, clippy::cast_precision_loss)]
    pub fn load_factor(&self) -> f64 {
        self.count as f64 / self.buckets.len() as f64
    }

    /// Returns the length of the longest collision chain.
    ///
    /// A diagnostic, not part of the map contract: under the doubling
    /// policy chains stay short, and a large value here points at a poorly
    /// distributed key hash.
    #[must_use]
    pub fn max_chain_len(&self) -> usize {
        self.buckets.iter().map(Vec::len).max().unwrap_or(0)
    }

    /// Returns an iterator over the key-value pairs, in unspecified order
    #[must_use]
    #[allow(clippy::iter_without_into_iter)]
    pub fn iter(&self) -> Iter<'_, K, V> {
        Iter { buckets: &self.buckets, bucket: 0, entry: 0, _marker: PhantomData }
    }

    /// Clears the hash table, removing all key-value pairs.
    ///
    /// The bucket array keeps its current capacity.
    pub fn clear(&mut self) {
        for bucket in &mut self.buckets {
            bucket.clear();
        }
        self.count = 0;
    }
}

/// Iterator over the key-value pairs of the hash table
#[derive(Debug, Clone)]
pub struct Iter<'a, K, V> {
    /// The buckets being walked
    buckets: &'a [Vec<Entry<K, V>>],
    /// Index of the bucket currently being walked
    bucket: usize,
    /// Position within the current bucket's chain
    entry: usize,
    /// Phantom data to hold the lifetime and type parameters
    _marker: PhantomData<&'a (K, V)>,
}

impl<'a, K, V> Iterator for Iter<'a, K, V> {
    type Item = (&'a K, &'a V);

    fn next(&mut self) -> Option<Self::Item> {
        while let Some(bucket) = self.buckets.get(self.bucket) {
            if let Some(entry) = bucket.get(self.entry) {
                self.entry = self.entry.saturating_add(1);
                return Some((&entry.key, &entry.value));
            }

            self.bucket = self.bucket.saturating_add(1);
            self.entry = 0;
        }

        None
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::arithmetic_side_effects)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use std::collections::HashMap;

    #[test]
    fn test_insert_and_get() {
        let mut map = ChainHashMap::new();
        assert_eq!(map.insert("key1".to_string(), 1), None);
        assert_eq!(map.insert("key2".to_string(), 2), None);
        assert_eq!(map.insert("key3".to_string(), 3), None);

        assert_eq!(map.get("key1"), Some(&1));
        assert_eq!(map.get("key2"), Some(&2));
        assert_eq!(map.get("key3"), Some(&3));
        assert_eq!(map.get("key4"), None);
    }

    #[test]
    fn test_update() {
        let mut map = ChainHashMap::new();
        assert_eq!(map.insert("key1".to_string(), 1), None);
        assert_eq!(map.insert("key1".to_string(), 10), Some(1));
        assert_eq!(map.get("key1"), Some(&10));
        assert_eq!(map.len(), 1);
    }

    #[test]
    fn test_remove() {
        let mut map = ChainHashMap::new();
        map.insert("key1".to_string(), 1);
        map.insert("key2".to_string(), 2);

        assert_eq!(map.remove("key1"), Some(1));
        assert_eq!(map.get("key1"), None);
        assert_eq!(map.get("key2"), Some(&2));
        assert_eq!(map.remove("key1"), None);
        assert_eq!(map.len(), 1);
    }

    #[test]
    fn test_remove_absent_key_leaves_count() {
        let mut map = ChainHashMap::new();
        map.insert("key1".to_string(), 1);

        assert_eq!(map.remove("missing"), None);
        assert_eq!(map.len(), 1);
    }

    #[test]
    fn test_rejects_zero_capacity() {
        let result = ChainHashMap::<String, i32>::with_capacity(0);
        assert_eq!(result.err(), Some(InvalidCapacity));
    }

    #[test]
    fn test_growth_at_full_occupancy() {
        let mut map = ChainHashMap::with_capacity(2).unwrap();
        map.insert("a".to_string(), 1);
        map.insert("b".to_string(), 2);
        assert_eq!(map.len(), 2);
        assert_eq!(map.capacity(), 2);

        // The third insert finds count == capacity and doubles first.
        map.insert("c".to_string(), 3);
        assert_eq!(map.capacity(), 4);
        assert_eq!(map.len(), 3);

        assert_eq!(map.get("a"), Some(&1));
        assert_eq!(map.get("b"), Some(&2));
        assert_eq!(map.get("c"), Some(&3));

        assert_eq!(map.remove("b"), Some(2));
        assert_eq!(map.get("b"), None);
        assert_eq!(map.len(), 2);
    }

    #[test]
    fn test_growth_is_not_proactive() {
        let mut map = ChainHashMap::with_capacity(4).unwrap();
        for i in 0..4 {
            map.insert(i, i);
        }

        // Filling the table exactly does not grow it yet.
        assert_eq!(map.capacity(), 4);
        assert_eq!(map.len(), 4);

        map.insert(4, 4);
        assert_eq!(map.capacity(), 8);
        assert_eq!(map.len(), 5);
    }

    #[test]
    fn test_update_at_full_occupancy_also_grows() {
        let mut map = ChainHashMap::with_capacity(2).unwrap();
        map.insert("a".to_string(), 1);
        map.insert("b".to_string(), 2);

        // The growth check runs before the chain is scanned, so even an
        // overwriting insert doubles a full table.
        assert_eq!(map.insert("a".to_string(), 10), Some(1));
        assert_eq!(map.capacity(), 4);
        assert_eq!(map.len(), 2);
        assert_eq!(map.get("a"), Some(&10));
    }

    #[test]
    fn test_doubling_from_odd_capacity() {
        let mut map = ChainHashMap::with_capacity(3).unwrap();
        for i in 0..4 {
            map.insert(i, i * 10);
        }
        assert_eq!(map.capacity(), 6);

        for i in 4..7 {
            map.insert(i, i * 10);
        }
        assert_eq!(map.capacity(), 12);

        for i in 0..7 {
            assert_eq!(map.get(&i), Some(&(i * 10)));
        }
    }

    #[test]
    fn test_round_trip_across_growth() {
        let mut map = ChainHashMap::with_capacity(1).unwrap();
        for i in 0..100 {
            map.insert(format!("key{i}"), i);
        }

        assert_eq!(map.len(), 100);
        assert_eq!(map.capacity(), 128);
        for i in 0..100 {
            assert_eq!(map.get(&format!("key{i}")), Some(&i));
        }
    }

    #[test]
    fn test_len_and_is_empty() {
        let mut map = ChainHashMap::new();
        assert!(map.is_empty());
        assert_eq!(map.len(), 0);

        map.insert("key1".to_string(), 1);
        assert!(!map.is_empty());
        assert_eq!(map.len(), 1);

        map.insert("key2".to_string(), 2);
        assert_eq!(map.len(), 2);

        map.remove("key1");
        assert_eq!(map.len(), 1);

        map.remove("key2");
        assert!(map.is_empty());
    }

    #[test]
    fn test_iter() {
        let mut map = ChainHashMap::new();
        map.insert("key1".to_string(), 1);
        map.insert("key2".to_string(), 2);
        map.insert("key3".to_string(), 3);

        let mut count = 0;
        let mut sum = 0;
        for (_, &value) in map.iter() {
            count += 1;
            sum += value;
        }

        assert_eq!(count, 3);
        assert_eq!(sum, 6);
    }

    #[test]
    fn test_iter_visits_each_entry_once_after_growth() {
        let mut map = ChainHashMap::with_capacity(2).unwrap();
        for i in 0..20 {
            map.insert(i, ());
        }

        let mut seen: Vec<i32> = map.iter().map(|(&k, _)| k).collect();
        seen.sort_unstable();
        assert_eq!(seen, (0..20).collect::<Vec<_>>());
    }

    #[test]
    fn test_get_mut() {
        let mut map = ChainHashMap::new();
        map.insert("key1".to_string(), 1);

        if let Some(value) = map.get_mut("key1") {
            *value += 10;
        }

        assert_eq!(map.get("key1"), Some(&11));
    }

    #[test]
    fn test_clear() {
        let mut map = ChainHashMap::with_capacity(2).unwrap();
        for i in 0..5 {
            map.insert(i, i);
        }
        let grown = map.capacity();

        map.clear();

        assert_eq!(map.len(), 0);
        assert!(map.is_empty());
        assert_eq!(map.get(&0), None);
        assert_eq!(map.capacity(), grown);
    }

    #[test]
    fn test_extend_and_from_iter() {
        let pairs = vec![("a".to_string(), 1), ("b".to_string(), 2)];
        let mut map: ChainHashMap<String, i32> = pairs.into_iter().collect();
        assert_eq!(map.len(), 2);

        map.extend(vec![("c".to_string(), 3)]);
        assert_eq!(map.get("c"), Some(&3));
        assert_eq!(map.len(), 3);
    }

    #[test]
    fn test_max_chain_len_bounded_by_count() {
        let mut map = ChainHashMap::with_capacity(8).unwrap();
        assert_eq!(map.max_chain_len(), 0);

        for i in 0..8 {
            map.insert(i, i);
        }
        assert!(map.max_chain_len() >= 1);
        assert!(map.max_chain_len() <= map.len());
    }

    // Mirrors random op sequences against the std map: both see the same
    // inserts, removals, and lookups, and must agree after every step.
    proptest! {
        #[test]
        fn prop_matches_std_hashmap(
            ops in proptest::collection::vec((0u8..=2u8, 0u8..=40u8, any::<i32>()), 1..200)
        ) {
            let mut map = ChainHashMap::with_capacity(1).unwrap();
            let mut model: HashMap<u8, i32> = HashMap::new();

            for (op, key, value) in ops {
                match op {
                    0 => {
                        prop_assert_eq!(map.insert(key, value), model.insert(key, value));
                    }
                    1 => {
                        prop_assert_eq!(map.remove(&key), model.remove(&key));
                    }
                    _ => {
                        prop_assert_eq!(map.get(&key), model.get(&key));
                    }
                }

                prop_assert_eq!(map.len(), model.len());
                prop_assert!(map.len() <= map.capacity());
            }

            for (key, value) in &model {
                prop_assert_eq!(map.get(key), Some(value));
            }
            prop_assert_eq!(map.iter().count(), map.len());
        }
    }
}
