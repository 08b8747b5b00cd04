//! A unique-key sorted map with positional access.

use alloc::vec::Vec;

use crate::compare::{Comparator, NaturalOrder};
use crate::error::{Error, Result};
use crate::tree::node::{DuplicateHandling, KeyValue};
use crate::tree::weight_balanced::WeightBalancedTree;

/// A map that keeps its entries in key order, addressable both by key
/// and by sorted position.
///
/// Backed by a [`WeightBalancedTree`], so every operation is O(log n)
/// worst case. Inserting under an existing key replaces the value and
/// returns the old one, like the standard map types.
///
/// # Example
///
/// ```
/// use sorted_forest::SortedMap;
///
/// let mut map: SortedMap<&str, i32> = SortedMap::new();
/// map.insert("b", 2).unwrap();
/// map.insert("a", 1).unwrap();
///
/// assert_eq!(map[&"a"], 1);
/// assert_eq!(map.get_by_index(1), Some((&"b", &2)));
/// ```
pub struct SortedMap<K, V, C: Comparator<K> = NaturalOrder> {
    tree: WeightBalancedTree<KeyValue<K, V>, C>,
}

impl<K, V, C: Comparator<K> + Default> SortedMap<K, V, C> {
    /// Creates an empty map ordered by the default comparator.
    #[must_use]
    pub fn new() -> Self {
        Self::with_comparator(C::default())
    }

    /// Builds a map from the full dataset in one linear pass. Later
    /// occurrences of a key are dropped in favor of the first.
    ///
    /// # Errors
    ///
    /// [`Error::CollectionFull`](crate::Error::CollectionFull) when the
    /// input exceeds capacity.
    pub fn from_entries(entries: Vec<(K, V)>) -> Result<Self> {
        let tree = WeightBalancedTree::from_items(entries, DuplicateHandling::KeepFirst)?;
        Ok(SortedMap { tree })
    }
}

impl<K, V, C: Comparator<K> + Default> Default for SortedMap<K, V, C> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K, V, C: Comparator<K>> SortedMap<K, V, C> {
    /// Creates an empty map ordered by `comparator`.
    #[must_use]
    pub fn with_comparator(comparator: C) -> Self {
        SortedMap { tree: WeightBalancedTree::with_comparator(comparator) }
    }

    /// The number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.tree.len()
    }

    /// Returns `true` if the map holds no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tree.is_empty()
    }

    /// The active comparator.
    pub fn comparator(&self) -> &C {
        self.tree.comparator()
    }

    /// Inserts `value` under `key`. When the key is already present its
    /// value is replaced and the old value returned; the stored key is
    /// kept.
    ///
    /// # Errors
    ///
    /// [`Error::CollectionFull`](crate::Error::CollectionFull) at
    /// capacity.
    pub fn insert(&mut self, key: K, value: V) -> Result<Option<V>> {
        if let Some(existing) = self.tree.value_mut(&key) {
            return Ok(Some(core::mem::replace(existing, value)));
        }
        self.tree.insert((key, value), DuplicateHandling::RejectDuplicate)?;
        Ok(None)
    }

    /// Borrows the value stored under `key`.
    #[must_use]
    pub fn get(&self, key: &K) -> Option<&V> {
        self.tree.get(key).map(|(_, value)| value)
    }

    /// Borrows the value stored under `key`, treating an absent key as
    /// an error rather than a normal outcome.
    ///
    /// # Errors
    ///
    /// [`Error::KeyNotFound`] when no entry matches.
    pub fn try_get(&self, key: &K) -> Result<&V> {
        self.get(key).ok_or(Error::KeyNotFound)
    }

    /// Mutably borrows the value stored under `key`.
    #[must_use]
    pub fn get_mut(&mut self, key: &K) -> Option<&mut V> {
        self.tree.value_mut(key)
    }

    /// Returns `true` if `key` is present.
    #[must_use]
    pub fn contains_key(&self, key: &K) -> bool {
        self.tree.contains_key(key)
    }

    /// Removes the entry under `key` and returns its value.
    pub fn remove(&mut self, key: &K) -> Option<V> {
        self.tree.remove(key).map(|(_, value)| value)
    }

    /// Borrows the entry at `index` in key order.
    #[must_use]
    pub fn get_by_index(&self, index: usize) -> Option<(&K, &V)> {
        self.tree.at(index).ok().map(|(key, value)| (key, value))
    }

    /// Removes and returns the entry at `index` in key order.
    ///
    /// # Errors
    ///
    /// [`Error::IndexOutOfRange`](crate::Error::IndexOutOfRange) when
    /// `index >= len`.
    pub fn remove_at(&mut self, index: usize) -> Result<(K, V)> {
        self.tree.remove_at(index)
    }

    /// Borrows the entry with the smallest key.
    #[must_use]
    pub fn first(&self) -> Option<(&K, &V)> {
        self.tree.min().ok().map(|(key, value)| (key, value))
    }

    /// Borrows the entry with the largest key.
    #[must_use]
    pub fn last(&self) -> Option<(&K, &V)> {
        self.tree.max().ok().map(|(key, value)| (key, value))
    }

    /// The sorted position of `key`.
    #[must_use]
    pub fn index_of(&self, key: &K) -> Option<usize> {
        self.tree.index_of(key)
    }

    /// Drops every entry.
    pub fn clear(&mut self) {
        self.tree.clear();
    }

    /// Iterates entries in key order.
    pub fn iter(&self) -> impl ExactSizeIterator<Item = (&K, &V)> {
        self.tree.iter().map(|(key, value)| (key, value))
    }

    /// Iterates keys in order.
    pub fn keys(&self) -> impl ExactSizeIterator<Item = &K> {
        self.tree.iter().map(|(key, _)| key)
    }

    /// Iterates values in key order.
    pub fn values(&self) -> impl ExactSizeIterator<Item = &V> {
        self.tree.iter().map(|(_, value)| value)
    }
}

impl<K, V, C: Comparator<K>> core::ops::Index<&K> for SortedMap<K, V, C> {
    type Output = V;

    fn index(&self, key: &K) -> &V {
        match self.try_get(key) {
            Ok(value) => value,
            Err(_) => panic!("key not found"),
        }
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;
    use alloc::string::String;
    use alloc::vec::Vec;
    use pretty_assertions::assert_eq;

    #[test]
    fn insert_returns_the_displaced_value() {
        let mut map: SortedMap<&str, i32> = SortedMap::new();
        assert_eq!(map.insert("a", 1), Ok(None));
        assert_eq!(map.insert("a", 2), Ok(Some(1)));
        assert_eq!(map.get(&"a"), Some(&2));
        assert_eq!(map.len(), 1);
    }

    #[test]
    fn try_get_fails_on_a_missing_key() {
        let mut map: SortedMap<&str, i32> = SortedMap::new();
        map.insert("a", 1).unwrap();
        assert_eq!(map.try_get(&"a"), Ok(&1));
        assert_eq!(map.try_get(&"b"), Err(Error::KeyNotFound));
    }

    #[test]
    fn overwrite_keeps_the_first_key() {
        let case_insensitive =
            |a: &String, b: &String| a.to_ascii_lowercase().cmp(&b.to_ascii_lowercase());
        let mut map = SortedMap::with_comparator(case_insensitive);

        map.insert(String::from("a"), 1).unwrap();
        map.insert(String::from("A"), 6).unwrap();

        assert_eq!(map.len(), 1);
        assert_eq!(map.get_by_index(0), Some((&String::from("a"), &6)));
    }

    #[test]
    fn positional_and_keyed_access_agree() {
        let mut map: SortedMap<i32, i32> = SortedMap::new();
        for i in [3, 1, 4, 1, 5, 9, 2, 6] {
            let _ = map.insert(i, i * 10).unwrap();
        }

        assert_eq!(map.len(), 7);
        assert_eq!(map.keys().copied().collect::<Vec<_>>(), [1, 2, 3, 4, 5, 6, 9]);
        for (index, key) in [1, 2, 3, 4, 5, 6, 9].into_iter().enumerate() {
            assert_eq!(map.get_by_index(index), Some((&key, &(key * 10))));
            assert_eq!(map.index_of(&key), Some(index));
        }

        assert_eq!(map.remove_at(0), Ok((1, 10)));
        assert_eq!(map.remove(&9), Some(90));
        assert_eq!(map.first(), Some((&2, &20)));
        assert_eq!(map.last(), Some((&6, &60)));
    }

    #[test]
    fn from_entries_keeps_the_first_duplicate() {
        let map: SortedMap<i32, &str> =
            SortedMap::from_entries([(1, "a"), (2, "b"), (1, "c")].into()).unwrap();
        assert_eq!(map.len(), 2);
        assert_eq!(map.get(&1), Some(&"a"));
    }

    #[test]
    fn get_mut_updates_in_place() {
        let mut map: SortedMap<i32, i32> = SortedMap::new();
        map.insert(1, 1).unwrap();
        *map.get_mut(&1).unwrap() += 10;
        assert_eq!(map[&1], 11);
    }

    #[test]
    #[should_panic(expected = "key not found")]
    fn index_panics_on_a_missing_key() {
        let map: SortedMap<i32, i32> = SortedMap::new();
        let _ = map[&1];
    }
}
