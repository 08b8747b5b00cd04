//! A duplicate-retaining sorted sequence with positional access.

use alloc::vec::Vec;

use crate::compare::{Comparator, NaturalOrder};
use crate::error::Result;
use crate::tree::node::{DuplicateHandling, KeyOnly};
use crate::tree::scapegoat::ScapegoatTree;
use crate::tree::Iter;

/// A list that keeps its elements in sorted order, duplicates included.
///
/// Backed by a [`ScapegoatTree`], so insertion and removal are
/// O(log n) amortized while positional access stays O(log n) worst
/// case. Equal elements keep no particular order among themselves.
///
/// # Example
///
/// ```
/// use sorted_forest::SortedList;
///
/// let mut list: SortedList<i32> = SortedList::new();
/// list.add(3).unwrap();
/// list.add(1).unwrap();
/// list.add(3).unwrap();
///
/// assert_eq!(list.len(), 3);
/// assert_eq!(list[0], 1);
/// assert_eq!(list.index_of(&3), Some(1));
/// ```
pub struct SortedList<T, C: Comparator<T> = NaturalOrder> {
    tree: ScapegoatTree<KeyOnly<T>, C>,
}

impl<T, C: Comparator<T> + Default> SortedList<T, C> {
    /// Creates an empty list ordered by the default comparator.
    #[must_use]
    pub fn new() -> Self {
        Self::with_comparator(C::default())
    }

    /// Builds a list from the full dataset in one linear pass,
    /// retaining duplicates.
    ///
    /// # Errors
    ///
    /// [`Error::CollectionFull`](crate::Error::CollectionFull) when the
    /// input exceeds capacity.
    pub fn from_items(items: Vec<T>) -> Result<Self> {
        let tree = ScapegoatTree::from_items(items, DuplicateHandling::KeepAll)?;
        Ok(SortedList { tree })
    }
}

impl<T, C: Comparator<T> + Default> Default for SortedList<T, C> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T, C: Comparator<T>> SortedList<T, C> {
    /// Creates an empty list ordered by `comparator`.
    #[must_use]
    pub fn with_comparator(comparator: C) -> Self {
        SortedList { tree: ScapegoatTree::with_comparator(comparator) }
    }

    /// The number of elements.
    #[must_use]
    pub fn len(&self) -> usize {
        self.tree.len()
    }

    /// Returns `true` if the list holds no elements.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tree.is_empty()
    }

    /// The active comparator.
    pub fn comparator(&self) -> &C {
        self.tree.comparator()
    }

    /// Adds `item` at its sorted position. Equal elements are retained.
    ///
    /// # Errors
    ///
    /// [`Error::CollectionFull`](crate::Error::CollectionFull) at
    /// capacity.
    pub fn add(&mut self, item: T) -> Result<()> {
        self.tree.insert(item, DuplicateHandling::KeepAll)?;
        Ok(())
    }

    /// Removes one element equal to `item`. Returns `true` when an
    /// element was removed.
    pub fn remove(&mut self, item: &T) -> bool {
        self.tree.remove(item).is_some()
    }

    /// Removes and returns the element at `index` in sorted order.
    ///
    /// # Errors
    ///
    /// [`Error::IndexOutOfRange`](crate::Error::IndexOutOfRange) when
    /// `index >= len`.
    pub fn remove_at(&mut self, index: usize) -> Result<T> {
        self.tree.remove_at(index)
    }

    /// Borrows the element at `index` in sorted order.
    #[must_use]
    pub fn get(&self, index: usize) -> Option<&T> {
        self.tree.at(index).ok()
    }

    /// Borrows the smallest element.
    #[must_use]
    pub fn first(&self) -> Option<&T> {
        self.tree.min().ok()
    }

    /// Borrows the largest element.
    #[must_use]
    pub fn last(&self) -> Option<&T> {
        self.tree.max().ok()
    }

    /// Returns `true` if an element equal to `item` is present.
    #[must_use]
    pub fn contains(&self, item: &T) -> bool {
        self.tree.contains_key(item)
    }

    /// The sorted position of the first element equal to `item`.
    #[must_use]
    pub fn index_of(&self, item: &T) -> Option<usize> {
        self.tree.index_of(item)
    }

    /// Drops every element.
    pub fn clear(&mut self) {
        self.tree.clear();
    }

    /// Iterates elements in sorted order.
    pub fn iter(&self) -> Iter<'_, KeyOnly<T>> {
        self.tree.iter()
    }
}

impl<T, C: Comparator<T>> core::ops::Index<usize> for SortedList<T, C> {
    type Output = T;

    fn index(&self, index: usize) -> &T {
        match self.get(index) {
            Some(item) => item,
            None => panic!("index {index} out of range for length {}", self.len()),
        }
    }
}

impl<'a, T, C: Comparator<T>> IntoIterator for &'a SortedList<T, C> {
    type Item = &'a T;
    type IntoIter = Iter<'a, KeyOnly<T>>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<T: Ord> FromIterator<T> for SortedList<T> {
    /// Builds via the linear-time bulk path. Panics only at the
    /// capacity limit, which `Vec` cannot reach first.
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        match Self::from_items(iter.into_iter().collect()) {
            Ok(list) => list,
            Err(error) => panic!("building a sorted list failed: {error}"),
        }
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;
    use alloc::vec::Vec;
    use pretty_assertions::assert_eq;

    #[test]
    fn keeps_duplicates_in_sorted_order() {
        let mut list: SortedList<i32> = SortedList::new();
        for i in [5, 3, 5, 1, 5] {
            list.add(i).unwrap();
        }

        assert_eq!(list.len(), 5);
        assert_eq!(list.iter().copied().collect::<Vec<_>>(), [1, 3, 5, 5, 5]);
        assert_eq!(list.index_of(&5), Some(2));
        assert_eq!(list.first(), Some(&1));
        assert_eq!(list.last(), Some(&5));
    }

    #[test]
    fn remove_drops_one_occurrence() {
        let mut list: SortedList<i32> = SortedList::from_items([2, 1, 2, 3].into()).unwrap();
        assert!(list.remove(&2));
        assert!(list.contains(&2));
        assert!(list.remove(&2));
        assert!(!list.contains(&2));
        assert!(!list.remove(&2));
        assert_eq!(list.iter().copied().collect::<Vec<_>>(), [1, 3]);
    }

    #[test]
    fn positional_access_and_removal() {
        let mut list: SortedList<i32> = (0..10).collect();
        assert_eq!(list[7], 7);
        assert_eq!(list.get(10), None);
        assert_eq!(list.remove_at(0), Ok(0));
        assert_eq!(list[0], 1);
    }

    #[test]
    #[should_panic(expected = "out of range")]
    fn index_panics_past_the_end() {
        let list: SortedList<i32> = (0..3).collect();
        let _ = list[3];
    }

    #[test]
    fn custom_comparator_orders_descending() {
        let descending = |a: &i32, b: &i32| b.cmp(a);
        let mut list = SortedList::with_comparator(descending);
        for i in [1, 3, 2] {
            list.add(i).unwrap();
        }
        assert_eq!(list.iter().copied().collect::<Vec<_>>(), [3, 2, 1]);
    }
}
