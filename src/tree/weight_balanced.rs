//! The primary balancing strategy: a weight-balanced binary search tree.
//!
//! Balance is the WB(3, 2) criterion maintained by the rotation engine in
//! [`rotations`](super::rotations): after every structural change along a
//! descent path, the ancestor whose subtree shifted is rebalanced with at
//! most one single or double rotation. Deletion replaces the removed node
//! by joining its children - the two subtrees are fully ordered relative to
//! each other, so the join needs no key comparisons at all.

use alloc::vec::Vec;

use crate::compare::{Comparator, NaturalOrder};
use crate::error::{Error, Result};

use super::bulk;
use super::iter::Iter;
use super::node::{DuplicateHandling, KeyOnly, KeyValue, Link, MAX_LEN, Node, NodeKind, size};
use super::rotations;
use super::search;

/// An ordered set of keys in a [`WeightBalancedTree`].
pub type WeightBalancedSet<K, C = NaturalOrder> = WeightBalancedTree<KeyOnly<K>, C>;

/// An ordered key-value map in a [`WeightBalancedTree`].
pub type WeightBalancedMap<K, V, C = NaturalOrder> = WeightBalancedTree<KeyValue<K, V>, C>;

/// An ordered, index-addressable collection balanced by subtree weight.
///
/// All mutation is O(log n) worst case; every node carries its subtree
/// size, so access by sorted position ([`at`](Self::at),
/// [`remove_at`](Self::remove_at), [`index_of`](Self::index_of)) is
/// O(log n) as well.
///
/// # Example
///
/// ```
/// use sorted_forest::{DuplicateHandling, WeightBalancedMap};
///
/// let mut map: WeightBalancedMap<&str, i32> = WeightBalancedMap::new();
/// map.insert(("b", 2), DuplicateHandling::RejectDuplicate).unwrap();
/// map.insert(("a", 1), DuplicateHandling::RejectDuplicate).unwrap();
///
/// assert_eq!(map.get(&"a"), Some(&("a", 1)));
/// assert_eq!(map.at(1), Ok(&("b", 2)));
/// ```
pub struct WeightBalancedTree<D: NodeKind, C: Comparator<D::Key> = NaturalOrder> {
    root: Link<D>,
    comparator: C,
}

impl<D: NodeKind, C: Comparator<D::Key> + Default> WeightBalancedTree<D, C> {
    /// Creates an empty tree ordered by the default comparator.
    #[must_use]
    pub fn new() -> Self {
        Self::with_comparator(C::default())
    }

    /// Builds a tree from the full dataset in one pass: sort, apply the
    /// duplicate policy, then construct a perfectly balanced shape in
    /// O(n). See [`DuplicateHandling`] for the policy semantics;
    /// [`DuplicateHandling::Overwrite`] is rejected here.
    ///
    /// # Errors
    ///
    /// [`Error::DuplicateKey`], [`Error::UnsupportedPolicy`] or
    /// [`Error::CollectionFull`] per the policy rules.
    pub fn from_items(items: Vec<D::Item>, duplicate_handling: DuplicateHandling) -> Result<Self> {
        Self::from_items_with_comparator(items, C::default(), duplicate_handling)
    }
}

impl<D: NodeKind, C: Comparator<D::Key> + Default> Default for WeightBalancedTree<D, C> {
    fn default() -> Self {
        Self::new()
    }
}

impl<D: NodeKind, C: Comparator<D::Key>> WeightBalancedTree<D, C> {
    /// Creates an empty tree ordered by `comparator`.
    #[must_use]
    pub fn with_comparator(comparator: C) -> Self {
        WeightBalancedTree { root: None, comparator }
    }

    /// As [`from_items`](Self::from_items), ordered by `comparator`.
    ///
    /// # Errors
    ///
    /// [`Error::DuplicateKey`], [`Error::UnsupportedPolicy`] or
    /// [`Error::CollectionFull`] per the policy rules.
    pub fn from_items_with_comparator(items: Vec<D::Item>, comparator: C, duplicate_handling: DuplicateHandling) -> Result<Self> {
        let root = bulk::build_from::<D, C>(items, &comparator, duplicate_handling)?;
        Ok(WeightBalancedTree { root, comparator })
    }

    /// The number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        size(&self.root)
    }

    /// Returns `true` if the tree holds no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.root.is_none()
    }

    /// The active comparator.
    pub fn comparator(&self) -> &C {
        &self.comparator
    }

    /// Drops every entry.
    pub fn clear(&mut self) {
        self.root = None;
    }

    /// Inserts `item`, resolving an equal-key encounter per
    /// `duplicate_handling`. Returns `true` when a new entry was added
    /// (`false` for the no-op and overwrite outcomes).
    ///
    /// # Errors
    ///
    /// [`Error::DuplicateKey`] under
    /// [`DuplicateHandling::RejectDuplicate`], [`Error::CollectionFull`]
    /// at capacity. A failed insert leaves the tree untouched.
    pub fn insert(&mut self, item: D::Item, duplicate_handling: DuplicateHandling) -> Result<bool> {
        let count = self.len();
        let WeightBalancedTree { root, comparator } = self;
        Self::insert_into(comparator, count, root, item, duplicate_handling)
    }

    fn insert_into(comparator: &C, count: usize, slot: &mut Link<D>, item: D::Item, duplicate_handling: DuplicateHandling) -> Result<bool> {
        let Some(node) = slot.as_deref_mut() else {
            // Capacity limits fresh node creation only; a policy no-op or
            // overwrite on an existing key is never refused.
            if count >= MAX_LEN {
                return Err(Error::CollectionFull);
            }
            *slot = Some(Node::new(item));
            return Ok(true);
        };

        let mut ordering = comparator.compare(D::key(&item), node.key());
        if ordering == core::cmp::Ordering::Equal {
            match duplicate_handling {
                DuplicateHandling::RejectDuplicate => return Err(Error::DuplicateKey),
                DuplicateHandling::KeepFirst => return Ok(false),
                DuplicateHandling::Overwrite => {
                    // The stored key stays; only the value is replaced.
                    D::set_value(&mut node.item, D::into_value(item));
                    return Ok(false);
                }
                DuplicateHandling::KeepAll => {
                    // Duplicates go to the smaller side to maintain balance.
                    ordering = if size(&node.left) <= size(&node.right) {
                        core::cmp::Ordering::Less
                    } else {
                        core::cmp::Ordering::Greater
                    };
                }
            }
        }

        if ordering == core::cmp::Ordering::Greater {
            let added = Self::insert_into(comparator, count, &mut node.right, item, duplicate_handling)?;
            if added {
                node.recalculate_count();
                rotations::balance_left(slot);
            }
            Ok(added)
        } else {
            let added = Self::insert_into(comparator, count, &mut node.left, item, duplicate_handling)?;
            if added {
                node.recalculate_count();
                rotations::balance_right(slot);
            }
            Ok(added)
        }
    }

    /// Removes one entry with an equal key and returns its payload, or
    /// `None` when no key matches (a normal outcome, not an error).
    pub fn remove(&mut self, key: &D::Key) -> Option<D::Item> {
        let WeightBalancedTree { root, comparator } = self;
        Self::remove_from(comparator, root, key)
    }

    fn remove_from(comparator: &C, slot: &mut Link<D>, key: &D::Key) -> Option<D::Item> {
        let node = slot.as_deref_mut()?;
        match comparator.compare(key, node.key()) {
            core::cmp::Ordering::Less => {
                let removed = Self::remove_from(comparator, &mut node.left, key);
                if removed.is_some() {
                    node.count -= 1;
                    rotations::balance_left(slot);
                }
                removed
            }
            core::cmp::Ordering::Greater => {
                let removed = Self::remove_from(comparator, &mut node.right, key);
                if removed.is_some() {
                    node.count -= 1;
                    rotations::balance_right(slot);
                }
                removed
            }
            core::cmp::Ordering::Equal => {
                let unlinked = slot.take().expect("matched a present node");
                let Node { item, left, right, .. } = *unlinked;
                *slot = Self::join(left, right);
                Some(item)
            }
        }
    }

    /// Removes the entry at `index` in sorted order and returns its
    /// payload.
    ///
    /// # Errors
    ///
    /// [`Error::IndexOutOfRange`] when `index >= len`.
    pub fn remove_at(&mut self, index: usize) -> Result<D::Item> {
        if index >= self.len() {
            return Err(Error::IndexOutOfRange);
        }
        Ok(Self::remove_at_from(&mut self.root, index))
    }

    fn remove_at_from(slot: &mut Link<D>, index: usize) -> D::Item {
        let node = slot.as_deref_mut().expect("index within subtree");
        let left_count = size(&node.left);
        if index < left_count {
            let item = Self::remove_at_from(&mut node.left, index);
            node.count -= 1;
            rotations::balance_left(slot);
            item
        } else if index > left_count {
            let item = Self::remove_at_from(&mut node.right, index - left_count - 1);
            node.count -= 1;
            rotations::balance_right(slot);
            item
        } else {
            let unlinked = slot.take().expect("matched a present node");
            let Node { item, left, right, .. } = *unlinked;
            *slot = Self::join(left, right);
            item
        }
    }

    /// Merges two subtrees known to be fully ordered before/after each
    /// other, without key comparisons. Recurses into whichever side has
    /// the larger outer grandchild to keep the result shallow.
    fn join(left: Link<D>, right: Link<D>) -> Link<D> {
        let Some(mut left) = left else { return right };
        let Some(mut right) = right else { return Some(left) };

        if size(&left.left) > size(&right.right) {
            let detached = left.right.take();
            left.right = Self::join(detached, Some(right));
            left.recalculate_count();
            let mut joined = Some(left);
            rotations::balance_left(&mut joined);
            joined
        } else {
            let detached = right.left.take();
            right.left = Self::join(Some(left), detached);
            right.recalculate_count();
            let mut joined = Some(right);
            rotations::balance_right(&mut joined);
            joined
        }
    }

    /// Borrows the payload stored under an equal key.
    #[must_use]
    pub fn get(&self, key: &D::Key) -> Option<&D::Item> {
        search::find(&self.root, &self.comparator, key).map(|node| &node.item)
    }

    /// Mutably borrows the value stored under an equal key. The key itself
    /// is not reachable mutably; changing it would break the ordering
    /// invariant.
    #[must_use]
    pub fn value_mut(&mut self, key: &D::Key) -> Option<&mut D::Value> {
        let WeightBalancedTree { root, comparator } = self;
        search::find_mut(root, comparator, key).map(D::value_mut)
    }

    /// Returns `true` if an entry with an equal key is present.
    #[must_use]
    pub fn contains_key(&self, key: &D::Key) -> bool {
        search::find(&self.root, &self.comparator, key).is_some()
    }

    /// Borrows the payload at `index` in sorted order.
    ///
    /// # Errors
    ///
    /// [`Error::IndexOutOfRange`] when `index >= len`.
    pub fn at(&self, index: usize) -> Result<&D::Item> {
        search::node_at(&self.root, index).map(|node| &node.item)
    }

    /// Replaces the value of the entry at `index` in sorted order.
    ///
    /// # Errors
    ///
    /// [`Error::IndexOutOfRange`] when `index >= len`.
    pub fn set_value_at(&mut self, index: usize, value: D::Value) -> Result<()> {
        let item = search::item_at_mut(&mut self.root, index)?;
        D::set_value(item, value);
        Ok(())
    }

    /// Borrows the payload with the smallest key.
    ///
    /// # Errors
    ///
    /// [`Error::EmptyCollection`] when the tree is empty.
    pub fn min(&self) -> Result<&D::Item> {
        search::min(&self.root)
    }

    /// Borrows the payload with the largest key.
    ///
    /// # Errors
    ///
    /// [`Error::EmptyCollection`] when the tree is empty.
    pub fn max(&self) -> Result<&D::Item> {
        search::max(&self.root)
    }

    /// The sorted position of the first entry with an equal key.
    #[must_use]
    pub fn index_of(&self, key: &D::Key) -> Option<usize> {
        search::index_of(&self.root, &self.comparator, key)
    }

    /// Iterates payloads in sorted order.
    pub fn iter(&self) -> Iter<'_, D> {
        Iter::new(&self.root)
    }

    /// Validates every structural invariant - ordering, exact counts, and
    /// WB(3, 2) weight balance at each node - panicking on the first
    /// violation. Intended for test harnesses.
    pub fn check_invariants(&self) {
        let _ = search::check_node_invariants(&self.root, &self.comparator);
        Self::check_balance(&self.root);
    }

    fn check_balance(link: &Link<D>) {
        if let Some(node) = link.as_deref() {
            let left = size(&node.left);
            let right = size(&node.right);
            assert!(
                rotations::is_balanced(left, right) && rotations::is_balanced(right, left),
                "weight balance violated: left {left}, right {right}"
            );
            Self::check_balance(&node.left);
            Self::check_balance(&node.right);
        }
    }
}

impl<'a, D: NodeKind, C: Comparator<D::Key>> IntoIterator for &'a WeightBalancedTree<D, C> {
    type Item = &'a D::Item;
    type IntoIter = Iter<'a, D>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;
    use alloc::string::String;
    use alloc::vec::Vec;
    use core::fmt::Write as _;
    use pretty_assertions::assert_eq;

    fn two_digit(i: usize) -> String {
        let mut s = String::new();
        write!(s, "{i:02}").unwrap();
        s
    }

    #[test]
    fn insert_applies_each_policy() {
        let mut tree: WeightBalancedMap<i32, i32> = WeightBalancedMap::new();

        assert_eq!(tree.insert((1, 10), DuplicateHandling::RejectDuplicate), Ok(true));
        assert_eq!(tree.len(), 1);
        assert_eq!(tree.insert((1, 11), DuplicateHandling::RejectDuplicate), Err(Error::DuplicateKey));
        assert_eq!(tree.get(&1), Some(&(1, 10)));

        assert_eq!(tree.insert((1, 12), DuplicateHandling::KeepFirst), Ok(false));
        assert_eq!(tree.get(&1), Some(&(1, 10)));

        assert_eq!(tree.insert((1, 13), DuplicateHandling::Overwrite), Ok(false));
        assert_eq!(tree.get(&1), Some(&(1, 13)));

        assert_eq!(tree.insert((1, 14), DuplicateHandling::KeepAll), Ok(true));
        assert_eq!(tree.len(), 2);
        tree.check_invariants();
    }

    #[test]
    fn capacity_refuses_only_fresh_nodes() {
        let mut tree: WeightBalancedMap<i32, i32> = WeightBalancedMap::new();
        tree.insert((1, 10), DuplicateHandling::RejectDuplicate).unwrap();

        // A full tree still resolves existing-key policies; only node
        // creation is refused.
        let WeightBalancedTree { root, comparator } = &mut tree;
        assert_eq!(
            WeightBalancedTree::insert_into(comparator, MAX_LEN, root, (1, 11), DuplicateHandling::Overwrite),
            Ok(false)
        );
        assert_eq!(
            WeightBalancedTree::insert_into(comparator, MAX_LEN, root, (2, 20), DuplicateHandling::Overwrite),
            Err(Error::CollectionFull)
        );
        assert_eq!(tree.get(&1), Some(&(1, 11)));
        assert_eq!(tree.len(), 1);
    }

    #[test]
    fn overwrite_keeps_the_stored_key() {
        let case_insensitive =
            |a: &&str, b: &&str| a.to_ascii_lowercase().cmp(&b.to_ascii_lowercase());
        let mut tree: WeightBalancedMap<&str, i32, _> = WeightBalancedMap::with_comparator(case_insensitive);

        tree.insert(("a", 1), DuplicateHandling::Overwrite).unwrap();
        tree.insert(("A", 6), DuplicateHandling::Overwrite).unwrap();

        assert_eq!(tree.len(), 1);
        assert_eq!(tree.get(&"A"), Some(&("a", 6)));
    }

    #[test]
    fn ordered_inserts_stay_balanced_and_indexed() {
        let mut tree: WeightBalancedMap<String, usize> = WeightBalancedMap::new();
        for i in 0..100 {
            tree.insert((two_digit(i), i), DuplicateHandling::RejectDuplicate).unwrap();
        }
        tree.check_invariants();

        for i in 0..100 {
            let (key, value) = tree.at(i).unwrap();
            assert_eq!(*key, two_digit(i));
            assert_eq!(*value, i);
        }

        tree.set_value_at(55, usize::MAX).unwrap();
        assert_eq!(tree.get(&two_digit(55)), Some(&(two_digit(55), usize::MAX)));
    }

    #[test]
    fn min_and_max_follow_the_spines() {
        let mut tree: WeightBalancedSet<i32> = WeightBalancedSet::new();
        assert_eq!(tree.min(), Err(Error::EmptyCollection));
        assert_eq!(tree.max(), Err(Error::EmptyCollection));

        for i in (0..100).rev() {
            tree.insert(i, DuplicateHandling::RejectDuplicate).unwrap();
        }
        assert_eq!(tree.min(), Ok(&0));
        assert_eq!(tree.max(), Ok(&99));
    }

    #[test]
    fn remove_by_key_handles_duplicates() {
        let mut tree: WeightBalancedSet<i32> = WeightBalancedSet::new();
        for i in [1, 2, 3, 4, 5, 6, 7, 6, 5, 4, 3, 2, 1] {
            tree.insert(i, DuplicateHandling::KeepAll).unwrap();
        }

        assert_eq!(tree.remove(&1), Some(1));
        assert!(tree.contains_key(&1));
        assert_eq!(tree.remove(&1), Some(1));
        assert_eq!(tree.len(), 11);
        assert!(!tree.contains_key(&1));
        assert_eq!(tree.remove(&1), None);
        assert_eq!(tree.len(), 11);

        assert_eq!(tree.remove(&8), None);
        assert_eq!(tree.len(), 11);

        assert_eq!(tree.remove(&7), Some(7));
        assert_eq!(tree.len(), 10);
        assert!(!tree.contains_key(&7));

        tree.check_invariants();
    }

    #[test]
    fn remove_by_index_prunes_the_selected_entry() {
        let mut tree: WeightBalancedSet<i32> = WeightBalancedSet::new();
        for i in [1, 2, 3, 4, 5] {
            tree.insert(i, DuplicateHandling::RejectDuplicate).unwrap();
        }

        assert_eq!(tree.remove_at(tree.len()), Err(Error::IndexOutOfRange));

        assert_eq!(tree.remove_at(1), Ok(2));
        assert_eq!(tree.len(), 4);
        assert!(!tree.contains_key(&2));
        tree.check_invariants();

        assert_eq!(tree.remove_at(3), Ok(5));
        assert_eq!(tree.len(), 3);
        assert!(!tree.contains_key(&5));
        tree.check_invariants();
    }

    #[test]
    fn index_access_after_sequential_inserts() {
        let mut tree: WeightBalancedSet<i32> = WeightBalancedSet::new();
        for i in 1..=5 {
            tree.insert(i, DuplicateHandling::RejectDuplicate).unwrap();
        }
        assert_eq!(tree.len(), 5);
        assert_eq!(tree.at(2), Ok(&3));
        assert_eq!(tree.insert(3, DuplicateHandling::RejectDuplicate), Err(Error::DuplicateKey));
    }

    #[test]
    fn index_of_reports_the_first_duplicate() {
        let mut tree: WeightBalancedSet<i32> = WeightBalancedSet::new();
        for i in [5, 3, 3, 3, 1] {
            tree.insert(i, DuplicateHandling::KeepAll).unwrap();
        }
        assert_eq!(tree.index_of(&1), Some(0));
        assert_eq!(tree.index_of(&3), Some(1));
        assert_eq!(tree.index_of(&5), Some(4));
        assert_eq!(tree.index_of(&2), None);
    }

    #[test]
    fn bulk_construction_matches_incremental() {
        let items: Vec<i32> = (0..64).rev().collect();
        let bulk = WeightBalancedSet::<i32>::from_items(items, DuplicateHandling::RejectDuplicate).unwrap();
        bulk.check_invariants();
        assert_eq!(bulk.len(), 64);
        assert_eq!(bulk.iter().copied().collect::<Vec<_>>(), (0..64).collect::<Vec<_>>());
    }
}
