//! A probabilistic balancing strategy: the randomized binary search tree.
//!
//! No balance criterion is maintained at all. Instead, every insert
//! becomes the root of the subtree it lands in with probability
//! `1 / (n + 1)`, which makes the resulting shape distributed exactly
//! as if the keys had been inserted in uniformly random order. The
//! expected depth is O(log n) regardless of the input order; there is
//! no worst-case bound.
//!
//! Randomness comes from the shared xorshift generator in
//! [`random`](super::random), seeded per tree so that runs are
//! reproducible.

use alloc::boxed::Box;
use alloc::vec::Vec;

use crate::compare::{Comparator, NaturalOrder};
use crate::error::{Error, Result};

use super::bulk;
use super::iter::Iter;
use super::node::{DuplicateHandling, KeyOnly, KeyValue, Link, MAX_LEN, Node, NodeKind, size};
use super::random;
use super::search;

/// An ordered set of keys in a [`RandomizedTree`].
pub type RandomizedSet<K, C = NaturalOrder> = RandomizedTree<KeyOnly<K>, C>;

/// An ordered key-value map in a [`RandomizedTree`].
pub type RandomizedMap<K, V, C = NaturalOrder> = RandomizedTree<KeyValue<K, V>, C>;

/// An ordered, index-addressable collection kept shallow by randomized
/// root insertion.
///
/// All operations are O(log n) in expectation. Nodes carry only their
/// subtree size, so the per-node overhead matches the scapegoat
/// strategy, and the structure never needs an O(n) rebuild.
///
/// # Example
///
/// ```
/// use sorted_forest::{DuplicateHandling, RandomizedSet};
///
/// let mut set: RandomizedSet<i32> = RandomizedSet::new();
/// for i in 0..100 {
///     set.insert(i, DuplicateHandling::RejectDuplicate).unwrap();
/// }
/// assert_eq!(set.at(42), Ok(&42));
/// ```
pub struct RandomizedTree<D: NodeKind, C: Comparator<D::Key> = NaturalOrder> {
    root: Link<D>,
    comparator: C,
    state: u32,
}

impl<D: NodeKind, C: Comparator<D::Key> + Default> RandomizedTree<D, C> {
    /// Creates an empty tree ordered by the default comparator.
    #[must_use]
    pub fn new() -> Self {
        Self::with_comparator(C::default())
    }

    /// Builds a perfectly balanced tree from the full dataset in one
    /// pass. See [`DuplicateHandling`] for the policy semantics;
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

impl<D: NodeKind, C: Comparator<D::Key> + Default> Default for RandomizedTree<D, C> {
    fn default() -> Self {
        Self::new()
    }
}

impl<D: NodeKind, C: Comparator<D::Key>> RandomizedTree<D, C> {
    /// Creates an empty tree ordered by `comparator`.
    #[must_use]
    pub fn with_comparator(comparator: C) -> Self {
        Self::with_comparator_and_seed(comparator, 0)
    }

    /// As [`with_comparator`](Self::with_comparator), with an explicit
    /// generator seed. Two trees given the same seed and the same
    /// operation sequence take identical shapes.
    #[must_use]
    pub fn with_comparator_and_seed(comparator: C, seed: u32) -> Self {
        RandomizedTree { root: None, comparator, state: seed }
    }

    /// As [`from_items`](Self::from_items), ordered by `comparator`.
    ///
    /// # Errors
    ///
    /// [`Error::DuplicateKey`], [`Error::UnsupportedPolicy`] or
    /// [`Error::CollectionFull`] per the policy rules.
    pub fn from_items_with_comparator(items: Vec<D::Item>, comparator: C, duplicate_handling: DuplicateHandling) -> Result<Self> {
        let root = bulk::build_from::<D, C>(items, &comparator, duplicate_handling)?;
        Ok(RandomizedTree { root, comparator, state: 0 })
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

    /// Drops every entry. The generator state is kept; clearing does
    /// not replay the shapes of a previous run.
    pub fn clear(&mut self) {
        self.root = None;
    }

    /// Inserts `item`, resolving an equal-key encounter per
    /// `duplicate_handling`. Returns `true` when a new entry was added
    /// (`false` for the no-op and overwrite outcomes).
    ///
    /// Duplicate detection happens in a lookup before the probabilistic
    /// descent, since a root insertion splits subtrees apart before it
    /// could encounter the matching key.
    ///
    /// # Errors
    ///
    /// [`Error::DuplicateKey`] under
    /// [`DuplicateHandling::RejectDuplicate`], [`Error::CollectionFull`]
    /// at capacity. A failed insert leaves the tree untouched.
    pub fn insert(&mut self, item: D::Item, duplicate_handling: DuplicateHandling) -> Result<bool> {
        let count = self.len();
        let RandomizedTree { root, comparator, state } = self;
        Self::insert_into(comparator, state, count, root, item, duplicate_handling)
    }

    fn insert_into(
        comparator: &C,
        state: &mut u32,
        count: usize,
        slot: &mut Link<D>,
        item: D::Item,
        duplicate_handling: DuplicateHandling,
    ) -> Result<bool> {
        match duplicate_handling {
            DuplicateHandling::RejectDuplicate => {
                if search::find(slot, comparator, D::key(&item)).is_some() {
                    return Err(Error::DuplicateKey);
                }
            }
            DuplicateHandling::KeepFirst => {
                if search::find(slot, comparator, D::key(&item)).is_some() {
                    return Ok(false);
                }
            }
            DuplicateHandling::Overwrite => {
                if let Some(existing) = search::find_mut(slot, comparator, D::key(&item)) {
                    // The stored key stays; only the value is replaced.
                    D::set_value(existing, D::into_value(item));
                    return Ok(false);
                }
            }
            DuplicateHandling::KeepAll => {}
        }

        // Capacity limits fresh node creation only; a policy no-op or
        // overwrite on an existing key is never refused.
        if count >= MAX_LEN {
            return Err(Error::CollectionFull);
        }
        Self::insert_new(comparator, state, slot, item);
        Ok(true)
    }

    fn insert_new(comparator: &C, state: &mut u32, slot: &mut Link<D>, item: D::Item) {
        let Some(node) = slot.as_deref_mut() else {
            *slot = Some(Node::new(item));
            return;
        };

        if random::choose(node.count, state) {
            // Replace this subtree's root: split it around the new key
            // and hang the halves off a fresh node.
            let subtree = slot.take().expect("matched a present node");
            let (left, right) = Self::split(comparator, subtree, D::key(&item));
            let mut fresh = Node::new(item);
            fresh.left = left;
            fresh.right = right;
            fresh.recalculate_count();
            *slot = Some(fresh);
            return;
        }

        node.count += 1;
        if comparator.compare(D::key(&item), node.key()) == core::cmp::Ordering::Less {
            Self::insert_new(comparator, state, &mut node.left, item);
        } else {
            Self::insert_new(comparator, state, &mut node.right, item);
        }
    }

    /// Splits `node`'s subtree around `key`: everything ordered at or
    /// before `key` lands in the left result, everything after in the
    /// right, with counts repaired along both seams.
    fn split(comparator: &C, mut node: Box<Node<D>>, key: &D::Key) -> (Link<D>, Link<D>) {
        if comparator.compare(key, node.key()) == core::cmp::Ordering::Less {
            match node.left.take() {
                None => (None, Some(node)),
                Some(child) => {
                    let (left, back) = Self::split(comparator, child, key);
                    node.left = back;
                    node.recalculate_count();
                    (left, Some(node))
                }
            }
        } else {
            match node.right.take() {
                None => (Some(node), None),
                Some(child) => {
                    let (back, right) = Self::split(comparator, child, key);
                    node.right = back;
                    node.recalculate_count();
                    (Some(node), right)
                }
            }
        }
    }

    /// Removes one entry with an equal key and returns its payload, or
    /// `None` when no key matches (a normal outcome, not an error).
    pub fn remove(&mut self, key: &D::Key) -> Option<D::Item> {
        let RandomizedTree { root, comparator, state } = self;
        Self::remove_from(comparator, state, root, key)
    }

    fn remove_from(comparator: &C, state: &mut u32, slot: &mut Link<D>, key: &D::Key) -> Option<D::Item> {
        let node = slot.as_deref_mut()?;
        match comparator.compare(key, node.key()) {
            core::cmp::Ordering::Less => {
                let removed = Self::remove_from(comparator, state, &mut node.left, key);
                if removed.is_some() {
                    node.count -= 1;
                }
                removed
            }
            core::cmp::Ordering::Greater => {
                let removed = Self::remove_from(comparator, state, &mut node.right, key);
                if removed.is_some() {
                    node.count -= 1;
                }
                removed
            }
            core::cmp::Ordering::Equal => {
                let unlinked = slot.take().expect("matched a present node");
                let Node { item, left, right, .. } = *unlinked;
                *slot = Self::join(left, right, state);
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
        let RandomizedTree { root, state, .. } = self;
        Ok(Self::remove_at_from(state, root, index))
    }

    fn remove_at_from(state: &mut u32, slot: &mut Link<D>, index: usize) -> D::Item {
        let node = slot.as_deref_mut().expect("index within subtree");
        let left_count = size(&node.left);
        if index < left_count {
            node.count -= 1;
            Self::remove_at_from(state, &mut node.left, index)
        } else if index > left_count {
            node.count -= 1;
            Self::remove_at_from(state, &mut node.right, index - left_count - 1)
        } else {
            let unlinked = slot.take().expect("matched a present node");
            let Node { item, left, right, .. } = *unlinked;
            *slot = Self::join(left, right, state);
            item
        }
    }

    /// Merges two subtrees known to be fully ordered before/after each
    /// other. The root comes from either side with probability
    /// proportional to its size, which preserves the random-shape
    /// distribution across deletions.
    fn join(left: Link<D>, right: Link<D>, state: &mut u32) -> Link<D> {
        let Some(mut left) = left else { return right };
        let Some(mut right) = right else { return Some(left) };

        let total = left.count + right.count;
        if random::next_below(total, state) < left.count {
            let detached = left.right.take();
            left.right = Self::join(detached, Some(right), state);
            left.recalculate_count();
            Some(left)
        } else {
            let detached = right.left.take();
            right.left = Self::join(Some(left), detached, state);
            right.recalculate_count();
            Some(right)
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
        let RandomizedTree { root, comparator, .. } = self;
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

    /// Validates ordering and exact subtree counts, panicking on the
    /// first violation, and returns the maximum node depth (`None` for
    /// an empty tree). Shape is probabilistic, so depth carries no hard
    /// bound; callers judge it against the expectation.
    pub fn check_invariants(&self) -> Option<usize> {
        search::check_node_invariants(&self.root, &self.comparator)
    }
}

impl<'a, D: NodeKind, C: Comparator<D::Key>> IntoIterator for &'a RandomizedTree<D, C> {
    type Item = &'a D::Item;
    type IntoIter = Iter<'a, D>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
