//! An amortized balancing strategy: the scapegoat tree.
//!
//! No rotations and no per-node balance bookkeeping. Inserts descend
//! freely; when one lands deeper than the logarithmic bound allows, the
//! lowest weight-unbalanced ancestor (the scapegoat) has its whole
//! subtree rebuilt into perfect shape. Deletions only decrement counts
//! until the tree has shrunk below `ALPHA` times its high-water size,
//! at which point every unbalanced region is rebuilt at once.
//!
//! The rebuild itself runs in O(n) time and O(1) auxiliary space: the
//! subtree is first flattened into a linked list threaded through the
//! `left` pointers (destroying the old shape, which is being discarded
//! anyway), then reassembled bottom-up.

use alloc::boxed::Box;
use alloc::vec::Vec;

use crate::compare::{Comparator, NaturalOrder};
use crate::error::{Error, Result};

use super::bulk;
use super::iter::Iter;
use super::node::{DuplicateHandling, KeyOnly, KeyValue, Link, MAX_LEN, Node, NodeKind, size};
use super::search;

/// An ordered set of keys in a [`ScapegoatTree`].
pub type ScapegoatSet<K, C = NaturalOrder> = ScapegoatTree<KeyOnly<K>, C>;

/// An ordered key-value map in a [`ScapegoatTree`].
pub type ScapegoatMap<K, V, C = NaturalOrder> = ScapegoatTree<KeyValue<K, V>, C>;

/// The weight-balance factor. A node is a rebuild candidate when either
/// child subtree exceeds `ALPHA` times its own size.
const ALPHA: f64 = 0.693;

/// `LOG_TABLE[i]` is the lowest `x` for which `floor(log(x, 1 / ALPHA)) == i`.
/// Precomputing the depth thresholds keeps floating point out of the
/// insert path; the last entry covers every count up to `i32::MAX`.
const LOG_TABLE: [i64; 59] = [
    -1, 0, 3, 4, 5, 7, 10, 14, 19, 28, 40, 57, 82, 118, 170, 245, 354, 510, 736, 1062, 1533, 2212,
    3191, 4605, 6644, 9587, 13834, 19962, 28806, 41566, 59980, 86551, 124893, 180221, 260058,
    375264, 541507, 781395, 1127554, 1627062, 2347852, 3387954, 4888822, 7054576, 10179764,
    14689414, 21196845, 30587077, 44137196, 63690038, 91904816, 132618782, 191369094, 276145879,
    398478902, 575005630, 829733953, 1197307291, 1727716149,
];

/// An ordered, index-addressable collection balanced by amortized
/// subtree rebuilds.
///
/// Lookups are O(log n) worst case. Mutation is O(log n) amortized;
/// an individual insert or removal may trigger an O(n) rebuild, paid
/// for by the cheap operations before it. Per-node overhead is lower
/// than the rotating strategies since nodes carry no balance state
/// beyond the subtree size already needed for positional access.
///
/// # Example
///
/// ```
/// use sorted_forest::{DuplicateHandling, ScapegoatSet};
///
/// let mut set: ScapegoatSet<i32> = ScapegoatSet::new();
/// for i in 0..100 {
///     set.insert(i, DuplicateHandling::RejectDuplicate).unwrap();
/// }
/// assert_eq!(set.at(42), Ok(&42));
/// ```
pub struct ScapegoatTree<D: NodeKind, C: Comparator<D::Key> = NaturalOrder> {
    root: Link<D>,
    comparator: C,
    /// High-water entry count since the last full rebalance; removal
    /// triggers a rebalance once `len` falls to `ALPHA` times this.
    max_count: usize,
    /// Current position in [`LOG_TABLE`], maintained so that
    /// `LOG_TABLE[i] <= max_count < LOG_TABLE[i + 1]`. The depth bound
    /// is `i + 1`, valid for the high-water size until the next full
    /// rebalance.
    log_table_index: usize,
}

impl<D: NodeKind, C: Comparator<D::Key> + Default> ScapegoatTree<D, C> {
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

impl<D: NodeKind, C: Comparator<D::Key> + Default> Default for ScapegoatTree<D, C> {
    fn default() -> Self {
        Self::new()
    }
}

impl<D: NodeKind, C: Comparator<D::Key>> ScapegoatTree<D, C> {
    /// Creates an empty tree ordered by `comparator`.
    #[must_use]
    pub fn with_comparator(comparator: C) -> Self {
        ScapegoatTree { root: None, comparator, max_count: 0, log_table_index: log_index_for(0) }
    }

    /// As [`from_items`](Self::from_items), ordered by `comparator`.
    ///
    /// # Errors
    ///
    /// [`Error::DuplicateKey`], [`Error::UnsupportedPolicy`] or
    /// [`Error::CollectionFull`] per the policy rules.
    pub fn from_items_with_comparator(items: Vec<D::Item>, comparator: C, duplicate_handling: DuplicateHandling) -> Result<Self> {
        let root = bulk::build_from::<D, C>(items, &comparator, duplicate_handling)?;
        let count = size(&root);
        Ok(ScapegoatTree { root, comparator, max_count: count, log_table_index: log_index_for(count) })
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

    /// Drops every entry and resets the rebalance bookkeeping.
    pub fn clear(&mut self) {
        self.root = None;
        self.max_count = 0;
        self.log_table_index = log_index_for(0);
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
        let ScapegoatTree { root, comparator, log_table_index, .. } = self;
        let (added, _) =
            Self::insert_into(comparator, log_table_index, count, root, item, 0, duplicate_handling)?;
        if added {
            self.max_count = self.max_count.max(count + 1);
        }
        Ok(added)
    }

    /// Recursive insert. Returns `(added, needs_rebuild)`; the rebuild
    /// flag is raised when the new leaf landed below the depth bound
    /// and travels up until an ancestor heavy enough to blame is found
    /// and rebuilt.
    fn insert_into(
        comparator: &C,
        log_table_index: &mut usize,
        count: usize,
        slot: &mut Link<D>,
        item: D::Item,
        depth: usize,
        duplicate_handling: DuplicateHandling,
    ) -> Result<(bool, bool)> {
        let Some(node) = slot.as_deref_mut() else {
            // Capacity limits fresh node creation only; a policy no-op or
            // overwrite on an existing key is never refused.
            if count >= MAX_LEN {
                return Err(Error::CollectionFull);
            }
            *slot = Some(Node::new(item));
            // The tree just grew to count + 1; advance the log table
            // position first, then apply the depth bound.
            if *log_table_index < LOG_TABLE.len() - 1
                && (count + 1) as i64 >= LOG_TABLE[*log_table_index + 1]
            {
                *log_table_index += 1;
            }
            return Ok((true, depth > *log_table_index + 1));
        };

        let mut ordering = comparator.compare(D::key(&item), node.key());
        if ordering == core::cmp::Ordering::Equal {
            match duplicate_handling {
                DuplicateHandling::RejectDuplicate => return Err(Error::DuplicateKey),
                DuplicateHandling::KeepFirst => return Ok((false, false)),
                DuplicateHandling::Overwrite => {
                    // The stored key stays; only the value is replaced.
                    D::set_value(&mut node.item, D::into_value(item));
                    return Ok((false, false));
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
            let (added, needs_rebuild) = Self::insert_into(
                comparator, log_table_index, count, &mut node.right, item, depth + 1, duplicate_handling,
            )?;
            if added {
                node.count += 1;
                let child = size(&node.right);
                let parent = node.count;
                if needs_rebuild && !is_alpha_balanced(child, parent) {
                    Self::rebuild(slot);
                    return Ok((true, false));
                }
            }
            Ok((added, needs_rebuild))
        } else {
            let (added, needs_rebuild) = Self::insert_into(
                comparator, log_table_index, count, &mut node.left, item, depth + 1, duplicate_handling,
            )?;
            if added {
                node.count += 1;
                let child = size(&node.left);
                let parent = node.count;
                if needs_rebuild && !is_alpha_balanced(child, parent) {
                    Self::rebuild(slot);
                    return Ok((true, false));
                }
            }
            Ok((added, needs_rebuild))
        }
    }

    /// Removes one entry with an equal key and returns its payload, or
    /// `None` when no key matches (a normal outcome, not an error).
    pub fn remove(&mut self, key: &D::Key) -> Option<D::Item> {
        let ScapegoatTree { root, comparator, .. } = self;
        let removed = Self::remove_from(comparator, root, key);
        if removed.is_some() {
            self.shrink_after_removal();
        }
        removed
    }

    fn remove_from(comparator: &C, slot: &mut Link<D>, key: &D::Key) -> Option<D::Item> {
        let node = slot.as_deref_mut()?;
        match comparator.compare(key, node.key()) {
            core::cmp::Ordering::Less => {
                let removed = Self::remove_from(comparator, &mut node.left, key);
                if removed.is_some() {
                    node.count -= 1;
                }
                removed
            }
            core::cmp::Ordering::Greater => {
                let removed = Self::remove_from(comparator, &mut node.right, key);
                if removed.is_some() {
                    node.count -= 1;
                }
                removed
            }
            core::cmp::Ordering::Equal => Some(Self::delete(slot)),
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
        let item = Self::remove_at_from(&mut self.root, index);
        self.shrink_after_removal();
        Ok(item)
    }

    fn remove_at_from(slot: &mut Link<D>, index: usize) -> D::Item {
        let node = slot.as_deref_mut().expect("index within subtree");
        let left_count = size(&node.left);
        if index < left_count {
            node.count -= 1;
            Self::remove_at_from(&mut node.left, index)
        } else if index > left_count {
            node.count -= 1;
            Self::remove_at_from(&mut node.right, index - left_count - 1)
        } else {
            Self::delete(slot)
        }
    }

    /// Unlinks the node in `slot`, which must be occupied. An inner node
    /// keeps its slot but takes over the payload of its in-order
    /// neighbor from the heavier side, and that neighbor (which has at
    /// most one child) is unlinked instead.
    fn delete(slot: &mut Link<D>) -> D::Item {
        let node = slot.as_deref_mut().expect("deleting a present node");
        if node.left.is_some() && node.right.is_some() {
            node.count -= 1;
            let replacement = if size(&node.right) > size(&node.left) {
                Self::take_min(&mut node.right)
            } else {
                Self::take_max(&mut node.left)
            };
            core::mem::replace(&mut node.item, replacement.item)
        } else {
            let mut unlinked = slot.take().expect("deleting a present node");
            *slot = unlinked.left.take().or_else(|| unlinked.right.take());
            unlinked.item
        }
    }

    fn take_min(slot: &mut Link<D>) -> Box<Node<D>> {
        let node = slot.as_deref_mut().expect("nonempty subtree");
        if node.left.is_some() {
            node.count -= 1;
            Self::take_min(&mut node.left)
        } else {
            let mut taken = slot.take().expect("nonempty subtree");
            *slot = taken.right.take();
            taken
        }
    }

    fn take_max(slot: &mut Link<D>) -> Box<Node<D>> {
        let node = slot.as_deref_mut().expect("nonempty subtree");
        if node.right.is_some() {
            node.count -= 1;
            Self::take_max(&mut node.right)
        } else {
            let mut taken = slot.take().expect("nonempty subtree");
            *slot = taken.left.take();
            taken
        }
    }

    /// Rebalances once the tree has shrunk to `ALPHA` times its
    /// high-water size. The log table position moves down only here,
    /// together with the high-water reset: between rebalances a leaf
    /// placed under the old, larger bound may legally survive, so the
    /// depth bookkeeping must keep tracking `max_count`.
    fn shrink_after_removal(&mut self) {
        let count = self.len();
        #[allow(clippy::cast_precision_loss)]
        if count as f64 <= ALPHA * self.max_count as f64 {
            Self::balance_after_deletion(&mut self.root);
            self.max_count = count;
            self.log_table_index = log_index_for(count);
        }
    }

    /// As [`rebuild`](Self::rebuild), skipping subtrees whose balance
    /// is already perfect.
    fn balance_after_deletion(slot: &mut Link<D>) {
        let Some(node) = slot.as_deref_mut() else { return };
        if size(&node.left).abs_diff(size(&node.right)) <= 1 {
            Self::balance_after_deletion(&mut node.left);
            Self::balance_after_deletion(&mut node.right);
        } else {
            Self::rebuild(slot);
        }
    }

    /// Rebuilds the subtree in `slot` into perfect balance, in O(n)
    /// time and O(1) auxiliary space.
    fn rebuild(slot: &mut Link<D>) {
        let Some(root) = slot.take() else { return };
        let count = root.count;
        let mut list = LeftList { next: left_list(Some(root), None) };
        *slot = Some(Self::build_balanced(&mut list, count));
        debug_assert!(list.next.is_none());
    }

    /// Consumes `count` nodes from the flattened in-order list and
    /// reassembles them into a perfectly balanced subtree, left child
    /// first so consumption order matches sorted order.
    fn build_balanced(list: &mut LeftList<D>, count: usize) -> Box<Node<D>> {
        debug_assert!(count > 0);
        if count == 1 {
            let mut leaf = list.next_node().expect("list holds count nodes");
            leaf.count = 1;
            return leaf;
        }

        let subtree_total = count - 1;
        let right_total = subtree_total >> 1;
        let left = Self::build_balanced(list, subtree_total - right_total);

        let mut root = list.next_node().expect("list holds count nodes");
        root.left = Some(left);
        root.right = (right_total != 0).then(|| Self::build_balanced(list, right_total));
        root.recalculate_count();
        root
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
        let ScapegoatTree { root, comparator, .. } = self;
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

    /// Validates every structural invariant - ordering, exact counts,
    /// the depth bound, and the bookkeeping that maintains it -
    /// panicking on the first violation. Intended for test harnesses.
    #[allow(clippy::cast_precision_loss)]
    pub fn check_invariants(&self) {
        let max_depth = search::check_node_invariants(&self.root, &self.comparator);

        let count = self.len();
        assert!(self.max_count >= count, "max count {} < count {count}", self.max_count);
        assert!(
            count as f64 >= ALPHA * self.max_count as f64 || count == self.max_count,
            "count {count} below {ALPHA} * {}",
            self.max_count
        );
        assert!(
            LOG_TABLE[self.log_table_index] <= self.max_count as i64,
            "log table index {} too large for max count {}",
            self.log_table_index,
            self.max_count
        );
        assert!(
            LOG_TABLE[self.log_table_index + 1] > self.max_count as i64,
            "log table index {} too small for max count {}",
            self.log_table_index,
            self.max_count
        );
        if let Some(max_depth) = max_depth {
            assert!(
                max_depth <= self.log_table_index + 1,
                "max depth {max_depth} exceeds threshold {}",
                self.log_table_index + 1
            );
        }
    }
}

impl<'a, D: NodeKind, C: Comparator<D::Key>> IntoIterator for &'a ScapegoatTree<D, C> {
    type Item = &'a D::Item;
    type IntoIter = Iter<'a, D>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

#[allow(clippy::cast_precision_loss)]
fn is_alpha_balanced(child: usize, parent: usize) -> bool {
    child as f64 <= ALPHA * parent as f64
}

/// The largest `i` with `LOG_TABLE[i] <= count`, which is
/// `floor(log(count, 1 / ALPHA))` for nonempty trees.
fn log_index_for(count: usize) -> usize {
    let mut index = 0;
    while index + 1 < LOG_TABLE.len() && LOG_TABLE[index + 1] <= count as i64 {
        index += 1;
    }
    index
}

/// An in-order list of detached nodes threaded through their `left`
/// pointers, produced by flattening a subtree that is about to be
/// rebuilt.
struct LeftList<D: NodeKind> {
    next: Link<D>,
}

impl<D: NodeKind> LeftList<D> {
    /// Pops the next node in sorted order, with both child links
    /// cleared. The popped node's right subtree is flattened lazily,
    /// in front of the remainder of the list.
    fn next_node(&mut self) -> Option<Box<Node<D>>> {
        let mut current = self.next.take()?;
        let rest = current.left.take();
        let right = current.right.take();
        self.next = left_list(right, rest);
        Some(current)
    }
}

/// Reverses the left spine of `node` onto `last`: the result is a list,
/// threaded through `left` pointers, that starts at the minimum of
/// `node` and climbs back up before continuing with `last`.
fn left_list<D: NodeKind>(mut node: Link<D>, mut last: Link<D>) -> Link<D> {
    while let Some(mut current) = node {
        node = current.left.take();
        current.left = last;
        last = Some(current);
    }
    last
}
