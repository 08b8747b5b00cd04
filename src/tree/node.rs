use alloc::boxed::Box;
use core::marker::PhantomData;

/// The maximum number of entries any tree in this crate will hold.
///
/// The cap leaves two spare bits above the count so the weight-balance
/// arithmetic (`3 * count + 2`) can never overflow a `usize`.
pub(crate) const MAX_LEN: usize = usize::MAX >> 2;

/// An owned, possibly absent subtree. The empty tree is the absence of a
/// root, not a sentinel node.
pub(crate) type Link<D> = Option<Box<Node<D>>>;

/// Describes how an insert behaves when it finds an entry whose key is
/// equal (under the active comparator) to the key being inserted.
///
/// The same policy set applies to all three balancing strategies and to
/// bulk construction.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum DuplicateHandling {
    /// Fail with [`Error::DuplicateKey`](crate::Error::DuplicateKey).
    RejectDuplicate,
    /// Keep the entry already present; the insert is a no-op.
    KeepFirst,
    /// Replace the stored item with the new one, leaving the tree shape
    /// untouched. Not meaningful for bulk construction.
    Overwrite,
    /// Retain both entries. The new entry is placed in whichever child
    /// subtree is currently smaller (ties to the left), which keeps chains
    /// of equal keys from degenerating into a list.
    KeepAll,
}

/// Binds a node payload layout to key and value accessors.
///
/// A driver is a zero-sized, stateless type: algorithms name it as a type
/// parameter and everything monomorphizes, so one generic implementation
/// serves "ordered set of K" and "ordered map K -> V" with no boxing and no
/// virtual calls. [`KeyOnly`] stores bare keys; [`KeyValue`] stores
/// `(key, value)` pairs.
pub trait NodeKind {
    /// The ordering field.
    type Key;
    /// The value exposed by value accessors. For key-only nodes this is the
    /// key itself.
    type Value;
    /// The full payload stored in a node and exchanged with callers:
    /// `Key` for key-only nodes, `(Key, Value)` for key-value nodes.
    type Item;

    /// Borrows the key of an item.
    fn key(item: &Self::Item) -> &Self::Key;
    /// Borrows the value of an item.
    fn value(item: &Self::Item) -> &Self::Value;
    /// Mutably borrows the value of an item.
    fn value_mut(item: &mut Self::Item) -> &mut Self::Value;
    /// Replaces the value of an item.
    fn set_value(item: &mut Self::Item, value: Self::Value);
    /// Consumes an item, yielding its value.
    fn into_value(item: Self::Item) -> Self::Value;
}

/// Driver for set-like trees whose payload is the key alone.
#[derive(Clone, Copy, Debug, Default)]
pub struct KeyOnly<K>(PhantomData<K>);

impl<K> NodeKind for KeyOnly<K> {
    type Key = K;
    type Value = K;
    type Item = K;

    #[inline]
    fn key(item: &K) -> &K {
        item
    }

    #[inline]
    fn value(item: &K) -> &K {
        item
    }

    #[inline]
    fn value_mut(item: &mut K) -> &mut K {
        item
    }

    // Only ever called for comparator-equal keys (`Overwrite` collapsing a
    // duplicate insert), so ordering is preserved.
    #[inline]
    fn set_value(item: &mut K, value: K) {
        *item = value;
    }

    #[inline]
    fn into_value(item: K) -> K {
        item
    }
}

/// Driver for map-like trees whose payload is a `(key, value)` pair.
#[derive(Clone, Copy, Debug, Default)]
pub struct KeyValue<K, V>(PhantomData<(K, V)>);

impl<K, V> NodeKind for KeyValue<K, V> {
    type Key = K;
    type Value = V;
    type Item = (K, V);

    #[inline]
    fn key(item: &(K, V)) -> &K {
        &item.0
    }

    #[inline]
    fn value(item: &(K, V)) -> &V {
        &item.1
    }

    #[inline]
    fn value_mut(item: &mut (K, V)) -> &mut V {
        &mut item.1
    }

    #[inline]
    fn set_value(item: &mut (K, V), value: V) {
        item.1 = value;
    }

    #[inline]
    fn into_value(item: (K, V)) -> V {
        item.1
    }
}

/// A tree node: payload, exclusively owned children, and the size of the
/// subtree rooted here.
///
/// `count` is exact after every public operation returns:
/// `count == 1 + size(left) + size(right)`.
pub(crate) struct Node<D: NodeKind> {
    pub(crate) item: D::Item,
    pub(crate) count: usize,
    pub(crate) left: Link<D>,
    pub(crate) right: Link<D>,
}

impl<D: NodeKind> core::fmt::Debug for Node<D>
where
    D::Item: core::fmt::Debug,
{
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Node")
            .field("item", &self.item)
            .field("count", &self.count)
            .field("left", &self.left)
            .field("right", &self.right)
            .finish()
    }
}

impl<D: NodeKind> Node<D> {
    /// Creates a fresh leaf node holding `item`.
    pub(crate) fn new(item: D::Item) -> Box<Self> {
        Box::new(Node {
            item,
            count: 1,
            left: None,
            right: None,
        })
    }

    /// Borrows the node's key.
    #[inline]
    pub(crate) fn key(&self) -> &D::Key {
        D::key(&self.item)
    }

    /// Recomputes `count` from the children. Must be called after any
    /// structural change to `left` or `right`.
    #[inline]
    pub(crate) fn recalculate_count(&mut self) {
        self.count = Self::compute_count(&self.left, &self.right);
    }

    /// The count a node with the given children would carry.
    #[inline]
    pub(crate) fn compute_count(left: &Link<D>, right: &Link<D>) -> usize {
        size(left) + size(right) + 1
    }
}

/// The size of a possibly absent subtree.
#[inline]
pub(crate) fn size<D: NodeKind>(link: &Link<D>) -> usize {
    link.as_ref().map_or(0, |node| node.count)
}
