//! Key and index descent routines shared by every balancing strategy.
//!
//! Lookups never depend on how a tree keeps itself balanced, only on the
//! ordering and count invariants, so they are written once over [`Link`].

use crate::compare::Comparator;
use crate::error::{Error, Result};

use super::node::{Link, Node, NodeKind, size};

/// Standard BST descent. Returns the first node found with an equal key
/// (an arbitrary one when duplicates are present).
pub(crate) fn find<'a, D, C>(root: &'a Link<D>, comparator: &C, key: &D::Key) -> Option<&'a Node<D>>
where
    D: NodeKind,
    C: Comparator<D::Key>,
{
    let mut current = root;
    while let Some(node) = current {
        match comparator.compare(key, node.key()) {
            core::cmp::Ordering::Less => current = &node.left,
            core::cmp::Ordering::Greater => current = &node.right,
            core::cmp::Ordering::Equal => return Some(node),
        }
    }
    None
}

/// As [`find`], but yields a mutable payload borrow.
pub(crate) fn find_mut<'a, D, C>(root: &'a mut Link<D>, comparator: &C, key: &D::Key) -> Option<&'a mut D::Item>
where
    D: NodeKind,
    C: Comparator<D::Key>,
{
    let mut current = root;
    while let Some(node) = current {
        match comparator.compare(key, node.key()) {
            core::cmp::Ordering::Less => current = &mut node.left,
            core::cmp::Ordering::Greater => current = &mut node.right,
            core::cmp::Ordering::Equal => return Some(&mut node.item),
        }
    }
    None
}

/// Order-statistic selection: the node holding the `index`-th smallest key.
///
/// Compares `index` against the left subtree size at each step; equal means
/// the current node, larger means descend right with the left half (and the
/// node itself) subtracted.
pub(crate) fn node_at<D: NodeKind>(root: &Link<D>, index: usize) -> Result<&Node<D>> {
    if index >= size(root) {
        return Err(Error::IndexOutOfRange);
    }

    let mut node = root.as_deref().expect("nonempty per the bounds check");
    let mut adjusted = index;
    loop {
        let left_count = size(&node.left);
        if adjusted < left_count {
            node = node.left.as_deref().expect("index within left subtree");
        } else if adjusted == left_count {
            return Ok(node);
        } else {
            adjusted -= left_count + 1;
            node = node.right.as_deref().expect("index within right subtree");
        }
    }
}

/// Mutable variant of [`node_at`], yielding the payload.
pub(crate) fn item_at_mut<D: NodeKind>(root: &mut Link<D>, index: usize) -> Result<&mut D::Item> {
    if index >= size(root) {
        return Err(Error::IndexOutOfRange);
    }

    let mut node = root.as_deref_mut().expect("nonempty per the bounds check");
    let mut adjusted = index;
    loop {
        let left_count = size(&node.left);
        if adjusted < left_count {
            node = node.left.as_deref_mut().expect("index within left subtree");
        } else if adjusted == left_count {
            return Ok(&mut node.item);
        } else {
            adjusted -= left_count + 1;
            node = node.right.as_deref_mut().expect("index within right subtree");
        }
    }
}

/// The leftmost payload, following the left spine to its end.
pub(crate) fn min<D: NodeKind>(root: &Link<D>) -> Result<&D::Item> {
    let mut node = root.as_deref().ok_or(Error::EmptyCollection)?;
    while let Some(left) = node.left.as_deref() {
        node = left;
    }
    Ok(&node.item)
}

/// The rightmost payload, following the right spine to its end.
pub(crate) fn max<D: NodeKind>(root: &Link<D>) -> Result<&D::Item> {
    let mut node = root.as_deref().ok_or(Error::EmptyCollection)?;
    while let Some(right) = node.right.as_deref() {
        node = right;
    }
    Ok(&node.item)
}

/// The index of the first (leftmost) entry with an equal key, computed from
/// subtree sizes during descent. On an equal key the descent keeps probing
/// the left subtree in case an earlier duplicate exists.
pub(crate) fn index_of<D, C>(root: &Link<D>, comparator: &C, key: &D::Key) -> Option<usize>
where
    D: NodeKind,
    C: Comparator<D::Key>,
{
    let mut current = root;
    let mut skipped = 0;
    let mut found = None;
    while let Some(node) = current {
        match comparator.compare(key, node.key()) {
            core::cmp::Ordering::Less => current = &node.left,
            core::cmp::Ordering::Greater => {
                skipped += size(&node.left) + 1;
                current = &node.right;
            }
            core::cmp::Ordering::Equal => {
                found = Some(skipped + size(&node.left));
                current = &node.left;
            }
        }
    }
    found
}

/// Walks the whole structure validating the ordering and count invariants;
/// panics on the first violation. Returns the maximum depth (0 for a single
/// node) for strategy-specific checks layered on top.
///
/// Intended for test harnesses, not production call sites.
pub(crate) fn check_node_invariants<D, C>(root: &Link<D>, comparator: &C) -> Option<usize>
where
    D: NodeKind,
    C: Comparator<D::Key>,
{
    fn check<D, C>(node: &Node<D>, comparator: &C, bounds: (Option<&D::Key>, Option<&D::Key>)) -> usize
    where
        D: NodeKind,
        C: Comparator<D::Key>,
    {
        let (lower, upper) = bounds;
        assert!(
            lower.is_none_or(|bound| comparator.compare(node.key(), bound) != core::cmp::Ordering::Less),
            "key below the lower bound of its subtree"
        );
        assert!(
            upper.is_none_or(|bound| comparator.compare(node.key(), bound) != core::cmp::Ordering::Greater),
            "key above the upper bound of its subtree"
        );
        assert_eq!(
            node.count,
            Node::<D>::compute_count(&node.left, &node.right),
            "count disagrees with children"
        );

        let left_depth = node.left.as_deref().map(|left| check(left, comparator, (lower, Some(node.key()))));
        let right_depth = node.right.as_deref().map(|right| check(right, comparator, (Some(node.key()), upper)));
        match (left_depth, right_depth) {
            (None, None) => 0,
            (left, right) => 1 + left.unwrap_or(0).max(right.unwrap_or(0)),
        }
    }

    root.as_deref().map(|node| check(node, comparator, (None, None)))
}
