//! Bulk construction of a perfectly balanced tree from a full dataset.
//!
//! When the whole collection is known up front there is no reason to pay
//! for n incremental, rebalancing inserts: after one sort (and a
//! policy-driven duplicate pass) a minimum-height tree is built in a single
//! linear pass. The build recursion is count-driven and consumes the sorted
//! items strictly in order - left subtree, root, right subtree - splitting
//! counts exactly as a median-first recursion would, so no random access
//! into the sorted data is needed.

use alloc::vec::Vec;

use crate::compare::Comparator;
use crate::error::{Error, Result};

use super::node::{DuplicateHandling, Link, MAX_LEN, Node, NodeKind};

/// Sorts `items` by key under `comparator`, applies the duplicate policy,
/// and builds a perfectly balanced tree.
///
/// - [`DuplicateHandling::KeepFirst`]: stable sort, then adjacent-equal
///   entries collapse to the occurrence that came first in the input.
/// - [`DuplicateHandling::RejectDuplicate`]: any adjacent equal pair after
///   sorting fails with [`Error::DuplicateKey`].
/// - [`DuplicateHandling::KeepAll`]: every entry is kept; the stable sort
///   preserves the input order of equal keys.
/// - [`DuplicateHandling::Overwrite`] is not meaningful for a bulk,
///   duplicate-free build and fails with [`Error::UnsupportedPolicy`].
pub(crate) fn build_from<D, C>(mut items: Vec<D::Item>, comparator: &C, duplicate_handling: DuplicateHandling) -> Result<Link<D>>
where
    D: NodeKind,
    C: Comparator<D::Key>,
{
    if duplicate_handling == DuplicateHandling::Overwrite {
        return Err(Error::UnsupportedPolicy);
    }
    if items.len() > MAX_LEN {
        return Err(Error::CollectionFull);
    }

    // `sort_by` is stable, which is what makes KeepFirst/KeepAll honor the
    // original order of equal keys.
    items.sort_by(|a, b| comparator.compare(D::key(a), D::key(b)));

    match duplicate_handling {
        DuplicateHandling::KeepFirst => {
            items.dedup_by(|later, earlier| {
                comparator.compare(D::key(later), D::key(earlier)) == core::cmp::Ordering::Equal
            });
        }
        DuplicateHandling::RejectDuplicate => {
            let mut previous: Option<&D::Item> = None;
            for item in &items {
                if let Some(previous) = previous
                    && comparator.compare(D::key(previous), D::key(item)) == core::cmp::Ordering::Equal
                {
                    return Err(Error::DuplicateKey);
                }
                previous = Some(item);
            }
        }
        DuplicateHandling::KeepAll => {}
        DuplicateHandling::Overwrite => unreachable!("rejected above"),
    }

    Ok(build_from_sorted(&mut items.into_iter()))
}

/// Builds a minimum-height tree from `count` pre-sorted items.
pub(crate) fn build_from_sorted<D, I>(sorted: &mut I) -> Link<D>
where
    D: NodeKind,
    I: ExactSizeIterator<Item = D::Item>,
{
    let count = sorted.len();
    if count == 0 {
        return None;
    }
    let root = build_range::<D, I>(sorted, count);
    debug_assert!(sorted.next().is_none());
    Some(root)
}

fn build_range<D, I>(sorted: &mut I, count: usize) -> alloc::boxed::Box<Node<D>>
where
    D: NodeKind,
    I: Iterator<Item = D::Item>,
{
    debug_assert!(count > 0);
    if count == 1 {
        return Node::new(sorted.next().expect("iterator holds `count` items"));
    }

    // The larger half goes left, matching a median split with the middle
    // index rounded down.
    let subtree_total = count - 1;
    let right_total = subtree_total >> 1;

    let left = build_range::<D, I>(sorted, subtree_total - right_total);
    let mut root = Node::new(sorted.next().expect("iterator holds `count` items"));
    root.left = Some(left);
    if right_total != 0 {
        root.right = Some(build_range::<D, I>(sorted, right_total));
    }
    root.recalculate_count();
    root
}
