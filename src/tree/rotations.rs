//! Single and double rotations maintaining the WB(delta, gamma) weight
//! balance criterion with delta = 3, gamma = 2 (constants per
//! <https://yoichihirai.com/bst.pdf>).
//!
//! A subtree is balanced when `3 * (size(left) + 1) >= size(right) + 1` and
//! its mirror. [`balance_left`] restores the invariant when the right child
//! has grown too heavy (rotating leftwards); [`balance_right`] is the exact
//! mirror. Both directions run through one implementation parameterized by
//! a chirality selector, so the rotation logic exists once.
//!
//! Rotations permute ownership between a node and its (grand)children; they
//! never change the in-order key sequence, only the shape. Counts are
//! recomputed bottom-up for every node whose children changed.

use super::node::{Link, Node, NodeKind, size};

/// Restores balance at `slot` after its right side gained weight (or its
/// left side lost weight). No-op when already balanced.
pub(crate) fn balance_left<D: NodeKind>(slot: &mut Link<D>) {
    balance::<D, Normal>(slot);
}

/// Mirror of [`balance_left`]: restores balance after the left side gained
/// weight.
pub(crate) fn balance_right<D: NodeKind>(slot: &mut Link<D>) {
    balance::<D, Mirror>(slot);
}

/// Maps "primary"/"secondary" onto concrete children. `Normal` treats the
/// left child as primary (yielding `balance_left`); `Mirror` swaps the
/// sides.
trait Chirality {
    fn primary<D: NodeKind>(node: &mut Node<D>) -> &mut Link<D>;
    fn secondary<D: NodeKind>(node: &mut Node<D>) -> &mut Link<D>;
    fn primary_size<D: NodeKind>(node: &Node<D>) -> usize;
    fn secondary_size<D: NodeKind>(node: &Node<D>) -> usize;
}

enum Normal {}
enum Mirror {}

impl Chirality for Normal {
    #[inline]
    fn primary<D: NodeKind>(node: &mut Node<D>) -> &mut Link<D> {
        &mut node.left
    }

    #[inline]
    fn secondary<D: NodeKind>(node: &mut Node<D>) -> &mut Link<D> {
        &mut node.right
    }

    #[inline]
    fn primary_size<D: NodeKind>(node: &Node<D>) -> usize {
        size(&node.left)
    }

    #[inline]
    fn secondary_size<D: NodeKind>(node: &Node<D>) -> usize {
        size(&node.right)
    }
}

impl Chirality for Mirror {
    #[inline]
    fn primary<D: NodeKind>(node: &mut Node<D>) -> &mut Link<D> {
        &mut node.right
    }

    #[inline]
    fn secondary<D: NodeKind>(node: &mut Node<D>) -> &mut Link<D> {
        &mut node.left
    }

    #[inline]
    fn primary_size<D: NodeKind>(node: &Node<D>) -> usize {
        size(&node.right)
    }

    #[inline]
    fn secondary_size<D: NodeKind>(node: &Node<D>) -> usize {
        size(&node.left)
    }
}

/// `true` when a node with the given child sizes needs no rotation:
/// `3 * (primary + 1) >= secondary + 1`, i.e. `3 * primary + 2 >= secondary`.
#[inline]
pub(crate) fn is_balanced(primary: usize, secondary: usize) -> bool {
    3 * primary + 2 >= secondary
}

/// Once a rotation is due, a single rotation suffices when the secondary
/// child's inner grandchild is light enough:
/// `inner + 1 < 2 * (outer + 1)`, i.e. `inner < 2 * outer + 1`.
#[inline]
fn needs_single_rotation(inner: usize, outer: usize) -> bool {
    inner < 2 * outer + 1
}

fn balance<D: NodeKind, C: Chirality>(slot: &mut Link<D>) {
    {
        let Some(node) = slot.as_deref_mut() else {
            return;
        };
        if is_balanced(C::primary_size(node), C::secondary_size(node)) {
            return;
        }
    }

    // An imbalance towards the secondary side implies the secondary child
    // exists (its size exceeds 3 * primary + 2 >= 2).
    let mut node = slot.take().unwrap();
    let mut secondary = C::secondary(&mut node).take().unwrap();
    let inner = C::primary_size(&secondary);
    let outer = C::secondary_size(&secondary);

    let mut new_root = if needs_single_rotation(inner, outer) {
        // Promote the secondary child; the old root adopts its inner
        // grandchild.
        *C::secondary(&mut node) = C::primary(&mut secondary).take();
        node.recalculate_count();
        *C::primary(&mut secondary) = Some(node);
        secondary
    } else {
        // Promote the inner grandchild, splitting its children between the
        // old root and the secondary child.
        let mut pivot = C::primary(&mut secondary).take().unwrap();
        *C::primary(&mut secondary) = C::secondary(&mut pivot).take();
        secondary.recalculate_count();
        *C::secondary(&mut pivot) = Some(secondary);
        *C::secondary(&mut node) = C::primary(&mut pivot).take();
        node.recalculate_count();
        *C::primary(&mut pivot) = Some(node);
        pivot
    };

    new_root.recalculate_count();
    *slot = Some(new_root);
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;
    use crate::tree::node::KeyOnly;
    use alloc::boxed::Box;
    use alloc::format;
    use alloc::string::String;
    use alloc::vec::Vec;
    use pretty_assertions::assert_eq;

    type StrNode = Node<KeyOnly<&'static str>>;

    fn leafy(key: &'static str, count: usize, left: Link<KeyOnly<&'static str>>, right: Link<KeyOnly<&'static str>>) -> Box<StrNode> {
        let mut node = Node::new(key);
        node.count = count;
        node.left = left;
        node.right = right;
        node
    }

    fn leaf(key: &'static str, count: usize) -> Box<StrNode> {
        leafy(key, count, None, None)
    }

    /// Renders a shape as `(left, key, right)`, eliding absent children.
    fn shape(link: &Link<KeyOnly<&'static str>>) -> String {
        match link {
            None => String::new(),
            Some(node) => {
                if node.left.is_none() && node.right.is_none() {
                    return String::from(*node.key());
                }
                let parts: Vec<String> = [shape(&node.left), String::from(*node.key()), shape(&node.right)]
                    .into_iter()
                    .filter(|s| !s.is_empty())
                    .collect();
                format!("({})", parts.join(", "))
            }
        }
    }

    #[test]
    fn single_rotate_left() {
        // Left weight 1, right weight 6, right's children 2/3.
        let mut root = Some(leafy(
            "a",
            8,
            Some(leaf("x", 1)),
            Some(leafy("c", 6, Some(leaf("y", 2)), Some(leaf("z", 3)))),
        ));

        balance_left(&mut root);

        assert_eq!(shape(&root), "((x, a, y), c, z)");
        let node = root.as_ref().unwrap();
        assert_eq!(node.count, 8);
        assert_eq!(size(&node.left), 4);
        assert_eq!(size(&node.right), 3);
    }

    #[test]
    fn double_rotate_left() {
        let mut root = Some(leafy(
            "a",
            10,
            Some(leaf("x", 1)),
            Some(leafy(
                "c",
                8,
                Some(leafy("b", 6, Some(leaf("y0", 2)), Some(leaf("y1", 3)))),
                Some(leaf("z", 1)),
            )),
        ));

        balance_left(&mut root);

        assert_eq!(shape(&root), "((x, a, y0), b, (y1, c, z))");
        let node = root.as_ref().unwrap();
        assert_eq!(node.count, 10);
        assert_eq!(size(&node.left), 4);
        assert_eq!(size(&node.right), 5);
    }

    #[test]
    fn single_rotate_right() {
        let mut root = Some(leafy(
            "a",
            8,
            Some(leafy("c", 6, Some(leaf("z", 3)), Some(leaf("y", 2)))),
            Some(leaf("x", 1)),
        ));

        balance_right(&mut root);

        assert_eq!(shape(&root), "(z, c, (y, a, x))");
        let node = root.as_ref().unwrap();
        assert_eq!(node.count, 8);
        assert_eq!(size(&node.left), 3);
        assert_eq!(size(&node.right), 4);
    }

    #[test]
    fn double_rotate_right() {
        let mut root = Some(leafy(
            "a",
            10,
            Some(leafy(
                "c",
                8,
                Some(leaf("z", 1)),
                Some(leafy("b", 6, Some(leaf("y1", 3)), Some(leaf("y0", 2)))),
            )),
            Some(leaf("x", 1)),
        ));

        balance_right(&mut root);

        assert_eq!(shape(&root), "((z, c, y1), b, (y0, a, x))");
        let node = root.as_ref().unwrap();
        assert_eq!(node.count, 10);
        assert_eq!(size(&node.left), 5);
        assert_eq!(size(&node.right), 4);
    }

    #[test]
    fn balanced_subtree_is_untouched() {
        let mut root = Some(leafy("b", 3, Some(leaf("a", 1)), Some(leaf("c", 1))));
        balance_left(&mut root);
        assert_eq!(shape(&root), "(a, b, c)");
        balance_right(&mut root);
        assert_eq!(shape(&root), "(a, b, c)");
    }
}
