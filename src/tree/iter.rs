use core::iter::FusedIterator;
use core::marker::PhantomData;
use core::ptr::NonNull;

use super::node::{Link, Node, NodeKind};
use super::scratch::PointerStack;

/// A borrowing in-order iterator over any tree in this crate.
///
/// The traversal keeps an explicit stack of pending nodes (trees carry no
/// parent pointers) drawn from the shared scratch pool, so repeated
/// iterations typically allocate nothing.
pub struct Iter<'a, D: NodeKind> {
    stack: PointerStack<Node<D>>,
    remaining: usize,
    _marker: PhantomData<&'a Node<D>>,
}

impl<'a, D: NodeKind> Iter<'a, D> {
    pub(crate) fn new(root: &'a Link<D>) -> Self {
        let mut iter = Iter {
            stack: PointerStack::acquire(),
            remaining: super::node::size(root),
            _marker: PhantomData,
        };
        iter.push_left_spine(root);
        iter
    }

    fn push_left_spine(&mut self, mut link: &'a Link<D>) {
        while let Some(node) = link.as_deref() {
            self.stack.push(NonNull::from(node));
            link = &node.left;
        }
    }
}

impl<'a, D: NodeKind> Iterator for Iter<'a, D> {
    type Item = &'a D::Item;

    fn next(&mut self) -> Option<&'a D::Item> {
        let popped = self.stack.pop()?;
        // SAFETY: every pointer on the stack came from a `&'a Node` borrow
        // taken in `new`/`push_left_spine`, and the tree is shared-borrowed
        // for 'a, so no mutation can invalidate it.
        let node = unsafe { popped.as_ref() };
        self.push_left_spine(&node.right);
        self.remaining -= 1;
        Some(&node.item)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<D: NodeKind> ExactSizeIterator for Iter<'_, D> {}
impl<D: NodeKind> FusedIterator for Iter<'_, D> {}
