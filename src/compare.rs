use core::cmp::Ordering;

/// A key-ordering strategy carried by every tree.
///
/// The default is [`NaturalOrder`], which delegates to [`Ord`]. Any closure
/// of the shape `Fn(&K, &K) -> Ordering` is also a comparator, so ad-hoc
/// orders do not need a named type:
///
/// ```
/// use core::cmp::Ordering;
/// use sorted_forest::{DuplicateHandling, WeightBalancedSet};
///
/// let reverse = |a: &i32, b: &i32| b.cmp(a);
/// let mut set = WeightBalancedSet::with_comparator(reverse);
/// for i in [2, 3, 1] {
///     set.insert(i, DuplicateHandling::RejectDuplicate).unwrap();
/// }
/// assert_eq!(set.min(), Ok(&3));
/// ```
///
/// # Precondition
///
/// The comparator must be a strict weak ordering that is stable for the
/// lifetime of the collection. This is trusted, not checked; a malformed
/// comparator will not cause memory unsafety but makes lookup results and
/// the in-order sequence unspecified.
pub trait Comparator<K: ?Sized> {
    /// Compares two keys.
    fn compare(&self, a: &K, b: &K) -> Ordering;
}

/// The natural order of a key type, via its [`Ord`] implementation.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct NaturalOrder;

impl<K: Ord + ?Sized> Comparator<K> for NaturalOrder {
    #[inline]
    fn compare(&self, a: &K, b: &K) -> Ordering {
        a.cmp(b)
    }
}

impl<K: ?Sized, F> Comparator<K> for F
where
    F: Fn(&K, &K) -> Ordering,
{
    #[inline]
    fn compare(&self, a: &K, b: &K) -> Ordering {
        self(a, b)
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;
    use static_assertions::assert_eq_size;

    // The default comparator must not widen the tree struct.
    assert_eq_size!(NaturalOrder, ());

    #[test]
    fn natural_order_matches_ord() {
        assert_eq!(NaturalOrder.compare(&1, &2), Ordering::Less);
        assert_eq!(NaturalOrder.compare(&2, &2), Ordering::Equal);
        assert_eq!(NaturalOrder.compare(&3, &2), Ordering::Greater);
    }

    #[test]
    fn closures_are_comparators() {
        let reverse = |a: &u8, b: &u8| b.cmp(a);
        assert_eq!(reverse.compare(&1, &2), Ordering::Greater);
    }
}
