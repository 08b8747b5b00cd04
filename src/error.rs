use core::fmt;

/// A convenience alias for results produced by this crate.
pub type Result<T> = core::result::Result<T, Error>;

/// The error type for tree and collection operations.
///
/// All variants are local, recoverable conditions reported at the point of
/// the offending call. A failed operation never modifies the collection: a
/// rejected insert or removal leaves the tree exactly as it was.
///
/// Expected absences are *not* errors. Removing a key that is not present
/// returns `false`/`None`, and looking up a missing key with a `get`-style
/// accessor returns `None`.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Error {
    /// An insert under [`DuplicateHandling::RejectDuplicate`] found an
    /// existing entry with an equal key.
    ///
    /// [`DuplicateHandling::RejectDuplicate`]: crate::DuplicateHandling::RejectDuplicate
    DuplicateKey,
    /// A value lookup by key found no matching entry.
    KeyNotFound,
    /// An indexed access or removal was outside `0..len`.
    IndexOutOfRange,
    /// `min` or `max` was requested on an empty collection.
    EmptyCollection,
    /// The collection already holds the maximum representable number of
    /// entries.
    CollectionFull,
    /// The requested duplicate policy is not meaningful for the operation,
    /// e.g. `Overwrite` on a bulk build.
    UnsupportedPolicy,
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let message = match self {
            Error::DuplicateKey => "an entry with an equal key is already present",
            Error::KeyNotFound => "no entry with the given key is present",
            Error::IndexOutOfRange => "index must be less than the collection length",
            Error::EmptyCollection => "the collection is empty",
            Error::CollectionFull => "the collection is at maximum capacity",
            Error::UnsupportedPolicy => "the duplicate policy is not supported by this operation",
        };
        f.write_str(message)
    }
}

impl core::error::Error for Error {}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;
    use alloc::string::ToString;

    #[test]
    fn display_is_stable() {
        assert_eq!(Error::DuplicateKey.to_string(), "an entry with an equal key is already present");
        assert_eq!(Error::EmptyCollection.to_string(), "the collection is empty");
    }
}
