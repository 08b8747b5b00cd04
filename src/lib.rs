//! Sorted, index-addressable collections for Rust.
//!
//! This crate provides ordered collections backed by self-balancing binary
//! search trees. Three interchangeable balancing strategies share one generic
//! node model and one set of search algorithms:
//!
//! - [`WeightBalancedTree`] - rotation-based WB(3, 2) weight balancing
//! - [`ScapegoatTree`] - amortized whole-subtree rebuilds, no rotations
//! - [`RandomizedTree`] - probabilistic root insertion, expected log depth
//!
//! Every strategy augments its nodes with subtree sizes, so all of them
//! support O(log n) access *by index* in sorted order in addition to the
//! usual access by key.
//!
//! On top of the trees sit two thin facades with conventional collection
//! APIs: [`SortedList`] (duplicates retained) and [`SortedMap`] (unique
//! keys).
//!
//! # Example
//!
//! ```
//! use sorted_forest::SortedList;
//!
//! let mut list: SortedList<i32> = SortedList::new();
//! list.add(30).unwrap();
//! list.add(10).unwrap();
//! list.add(20).unwrap();
//! list.add(10).unwrap();
//!
//! // Elements are kept in sorted order and addressable by index.
//! assert_eq!(list.len(), 4);
//! assert_eq!(list[0], 10);
//! assert_eq!(list[2], 20);
//! assert_eq!(list.index_of(&10), Some(0));
//!
//! assert!(list.remove(&10));
//! assert_eq!(list.len(), 3);
//! ```
//!
//! Trees can also be used directly when a non-default balancing strategy,
//! a custom comparator, or an explicit duplicate policy is needed:
//!
//! ```
//! use sorted_forest::{DuplicateHandling, Error, WeightBalancedSet};
//!
//! let mut set: WeightBalancedSet<i32> = WeightBalancedSet::new();
//! for i in 1..=5 {
//!     set.insert(i, DuplicateHandling::RejectDuplicate).unwrap();
//! }
//! assert_eq!(set.at(2), Ok(&3));
//! assert_eq!(
//!     set.insert(3, DuplicateHandling::RejectDuplicate),
//!     Err(Error::DuplicateKey)
//! );
//! ```
//!
//! # Features
//!
//! - **`no_std` compatible** - Only requires `alloc`, no standard library dependency
//! - **O(log n) indexed access** - Every node tracks its subtree size
//! - **Pluggable duplicate policies** - One [`DuplicateHandling`] enum across
//!   all strategies and the bulk constructor
//! - **Bulk construction** - A perfectly balanced tree from pre-sorted input
//!   in one linear pass

#![no_std]
// These forbid rules and lint groups are meant to be very restrictive.
// NOTE: We have to allow unsafe code for the scratch-buffer pool and the
// borrowing in-order iterator.
// #![forbid(unsafe_code)]
#![forbid(keyword_idents)]
#![forbid(non_ascii_idents)]
#![forbid(unreachable_pub)]
#![warn(clippy::all)]
#![warn(clippy::cargo)]
#![warn(clippy::pedantic)]
// Enable coverage attributes for nightly builds.
#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

extern crate alloc;
#[cfg(test)]
extern crate std;

mod compare;
mod error;

pub mod sorted_list;
pub mod sorted_map;
pub mod tree;

pub use compare::{Comparator, NaturalOrder};
pub use error::{Error, Result};
pub use sorted_list::SortedList;
pub use sorted_map::SortedMap;
pub use tree::node::{DuplicateHandling, KeyOnly, KeyValue, NodeKind};
pub use tree::randomized::{RandomizedMap, RandomizedSet, RandomizedTree};
pub use tree::scapegoat::{ScapegoatMap, ScapegoatSet, ScapegoatTree};
pub use tree::weight_balanced::{WeightBalancedMap, WeightBalancedSet, WeightBalancedTree};
