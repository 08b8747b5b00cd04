//! The balancing strategies and the generic machinery they share.
//!
//! The submodules split along the same seams as the algorithms themselves:
//! [`node`] defines the node shape and the driver types that let one
//! algorithm body serve key-only and key-value trees; private modules hold
//! the weight-balance rotation engine, the linear-time balanced
//! constructor, and the descent routines every strategy shares. The
//! strategies proper live in [`weight_balanced`], [`scapegoat`] and
//! [`randomized`].

pub mod node;
pub mod randomized;
pub mod scapegoat;
pub mod weight_balanced;

pub(crate) mod bulk;
pub(crate) mod iter;
pub(crate) mod random;
pub(crate) mod rotations;
pub(crate) mod scratch;
pub(crate) mod search;

pub use iter::Iter;
