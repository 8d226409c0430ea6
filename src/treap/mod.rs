//! Probabilistic binary search tree where each node also maintains the heap invariant.

mod iter;
mod map;
mod node;
mod tree;

pub use self::iter::{IntoIter, Iter};
pub use self::map::Treap;
pub use self::node::Node;
