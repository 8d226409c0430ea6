//! An ordered map implemented by a treap: a binary search tree on keys that is also a max-heap on
//! priorities. Every update is built from `split` and `merge`.

#[macro_use]
extern crate log;
#[macro_use]
extern crate serde_derive;

mod error;
pub mod treap;

pub use crate::error::MergeError;
pub use crate::treap::{IntoIter, Iter, Node, Treap};
