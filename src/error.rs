use crate::treap::Treap;
use std::fmt;
use thiserror::Error;

/// The error returned by `Treap::try_merge` when the left operand holds a key that is not less
/// than every key of the right operand. Both operands are returned unchanged.
#[derive(Error)]
#[error("every key of the left treap must be less than every key of the right treap")]
pub struct MergeError<K, V> {
    pub left: Treap<K, V>,
    pub right: Treap<K, V>,
}

impl<K, V> fmt::Debug for MergeError<K, V> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("MergeError")
            .field("left_len", &self.left.len())
            .field("right_len", &self.right.len())
            .finish()
    }
}
