use crate::treap::node::Node;
use crate::treap::tree::{Tree, TreeNode};
use std::ptr;

/// An in-order cursor over a `Treap<K, V>`.
///
/// The cursor always rests on a node (or on the end position) and moves forward with `advance`.
/// Nodes still to be visited are kept on an explicit stack of ancestors, so a step costs amortized
/// `O(1)` and the whole walk costs `O(N)`. It borrows the treap, which therefore cannot change
/// while the cursor is alive.
///
/// # Examples
///
/// ```
/// use keyed_treap::Treap;
///
/// let mut t = Treap::new();
/// t.insert(2, 1, "b");
/// t.insert(1, 2, "a");
///
/// let mut cursor = t.iter();
/// assert_eq!(cursor.node().key(), &1);
/// cursor.advance();
/// assert_eq!(cursor.node().value(), &"b");
/// cursor.advance();
/// assert!(cursor.is_end());
/// ```
pub struct Iter<'a, K: 'a, V: 'a> {
    current: Option<&'a TreeNode<K, V>>,
    stack: Vec<&'a TreeNode<K, V>>,
}

impl<'a, K: 'a, V: 'a> Iter<'a, K, V> {
    pub(crate) fn new(tree: &'a Tree<K, V>) -> Self {
        let mut iter = Iter {
            current: None,
            stack: Vec::new(),
        };
        iter.push_left_spine(tree);
        iter.current = iter.stack.pop();
        iter
    }

    fn push_left_spine(&mut self, mut tree: &'a Tree<K, V>) {
        while let Some(ref node) = *tree {
            self.stack.push(node);
            tree = &node.left;
        }
    }

    /// Returns the node under the cursor, or `None` at the end position.
    pub fn get(&self) -> Option<&'a Node<K, V>> {
        self.current.map(|node| &node.node)
    }

    /// Returns the node under the cursor.
    ///
    /// # Panics
    ///
    /// Panics if the cursor is at the end position.
    pub fn node(&self) -> &'a Node<K, V> {
        match self.current {
            Some(node) => &node.node,
            None => panic!("dereferenced a treap cursor at the end position"),
        }
    }

    /// Returns `true` if the cursor has moved past the last node.
    ///
    /// # Examples
    ///
    /// ```
    /// use keyed_treap::Treap;
    ///
    /// let mut t = Treap::new();
    /// t.insert(1, 1, ());
    ///
    /// let mut cursor = t.iter();
    /// assert!(!cursor.is_end());
    /// cursor.advance();
    /// assert!(cursor.is_end());
    /// ```
    pub fn is_end(&self) -> bool {
        self.current.is_none()
    }

    /// Moves the cursor to the next node in key order. Does nothing at the end position.
    pub fn advance(&mut self) {
        if let Some(node) = self.current {
            self.push_left_spine(&node.right);
            self.current = self.stack.pop();
        }
    }
}

impl<'a, K: 'a, V: 'a> Iterator for Iter<'a, K, V> {
    type Item = &'a Node<K, V>;

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.get()?;
        self.advance();
        Some(node)
    }
}

impl<'a, K: 'a, V: 'a> Clone for Iter<'a, K, V> {
    fn clone(&self) -> Self {
        Iter {
            current: self.current,
            stack: self.stack.clone(),
        }
    }
}

impl<'a, K: 'a, V: 'a> PartialEq for Iter<'a, K, V> {
    fn eq(&self, other: &Iter<'a, K, V>) -> bool {
        match (self.current, other.current) {
            (Some(node), Some(other_node)) => ptr::eq(node, other_node),
            (None, None) => true,
            _ => false,
        }
    }
}

/// An owning iterator for `Treap<K, V>`.
///
/// This iterator traverses the nodes of a treap in-order and yields them by value.
pub struct IntoIter<K, V> {
    current: Tree<K, V>,
    stack: Vec<TreeNode<K, V>>,
}

impl<K, V> IntoIter<K, V> {
    pub(crate) fn new(tree: Tree<K, V>) -> Self {
        IntoIter {
            current: tree,
            stack: Vec::new(),
        }
    }
}

impl<K, V> Iterator for IntoIter<K, V> {
    type Item = Node<K, V>;

    fn next(&mut self) -> Option<Self::Item> {
        while let Some(mut node) = self.current.take() {
            self.current = node.left.take();
            self.stack.push(*node);
        }
        self.stack.pop().map(|node| {
            let TreeNode { node, right, .. } = node;
            self.current = right;
            node
        })
    }
}

impl<K, V> Drop for IntoIter<K, V> {
    fn drop(&mut self) {
        // each yielded node has already been detached from its children
        for _ in self.by_ref() {}
    }
}
