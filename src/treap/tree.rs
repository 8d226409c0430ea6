use std::cmp::Ordering;
use crate::treap::node::{order, Node};

pub type Tree<K, V> = Option<Box<TreeNode<K, V>>>;

/// A struct representing an internal node of a treap: a record plus its two sub-treaps.
///
/// Functions in this module walk links with loops and explicit stacks. A treap can be as deep as
/// it is long when priorities follow key order.
pub struct TreeNode<K, V> {
    pub node: Node<K, V>,
    pub len: usize,
    pub left: Tree<K, V>,
    pub right: Tree<K, V>,
}

impl<K, V> TreeNode<K, V> {
    pub fn new(node: Node<K, V>) -> Self {
        TreeNode {
            node,
            len: 1,
            left: None,
            right: None,
        }
    }

    pub fn update(&mut self) {
        self.len = 1 + len(&self.left) + len(&self.right);
    }

    // The sub-treap to descend into when this node's key compares as `ordering` to the target.
    pub fn child(&self, ordering: Ordering) -> &Tree<K, V> {
        match ordering {
            Ordering::Greater => &self.left,
            _ => &self.right,
        }
    }

    pub fn child_mut(&mut self, ordering: Ordering) -> &mut Tree<K, V> {
        match ordering {
            Ordering::Greater => &mut self.left,
            _ => &mut self.right,
        }
    }
}

// Places `node` into the empty link `hole` and returns its left (`go_left`) or right link.
fn attach<K, V>(hole: &mut Tree<K, V>, node: Box<TreeNode<K, V>>, go_left: bool) -> &mut Tree<K, V> {
    let node = hole.get_or_insert(node);
    if go_left {
        &mut node.left
    } else {
        &mut node.right
    }
}

// Recomputes the cached sizes of the nodes on `path`, a walk from the root of `tree` where each
// step is `true` for the left link. Sub-treaps hanging off the path must already be correct.
fn refresh<K, V>(tree: &mut Tree<K, V>, path: &[bool]) {
    let mut sides = Vec::with_capacity(path.len());
    let mut curr = &*tree;
    for &go_left in path {
        let node = match curr {
            Some(node) => node,
            None => break,
        };
        let (next, side) = if go_left {
            (&node.left, &node.right)
        } else {
            (&node.right, &node.left)
        };
        sides.push(len(side));
        curr = next;
    }

    let mut total = len(curr);
    let mut sizes = vec![0; sides.len()];
    for (index, side) in sides.iter().enumerate().rev() {
        total += 1 + side;
        sizes[index] = total;
    }

    let mut curr = tree;
    for (&go_left, &size) in path.iter().zip(&sizes) {
        let node = match curr {
            Some(node) => node,
            None => break,
        };
        node.len = size;
        curr = if go_left { &mut node.left } else { &mut node.right };
    }
}

/// Partitions `tree` into keys `<= key` and keys `> key`.
pub fn split<K: PartialOrd, V>(tree: Tree<K, V>, key: &K) -> (Tree<K, V>, Tree<K, V>) {
    let mut left = None;
    let mut right = None;
    let mut left_depth = 0;
    let mut right_depth = 0;
    {
        let mut left_hole = &mut left;
        let mut right_hole = &mut right;
        let mut curr = tree;
        while let Some(mut node) = curr {
            if node.node.compare_key(key) == Ordering::Greater {
                curr = node.left.take();
                right_hole = attach(right_hole, node, true);
                right_depth += 1;
            } else {
                curr = node.right.take();
                left_hole = attach(left_hole, node, false);
                left_depth += 1;
            }
        }
    }
    refresh(&mut left, &vec![false; left_depth]);
    refresh(&mut right, &vec![true; right_depth]);
    (left, right)
}

/// Joins two treaps where every key of `l_tree` is at most every key of `r_tree`. Equal
/// priorities put the root of `r_tree` on top.
pub fn merge<K: PartialOrd, V>(mut l_tree: Tree<K, V>, mut r_tree: Tree<K, V>) -> Tree<K, V> {
    let mut root = None;
    let mut path = Vec::new();
    {
        let mut hole = &mut root;
        loop {
            match (l_tree, r_tree) {
                (Some(mut l_node), Some(mut r_node)) => {
                    if l_node.node.priority_greater(&r_node.node) {
                        l_tree = l_node.right.take();
                        r_tree = Some(r_node);
                        hole = attach(hole, l_node, false);
                        path.push(false);
                    } else {
                        l_tree = Some(l_node);
                        r_tree = r_node.left.take();
                        hole = attach(hole, r_node, true);
                        path.push(true);
                    }
                },
                (tree, None) | (None, tree) => {
                    *hole = tree;
                    break;
                },
            }
        }
    }
    refresh(&mut root, &path);
    root
}

/// Inserts `new_node`, replacing and returning any node that has the same key.
pub fn insert<K: PartialOrd, V>(tree: &mut Tree<K, V>, new_node: Node<K, V>) -> Option<Node<K, V>> {
    let old_node = remove(tree, new_node.key());
    if tree.is_none() {
        *tree = Some(Box::new(TreeNode::new(new_node)));
        return old_node;
    }
    let (left, right) = split(tree.take(), new_node.key());
    let singleton = Some(Box::new(TreeNode::new(new_node)));
    *tree = merge(left, merge(singleton, right));
    old_node
}

pub fn remove<K: PartialOrd, V>(tree: &mut Tree<K, V>, key: &K) -> Option<Node<K, V>> {
    find(tree, key)?;
    // The key is present, so every node on the way down loses exactly one descendant.
    let mut curr = tree;
    loop {
        let ordering = curr.as_ref()?.node.compare_key(key);
        if ordering == Ordering::Equal {
            break;
        }
        let node = curr.as_mut()?;
        node.len -= 1;
        curr = node.child_mut(ordering);
    }
    curr.take().map(|node| {
        let TreeNode { node, left, right, .. } = *node;
        *curr = merge(left, right);
        node
    })
}

pub fn find<'a, K: PartialOrd, V>(tree: &'a Tree<K, V>, key: &K) -> Option<&'a Node<K, V>> {
    let mut curr = tree;
    while let Some(node) = curr {
        match node.node.compare_key(key) {
            Ordering::Equal => return Some(&node.node),
            ordering => curr = node.child(ordering),
        }
    }
    None
}

pub fn find_mut<'a, K: PartialOrd, V>(tree: &'a mut Tree<K, V>, key: &K) -> Option<&'a mut Node<K, V>> {
    let mut curr = tree;
    while let Some(node) = curr {
        match node.node.compare_key(key) {
            Ordering::Equal => return Some(&mut node.node),
            ordering => curr = node.child_mut(ordering),
        }
    }
    None
}

pub fn ceil<'a, K: PartialOrd, V>(tree: &'a Tree<K, V>, key: &K) -> Option<&'a Node<K, V>> {
    let mut curr = tree;
    let mut ret = None;
    while let Some(node) = curr {
        match node.node.compare_key(key) {
            Ordering::Less => curr = &node.right,
            Ordering::Greater => {
                ret = Some(&node.node);
                curr = &node.left;
            },
            Ordering::Equal => return Some(&node.node),
        }
    }
    ret
}

pub fn floor<'a, K: PartialOrd, V>(tree: &'a Tree<K, V>, key: &K) -> Option<&'a Node<K, V>> {
    let mut curr = tree;
    let mut ret = None;
    while let Some(node) = curr {
        match node.node.compare_key(key) {
            Ordering::Greater => curr = &node.left,
            Ordering::Less => {
                ret = Some(&node.node);
                curr = &node.right;
            },
            Ordering::Equal => return Some(&node.node),
        }
    }
    ret
}

pub fn min<K, V>(tree: &Tree<K, V>) -> Option<&Node<K, V>> {
    tree.as_ref().map(|node| {
        let mut curr = node;
        while let Some(ref left_node) = curr.left {
            curr = left_node;
        }
        &curr.node
    })
}

pub fn max<K, V>(tree: &Tree<K, V>) -> Option<&Node<K, V>> {
    tree.as_ref().map(|node| {
        let mut curr = node;
        while let Some(ref right_node) = curr.right {
            curr = right_node;
        }
        &curr.node
    })
}

pub fn len<K, V>(tree: &Tree<K, V>) -> usize {
    match tree {
        Some(node) => node.len,
        None => 0,
    }
}

/// Frees every node of `tree` one box at a time, leaving it empty.
pub fn clear<K, V>(tree: &mut Tree<K, V>) {
    let mut stack: Vec<Box<TreeNode<K, V>>> = tree.take().into_iter().collect();
    while let Some(mut node) = stack.pop() {
        stack.extend(node.left.take());
        stack.extend(node.right.take());
    }
}

/// Copies `tree` node by node, children before their parent.
pub fn clone<K: Clone, V: Clone>(tree: &Tree<K, V>) -> Tree<K, V> {
    enum Visit<'a, K: 'a, V: 'a> {
        Enter(&'a Tree<K, V>),
        Exit(&'a TreeNode<K, V>),
    }

    let mut visits = vec![Visit::Enter(tree)];
    let mut copies: Vec<Tree<K, V>> = Vec::new();
    while let Some(visit) = visits.pop() {
        match visit {
            Visit::Enter(Some(node)) => {
                visits.push(Visit::Exit(&**node));
                visits.push(Visit::Enter(&node.right));
                visits.push(Visit::Enter(&node.left));
            },
            Visit::Enter(None) => copies.push(None),
            Visit::Exit(node) => {
                let right = copies.pop().unwrap_or(None);
                let left = copies.pop().unwrap_or(None);
                copies.push(Some(Box::new(TreeNode {
                    node: node.node.clone(),
                    len: node.len,
                    left,
                    right,
                })));
            },
        }
    }
    copies.pop().unwrap_or(None)
}

/// Checks the search order, the heap order, and the cached sizes of every sub-treap.
pub fn is_valid<K: PartialOrd, V>(tree: &Tree<K, V>) -> bool {
    let mut stack = vec![(tree, None, None)];
    while let Some((tree, lower, upper)) = stack.pop() {
        let node = match tree {
            Some(node) => node,
            None => continue,
        };
        let key = node.node.key();
        if lower.map_or(false, |lower| order(lower, key) != Ordering::Less)
            || upper.map_or(false, |upper| order(key, upper) != Ordering::Less)
        {
            return false;
        }
        for child in &[&node.left, &node.right] {
            if let Some(child) = child {
                if child.node.priority_greater(&node.node) {
                    return false;
                }
            }
        }
        // children's sizes are checked when they are popped, so a local check covers the tree
        if node.len != 1 + len(&node.left) + len(&node.right) {
            return false;
        }
        stack.push((&node.left, lower, Some(key)));
        stack.push((&node.right, Some(key), upper));
    }
    true
}
