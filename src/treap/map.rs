use crate::error::MergeError;
use crate::treap::iter::{IntoIter, Iter};
use crate::treap::node::Node;
use crate::treap::tree;
use rand::{Rand, Rng, SeedableRng, XorShiftRng};
use serde::de::{Deserialize, Deserializer};
use serde::ser::{Serialize, SerializeSeq, Serializer};
use std::cmp::Ordering;
use std::fmt;
use std::iter::FromIterator;

/// An ordered map implemented by a treap.
///
/// A treap is a tree that satisfies both the binary search tree property and a heap property. Each
/// node has a key, a value, and a priority. The key of any node is greater than all keys in its
/// left subtree and less than all keys occuring in its right subtree. The priority of a node is
/// greater than or equal to the priority of the roots of both its subtrees. With random priorities
/// the expected height of the tree is proportional to the logarithm of the number of keys.
///
/// Insertion and removal are both expressed with two primitives: `split`, which partitions a
/// treap around a key, and `merge`, which joins two treaps whose key ranges do not interleave.
/// Keys are unique: inserting an existing key replaces its node.
///
/// # Examples
///
/// ```
/// use keyed_treap::Treap;
///
/// let mut t = Treap::new();
/// t.insert(5, 10, "five");
/// t.insert(3, 8, "three");
/// t.insert(7, 15, "seven");
///
/// assert_eq!(t.get(&3), Some(&"three"));
/// assert_eq!(t.get(&4), None);
/// assert_eq!(t.len(), 3);
///
/// let (left, right) = t.split(&4);
/// assert_eq!(left.iter().map(|n| *n.key()).collect::<Vec<_>>(), vec![3]);
/// assert_eq!(right.iter().map(|n| *n.key()).collect::<Vec<_>>(), vec![5, 7]);
///
/// let mut t = left.merge(right);
/// assert!(t.remove(&3));
/// assert!(!t.remove(&3));
/// ```
pub struct Treap<K, V> {
    root: tree::Tree<K, V>,
    rng: XorShiftRng,
}

impl<K, V> Treap<K, V> {
    /// Constructs a new, empty `Treap<K, V>` with a deterministic priority generator.
    ///
    /// # Examples
    ///
    /// ```
    /// use keyed_treap::Treap;
    ///
    /// let t: Treap<u32, u32> = Treap::new();
    /// assert!(t.is_empty());
    /// ```
    pub fn new() -> Self {
        Self::with_rng(XorShiftRng::new_unseeded())
    }

    /// Constructs a new, empty `Treap<K, V>` whose priorities for `insert_random` are drawn from
    /// a generator seeded with `seed`. The seed must not be all zeroes.
    pub fn with_seed(seed: [u32; 4]) -> Self {
        Self::with_rng(XorShiftRng::from_seed(seed))
    }

    /// Constructs a new, empty `Treap<K, V>` that draws priorities from `rng`.
    pub fn with_rng(rng: XorShiftRng) -> Self {
        Treap { root: None, rng }
    }

    /// Returns the number of nodes in the treap.
    pub fn len(&self) -> usize {
        tree::len(&self.root)
    }

    /// Returns `true` if the treap holds no nodes.
    ///
    /// # Examples
    ///
    /// ```
    /// use keyed_treap::Treap;
    ///
    /// let mut t = Treap::new();
    /// assert!(t.is_empty());
    /// t.insert(1, 1, ());
    /// assert!(!t.is_empty());
    /// ```
    pub fn is_empty(&self) -> bool {
        self.root.is_none()
    }

    /// Removes every node from the treap.
    pub fn clear(&mut self) {
        tree::clear(&mut self.root);
    }

    /// Returns the node with the minimum key. Returns `None` if the treap is empty.
    pub fn min(&self) -> Option<&Node<K, V>> {
        tree::min(&self.root)
    }

    /// Returns the node with the maximum key. Returns `None` if the treap is empty.
    pub fn max(&self) -> Option<&Node<K, V>> {
        tree::max(&self.root)
    }

    /// Returns an in-order cursor over the treap.
    ///
    /// # Examples
    ///
    /// ```
    /// use keyed_treap::Treap;
    ///
    /// let mut t = Treap::new();
    /// t.insert(3, 1, 'c');
    /// t.insert(1, 2, 'a');
    ///
    /// let mut iterator = t.iter();
    /// assert_eq!(iterator.next().map(|n| *n.value()), Some('a'));
    /// assert_eq!(iterator.next().map(|n| *n.value()), Some('c'));
    /// assert_eq!(iterator.next(), None);
    /// ```
    pub fn iter(&self) -> Iter<'_, K, V> {
        Iter::new(&self.root)
    }

    /// Returns every node of the treap in key order.
    pub fn in_order(&self) -> Vec<&Node<K, V>> {
        self.iter().collect()
    }
}

impl<K: PartialOrd, V> Treap<K, V> {
    /// Inserts a node with an explicit priority. If a node with the same key already exists, it
    /// is removed and returned.
    ///
    /// # Examples
    ///
    /// ```
    /// use keyed_treap::Treap;
    ///
    /// let mut t = Treap::new();
    /// assert!(t.insert(1, 5, "a").is_none());
    /// let old = t.insert(1, 2, "b").unwrap();
    /// assert_eq!(old.value(), &"a");
    /// assert_eq!(t.get(&1), Some(&"b"));
    /// ```
    pub fn insert(&mut self, key: K, priority: K, value: V) -> Option<Node<K, V>> {
        self.insert_node(Node::new(key, priority, value))
    }

    /// Inserts an already constructed node. If a node with the same key already exists, it is
    /// removed and returned.
    pub fn insert_node(&mut self, node: Node<K, V>) -> Option<Node<K, V>> {
        tree::insert(&mut self.root, node)
    }

    /// Inserts a key-value pair with a priority drawn from the treap's generator.
    pub fn insert_random(&mut self, key: K, value: V) -> Option<Node<K, V>>
    where
        K: Rand,
    {
        let priority = self.rng.gen::<K>();
        self.insert(key, priority, value)
    }

    /// Returns the node with a particular key. Returns `None` if no such node exists.
    pub fn find(&self, key: &K) -> Option<&Node<K, V>> {
        tree::find(&self.root, key)
    }

    /// Returns an immutable reference to the value associated with a particular key.
    pub fn get(&self, key: &K) -> Option<&V> {
        self.find(key).map(|node| node.value())
    }

    /// Returns a mutable reference to the value associated with a particular key.
    ///
    /// # Examples
    ///
    /// ```
    /// use keyed_treap::Treap;
    ///
    /// let mut t = Treap::new();
    /// t.insert(1, 1, 1);
    /// *t.get_mut(&1).unwrap() = 2;
    /// assert_eq!(t.get(&1), Some(&2));
    /// ```
    pub fn get_mut(&mut self, key: &K) -> Option<&mut V> {
        tree::find_mut(&mut self.root, key).map(|node| node.value_mut())
    }

    /// Checks if a node with a particular key exists in the treap.
    ///
    /// # Examples
    ///
    /// ```
    /// use keyed_treap::Treap;
    ///
    /// let mut t = Treap::new();
    /// t.insert(1, 1, "a");
    /// assert!(t.contains(&1));
    /// assert!(!t.contains(&2));
    /// ```
    pub fn contains(&self, key: &K) -> bool {
        self.find(key).is_some()
    }

    /// Removes the node with a particular key. Returns whether such a node existed.
    pub fn remove(&mut self, key: &K) -> bool {
        self.take(key).is_some()
    }

    /// Removes and returns the node with a particular key. Returns `None` if no such node
    /// exists.
    pub fn take(&mut self, key: &K) -> Option<Node<K, V>> {
        tree::remove(&mut self.root, key)
    }

    /// Returns the node with the greatest key that is less than or equal to `key`.
    pub fn floor(&self, key: &K) -> Option<&Node<K, V>> {
        tree::floor(&self.root, key)
    }

    /// Returns the node with the least key that is greater than or equal to `key`.
    pub fn ceil(&self, key: &K) -> Option<&Node<K, V>> {
        tree::ceil(&self.root, key)
    }

    /// Splits the treap into a treap with every key less than or equal to `key` and a treap with
    /// every key greater than `key`. The right treap gets a generator derived from this one.
    pub fn split(mut self, key: &K) -> (Self, Self) {
        trace!("splitting treap of {} nodes", self.len());
        let right_rng = self.rng.gen::<XorShiftRng>();
        let (left, right) = tree::split(self.root.take(), key);
        self.root = left;
        (self, Treap { root: right, rng: right_rng })
    }

    /// Joins two treaps. Every key of `self` must be less than or equal to every key of `other`;
    /// this is not checked. The result keeps the generator of `self`.
    ///
    /// # Examples
    ///
    /// ```
    /// use keyed_treap::Treap;
    ///
    /// let mut left = Treap::new();
    /// left.insert(1, 10, ());
    /// let mut right = Treap::new();
    /// right.insert(2, 20, ());
    ///
    /// let t = left.merge(right);
    /// assert_eq!(t.iter().map(|n| *n.key()).collect::<Vec<_>>(), vec![1, 2]);
    /// ```
    pub fn merge(mut self, mut other: Self) -> Self {
        trace!("merging treaps of {} and {} nodes", self.len(), other.len());
        self.root = tree::merge(self.root.take(), other.root.take());
        self
    }

    /// Joins two treaps after checking that every key of `self` is less than every key of
    /// `other`. On failure both treaps are handed back inside the error.
    pub fn try_merge(self, other: Self) -> Result<Self, MergeError<K, V>> {
        let ordered = match (self.max(), other.min()) {
            (Some(max), Some(min)) => max.compare(min) == Ordering::Less,
            _ => true,
        };
        if ordered {
            Ok(self.merge(other))
        } else {
            debug!("rejected merge of overlapping treaps");
            Err(MergeError { left: self, right: other })
        }
    }

    /// Checks that the treap is ordered by key, heap-ordered by priority, and that its cached
    /// sizes are consistent.
    pub fn is_valid(&self) -> bool {
        tree::is_valid(&self.root)
    }
}

impl<K, V> Default for Treap<K, V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: Clone, V: Clone> Clone for Treap<K, V> {
    fn clone(&self) -> Self {
        Treap {
            root: tree::clone(&self.root),
            rng: self.rng.clone(),
        }
    }
}

impl<K, V> Drop for Treap<K, V> {
    fn drop(&mut self) {
        tree::clear(&mut self.root);
    }
}

impl<K: PartialOrd, V> PartialEq for Treap<K, V> {
    fn eq(&self, other: &Treap<K, V>) -> bool {
        self.len() == other.len() && self.iter().zip(other.iter()).all(|(n, m)| n == m)
    }
}

impl<K: fmt::Debug, V: fmt::Debug> fmt::Debug for Treap<K, V> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_list().entries(self.iter()).finish()
    }
}

impl<K: PartialOrd, V> Extend<Node<K, V>> for Treap<K, V> {
    fn extend<I: IntoIterator<Item = Node<K, V>>>(&mut self, iter: I) {
        for node in iter {
            self.insert_node(node);
        }
    }
}

impl<K: PartialOrd, V> FromIterator<Node<K, V>> for Treap<K, V> {
    fn from_iter<I: IntoIterator<Item = Node<K, V>>>(iter: I) -> Self {
        let mut treap = Treap::new();
        treap.extend(iter);
        treap
    }
}

impl<K, V> IntoIterator for Treap<K, V> {
    type Item = Node<K, V>;
    type IntoIter = IntoIter<K, V>;

    fn into_iter(mut self) -> Self::IntoIter {
        IntoIter::new(self.root.take())
    }
}

impl<'a, K: 'a, V: 'a> IntoIterator for &'a Treap<K, V> {
    type Item = &'a Node<K, V>;
    type IntoIter = Iter<'a, K, V>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<K: Serialize, V: Serialize> Serialize for Treap<K, V> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut seq = serializer.serialize_seq(Some(self.len()))?;
        for node in self.iter() {
            seq.serialize_element(node)?;
        }
        seq.end()
    }
}

/// Rebuilds the treap by reinserting each node with its stored priority. When priorities are
/// distinct the result has the same shape as the treap that was serialized.
impl<'de, K, V> Deserialize<'de> for Treap<K, V>
where
    K: PartialOrd + Deserialize<'de>,
    V: Deserialize<'de>,
{
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let nodes = Vec::<Node<K, V>>::deserialize(deserializer)?;
        Ok(nodes.into_iter().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::Treap;
    use crate::treap::tree;
    use serde::de::{Deserialize, Deserializer};
    use serde_test::{assert_de_tokens, assert_tokens, Token};

    fn keys<V>(treap: &Treap<i32, V>) -> Vec<i32> {
        treap.iter().map(|node| *node.key()).collect()
    }

    // Pre-order (key, priority, left key, right key) of every node.
    fn shape<V>(treap: &Treap<i32, V>) -> Vec<(i32, i32, Option<i32>, Option<i32>)> {
        fn child_key<V>(tree: &tree::Tree<i32, V>) -> Option<i32> {
            tree.as_ref().map(|node| *node.node.key())
        }

        let mut ret = Vec::new();
        let mut stack = vec![&treap.root];
        while let Some(tree) = stack.pop() {
            if let Some(node) = tree {
                ret.push((
                    *node.node.key(),
                    *node.node.priority(),
                    child_key(&node.left),
                    child_key(&node.right),
                ));
                stack.push(&node.right);
                stack.push(&node.left);
            }
        }
        ret
    }

    #[derive(Debug)]
    struct Shaped(Treap<i32, char>);

    impl PartialEq for Shaped {
        fn eq(&self, other: &Shaped) -> bool {
            shape(&self.0) == shape(&other.0)
        }
    }

    impl<'de> Deserialize<'de> for Shaped {
        fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
            Treap::deserialize(deserializer).map(Shaped)
        }
    }

    fn sample() -> Treap<i32, &'static str> {
        let mut treap = Treap::new();
        treap.insert(5, 10, "Node 5");
        treap.insert(3, 8, "Node 3");
        treap.insert(7, 15, "Node 7");
        treap
    }

    #[test]
    fn test_len_empty() {
        let treap: Treap<u32, u32> = Treap::new();
        assert_eq!(treap.len(), 0);
        assert!(treap.is_empty());
        assert!(treap.min().is_none());
        assert!(treap.max().is_none());
        assert!(treap.iter().is_end());
    }

    #[test]
    fn test_insert() {
        let treap = sample();
        assert_eq!(
            treap.in_order().iter().map(|node| *node.value()).collect::<Vec<_>>(),
            vec!["Node 3", "Node 5", "Node 7"],
        );
        assert!(treap.is_valid());
    }

    #[test]
    fn test_insert_order_independent() {
        let mut treap = Treap::new();
        treap.insert(7, 15, ());
        treap.insert(3, 8, ());
        treap.insert(5, 10, ());
        assert_eq!(keys(&treap), vec![3, 5, 7]);
    }

    #[test]
    fn test_insert_replace() {
        let mut treap = sample();
        let old = treap.insert(3, 100, "New 3");
        assert_eq!(old.map(|node| node.into_parts()), Some((3, 8, "Node 3")));
        assert_eq!(treap.len(), 3);
        assert_eq!(treap.get(&3), Some(&"New 3"));
        assert!(treap.is_valid());
    }

    #[test]
    fn test_insert_random() {
        let mut treap = Treap::with_seed([1, 2, 3, 4]);
        for key in 0..100u32 {
            treap.insert_random(key, key);
        }
        assert_eq!(treap.len(), 100);
        assert!(treap.is_valid());
    }

    #[test]
    fn test_find() {
        let treap = sample();
        let node = treap.find(&3);
        assert_eq!(node.map(|node| *node.value()), Some("Node 3"));
        assert_eq!(node.map(|node| *node.priority()), Some(8));
        assert!(treap.find(&4).is_none());
        assert!(treap.contains(&7));
        assert!(!treap.contains(&8));
    }

    #[test]
    fn test_get_mut() {
        let mut treap = sample();
        *treap.get_mut(&5).unwrap() = "changed";
        assert_eq!(treap.get(&5), Some(&"changed"));
        assert!(treap.get_mut(&6).is_none());
    }

    #[test]
    fn test_remove() {
        let mut treap = sample();
        assert!(treap.remove(&3));
        assert_eq!(keys(&treap), vec![5, 7]);
        assert!(!treap.remove(&3));
        assert_eq!(treap.len(), 2);
        assert!(treap.is_valid());
    }

    #[test]
    fn test_take() {
        let mut treap = sample();
        assert_eq!(treap.take(&7).map(|node| node.into_parts()), Some((7, 15, "Node 7")));
        assert!(treap.take(&7).is_none());
    }

    #[test]
    fn test_split() {
        let mut treap = Treap::new();
        treap.insert(5, 10, "Node 5");
        treap.insert(3, 8, "Node 3");
        treap.insert(7, 15, "Node 7");
        treap.insert(2, 12, "Node 2");

        let (left, right) = treap.split(&4);
        assert_eq!(
            left.iter().map(|node| *node.value()).collect::<Vec<_>>(),
            vec!["Node 2", "Node 3"],
        );
        assert_eq!(
            right.iter().map(|node| *node.value()).collect::<Vec<_>>(),
            vec!["Node 5", "Node 7"],
        );
        assert_eq!(left.len() + right.len(), 4);
    }

    #[test]
    fn test_split_clone_keeps_original() {
        let treap = sample();
        let (left, right) = treap.clone().split(&5);
        assert_eq!(keys(&left), vec![3, 5]);
        assert_eq!(keys(&right), vec![7]);
        assert_eq!(keys(&treap), vec![3, 5, 7]);
    }

    #[test]
    fn test_merge() {
        let mut treaps = Vec::new();
        for key in 1..5 {
            let mut treap = Treap::new();
            treap.insert(key, key * 10, ());
            treaps.push(treap);
        }
        let merged = treaps
            .into_iter()
            .fold(Treap::new(), |acc, treap| acc.merge(treap));
        assert_eq!(keys(&merged), vec![1, 2, 3, 4]);
        assert!(merged.is_valid());
    }

    #[test]
    fn test_try_merge() {
        let (left, right) = sample().split(&4);
        let merged = left.try_merge(right).ok().unwrap();
        assert_eq!(keys(&merged), vec![3, 5, 7]);

        let (left, right) = sample().split(&4);
        let err = right.try_merge(left).err().unwrap();
        assert_eq!(keys(&err.left), vec![5, 7]);
        assert_eq!(keys(&err.right), vec![3]);

        let empty = Treap::new();
        assert!(empty.try_merge(sample()).is_ok());
    }

    #[test]
    fn test_floor_ceil_min_max() {
        let treap = sample();
        assert_eq!(treap.floor(&4).map(|node| *node.key()), Some(3));
        assert_eq!(treap.floor(&2).map(|node| *node.key()), None);
        assert_eq!(treap.ceil(&6).map(|node| *node.key()), Some(7));
        assert_eq!(treap.ceil(&8).map(|node| *node.key()), None);
        assert_eq!(treap.min().map(|node| *node.key()), Some(3));
        assert_eq!(treap.max().map(|node| *node.key()), Some(7));
    }

    #[test]
    fn test_equality() {
        let treap = sample();
        assert_eq!(treap, treap.clone());

        let mut other = Treap::new();
        other.insert(3, 1, "other");
        other.insert(5, 2, "other");
        other.insert(7, 3, "other");
        assert_eq!(treap, other);

        other.remove(&7);
        assert_ne!(treap, other);
        assert_eq!(Treap::<i32, ()>::new(), Treap::new());
    }

    #[test]
    fn test_clear() {
        let mut treap = sample();
        treap.clear();
        assert!(treap.is_empty());
    }

    #[test]
    fn test_into_iter() {
        let treap = sample();
        assert_eq!(
            treap.into_iter().map(|node| node.into_parts()).collect::<Vec<_>>(),
            vec![(3, 8, "Node 3"), (5, 10, "Node 5"), (7, 15, "Node 7")],
        );
    }

    #[test]
    fn test_from_iter() {
        use crate::treap::node::Node;

        let treap: Treap<i32, ()> = vec![Node::new(2, 1, ()), Node::new(1, 2, ())]
            .into_iter()
            .collect();
        assert_eq!(keys(&treap), vec![1, 2]);
    }

    #[test]
    fn test_debug() {
        let mut treap = Treap::new();
        treap.insert(1, 1, 'a');
        assert_eq!(
            format!("{:?}", treap),
            "[Node { key: 1, priority: 1, value: 'a' }]",
        );
    }

    #[test]
    fn test_serde() {
        let mut treap = Treap::new();
        treap.insert(2, 1, 'b');
        treap.insert(1, 2, 'a');
        assert_tokens(
            &treap,
            &[
                Token::Seq { len: Some(2) },
                Token::Struct { name: "Node", len: 3 },
                Token::Str("key"),
                Token::I32(1),
                Token::Str("priority"),
                Token::I32(2),
                Token::Str("value"),
                Token::Char('a'),
                Token::StructEnd,
                Token::Struct { name: "Node", len: 3 },
                Token::Str("key"),
                Token::I32(2),
                Token::Str("priority"),
                Token::I32(1),
                Token::Str("value"),
                Token::Char('b'),
                Token::StructEnd,
                Token::SeqEnd,
            ],
        );
    }

    #[test]
    fn test_deserialize_keeps_shape() {
        let mut treap = Treap::new();
        let entries = [
            (5, 10, 'e'),
            (3, 8, 'c'),
            (7, 15, 'g'),
            (1, 2, 'a'),
            (4, 9, 'd'),
            (6, 1, 'f'),
        ];
        for &(key, priority, value) in &entries {
            treap.insert(key, priority, value);
        }
        assert_eq!(
            shape(&treap),
            vec![
                (7, 15, Some(5), None),
                (5, 10, Some(4), Some(6)),
                (4, 9, Some(3), None),
                (3, 8, Some(1), None),
                (1, 2, None, None),
                (6, 1, None, None),
            ],
        );

        let mut tokens = vec![Token::Seq { len: Some(treap.len()) }];
        for node in treap.iter() {
            tokens.extend_from_slice(&[
                Token::Struct { name: "Node", len: 3 },
                Token::Str("key"),
                Token::I32(*node.key()),
                Token::Str("priority"),
                Token::I32(*node.priority()),
                Token::Str("value"),
                Token::Char(*node.value()),
                Token::StructEnd,
            ]);
        }
        tokens.push(Token::SeqEnd);

        assert_de_tokens(&Shaped(treap), &tokens);
    }
}
