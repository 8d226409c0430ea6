use rand::distributions::range::SampleRange;
use rand::{Rand, Rng};
use std::cmp::Ordering;
use std::ops::Range;

/// Compares two keys or priorities, panicking if they are unordered (e.g. `NaN`).
pub(crate) fn order<K: PartialOrd>(left: &K, right: &K) -> Ordering {
    match left.partial_cmp(right) {
        Some(ordering) => ordering,
        None => panic!("treap keys and priorities must be totally ordered"),
    }
}

/// A key, priority, and value record stored in a treap.
///
/// Nodes are ordered and compared for equality by key only. The priority shares the type of the
/// key and only decides where the node sits in the heap order of the tree.
///
/// # Examples
///
/// ```
/// use keyed_treap::Node;
///
/// let n = Node::new(1, 10, "one");
/// let m = Node::new(1, 20, "uno");
///
/// assert_eq!(n, m);
/// assert!(m.priority_greater(&n));
/// ```
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Node<K, V> {
    key: K,
    priority: K,
    value: V,
}

impl<K, V> Node<K, V> {
    /// Constructs a new `Node<K, V>` from an explicit key, priority, and value.
    pub fn new(key: K, priority: K, value: V) -> Self {
        Node { key, priority, value }
    }

    /// Constructs a node whose key and priority are drawn uniformly by `rand::Rand`.
    ///
    /// For integer types this covers every representable value. For `f32` and `f64`, `rand`
    /// only draws from `[0, 1)`; use `random_in` with explicit ranges to draw other floats.
    ///
    /// # Examples
    ///
    /// ```
    /// extern crate rand;
    /// # extern crate keyed_treap;
    /// use keyed_treap::Node;
    /// use rand::{SeedableRng, XorShiftRng};
    ///
    /// let mut rng = XorShiftRng::from_seed([1, 2, 3, 4]);
    /// let node: Node<u32, ()> = Node::random(&mut rng, ());
    /// assert_eq!(node.value(), &());
    /// ```
    pub fn random<R: Rng>(rng: &mut R, value: V) -> Self
    where
        K: Rand,
    {
        let key = rng.gen::<K>();
        let priority = rng.gen::<K>();
        Node { key, priority, value }
    }

    /// Constructs a node whose key and priority are drawn uniformly from the half-open ranges
    /// `keys` and `priorities`. Panics if either range is empty.
    pub fn random_in<R: Rng>(rng: &mut R, keys: Range<K>, priorities: Range<K>, value: V) -> Self
    where
        K: PartialOrd + SampleRange,
    {
        let key = rng.gen_range(keys.start, keys.end);
        let priority = rng.gen_range(priorities.start, priorities.end);
        Node { key, priority, value }
    }

    /// Returns the key of the node.
    ///
    /// # Examples
    ///
    /// ```
    /// use keyed_treap::Node;
    ///
    /// let n = Node::new(1, 10, "one");
    /// assert_eq!(n.key(), &1);
    /// ```
    pub fn key(&self) -> &K {
        &self.key
    }

    /// Returns the priority of the node.
    ///
    /// # Examples
    ///
    /// ```
    /// use keyed_treap::Node;
    ///
    /// let n = Node::new(1, 10, "one");
    /// assert_eq!(n.priority(), &10);
    /// ```
    pub fn priority(&self) -> &K {
        &self.priority
    }

    /// Returns the value of the node.
    ///
    /// # Examples
    ///
    /// ```
    /// use keyed_treap::Node;
    ///
    /// let n = Node::new(1, 10, "one");
    /// assert_eq!(n.value(), &"one");
    /// ```
    pub fn value(&self) -> &V {
        &self.value
    }

    pub(crate) fn value_mut(&mut self) -> &mut V {
        &mut self.value
    }

    /// Consumes the node and returns its key, priority, and value.
    pub fn into_parts(self) -> (K, K, V) {
        let Node { key, priority, value } = self;
        (key, priority, value)
    }
}

impl<K: PartialOrd, V> Node<K, V> {
    /// Compares two nodes by key.
    pub fn compare(&self, other: &Node<K, V>) -> Ordering {
        order(&self.key, &other.key)
    }

    /// Compares the key of this node against `key`.
    pub fn compare_key(&self, key: &K) -> Ordering {
        order(&self.key, key)
    }

    /// Returns `true` if the priority of this node is strictly less than that of `other`.
    ///
    /// # Panics
    ///
    /// Panics if the two priorities are unordered.
    ///
    /// # Examples
    ///
    /// ```
    /// use keyed_treap::Node;
    ///
    /// let n = Node::new(1, 10, ());
    /// let m = Node::new(2, 20, ());
    /// assert!(n.priority_less(&m));
    /// assert!(!n.priority_less(&n));
    /// ```
    pub fn priority_less(&self, other: &Node<K, V>) -> bool {
        order(&self.priority, &other.priority) == Ordering::Less
    }

    /// Returns `true` if the priority of this node is strictly greater than that of `other`.
    ///
    /// # Panics
    ///
    /// Panics if the two priorities are unordered.
    pub fn priority_greater(&self, other: &Node<K, V>) -> bool {
        order(&self.priority, &other.priority) == Ordering::Greater
    }
}

impl<K: PartialOrd, V> PartialEq for Node<K, V> {
    fn eq(&self, other: &Node<K, V>) -> bool {
        self.compare(other) == Ordering::Equal
    }
}

impl<K: Ord, V> Eq for Node<K, V> {}

impl<K: PartialOrd, V> PartialOrd for Node<K, V> {
    fn partial_cmp(&self, other: &Node<K, V>) -> Option<Ordering> {
        Some(self.compare(other))
    }
}

impl<K: Ord, V> Ord for Node<K, V> {
    fn cmp(&self, other: &Node<K, V>) -> Ordering {
        self.compare(other)
    }
}
