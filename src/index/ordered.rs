//! Ordered Index - in-memory multiway balanced search tree
//!
//! A B-tree of order [`ORDER`] keeping key/payload pairs in ascending key
//! order. Payloads live only at the leaf level; internal nodes summarize each
//! child by the smallest key in its subtree.
//!
//! # Shape
//! ```text
//!              [ 1 | 5 ]                 height = 1
//!             /         \
//!   [1:a 3:b 4:c]     [5:d 8:e]          leaves, ascending
//! ```
//!
//! A node that reaches `ORDER` entries splits into two halves and pushes a new
//! summary into its parent. When the root splits a new root with two children
//! is created, so every leaf always sits at depth `height`.
//!
//! # Performance
//! - Insert: O(log n)
//! - Search: O(log n)
//! - Ordered traversal: O(n), lazy in either direction
//!
//! Keys are not unique. A new key goes after every existing equal key, so
//! ascending iteration yields equal keys in insertion order.

/// Maximum number of entries a node may hold before it splits
pub const ORDER: usize = 4;

/// A tree node: payload pairs at the leaves, (min key, child) at internal levels
#[derive(Debug, Clone)]
enum Node<K, V> {
    Leaf(Vec<(K, V)>),
    Internal(Vec<(K, Node<K, V>)>),
}

impl<K: Ord + Clone, V> Node<K, V> {
    fn empty_leaf() -> Self {
        Node::Leaf(Vec::with_capacity(ORDER))
    }

    /// Smallest key in this subtree
    fn min_key(&self) -> Option<&K> {
        match self {
            Node::Leaf(entries) => entries.first().map(|(k, _)| k),
            Node::Internal(children) => children.first().map(|(k, _)| k),
        }
    }

    /// Insert into this subtree, returning the split-off right sibling if this
    /// node overflowed.
    fn insert(&mut self, key: K, value: V) -> Option<(K, Node<K, V>)> {
        match self {
            Node::Leaf(entries) => {
                let pos = entries.partition_point(|(k, _)| *k <= key);
                entries.insert(pos, (key, value));

                if entries.len() < ORDER {
                    return None;
                }

                let right = entries.split_off(ORDER / 2);
                let sep = right[0].0.clone();
                Some((sep, Node::Leaf(right)))
            }
            Node::Internal(children) => {
                let idx = child_index(children, &key);

                // Keep the summary of the leftmost child equal to its minimum
                if key < children[idx].0 {
                    children[idx].0 = key.clone();
                }

                let (sep, sibling) = children[idx].1.insert(key, value)?;
                children.insert(idx + 1, (sep, sibling));

                if children.len() < ORDER {
                    return None;
                }

                let right = children.split_off(ORDER / 2);
                let sep = right[0].0.clone();
                Some((sep, Node::Internal(right)))
            }
        }
    }

    fn search(&self, key: &K) -> Option<&V> {
        match self {
            Node::Leaf(entries) => entries.iter().find(|(k, _)| k == key).map(|(_, v)| v),
            Node::Internal(children) => {
                let idx = child_index(children, key);
                children[idx].1.search(key)
            }
        }
    }

    fn search_mut(&mut self, key: &K) -> Option<&mut V> {
        match self {
            Node::Leaf(entries) => entries
                .iter_mut()
                .find(|(k, _)| k == key)
                .map(|(_, v)| v),
            Node::Internal(children) => {
                let idx = child_index(children, key);
                children[idx].1.search_mut(key)
            }
        }
    }

    fn len(&self) -> usize {
        match self {
            Node::Leaf(entries) => entries.len(),
            Node::Internal(children) => children.len(),
        }
    }

    fn node_sizes(&self, out: &mut Vec<usize>) {
        if let Node::Internal(children) = self {
            for (_, child) in children {
                out.push(child.len());
                child.node_sizes(out);
            }
        }
    }

    fn leaf_depths(&self, depth: usize, out: &mut Vec<usize>) {
        match self {
            Node::Leaf(_) => out.push(depth),
            Node::Internal(children) => {
                for (_, child) in children {
                    child.leaf_depths(depth + 1, out);
                }
            }
        }
    }
}

/// Rightmost child whose summary key is <= `key`, or the first child when
/// `key` is smaller than every summary.
fn child_index<K: Ord, C>(children: &[(K, C)], key: &K) -> usize {
    children
        .partition_point(|(k, _)| k <= key)
        .saturating_sub(1)
}

/// Balanced multiway search tree with leaf-level payloads
#[derive(Debug, Clone)]
pub struct OrderedIndex<K, V> {
    root: Node<K, V>,
    len: usize,
    height: usize,
}

impl<K: Ord + Clone, V> Default for OrderedIndex<K, V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: Ord + Clone, V> OrderedIndex<K, V> {
    /// Create an empty index
    pub fn new() -> Self {
        Self {
            root: Node::empty_leaf(),
            len: 0,
            height: 0,
        }
    }

    /// Insert a key/payload pair. Always succeeds; duplicate keys are kept.
    pub fn insert(&mut self, key: K, value: V) {
        self.len += 1;

        let Some((sep, sibling)) = self.root.insert(key, value) else {
            return;
        };

        let old_root = std::mem::replace(&mut self.root, Node::empty_leaf());
        let old_min = match old_root.min_key() {
            Some(k) => k.clone(),
            None => unreachable!("split produced an empty left node"),
        };

        self.root = Node::Internal(vec![(old_min, old_root), (sep, sibling)]);
        self.height += 1;

        tracing::trace!(
            "Ordered index root split: height={}, len={}",
            self.height,
            self.len
        );
    }

    /// A payload stored under `key`
    pub fn search(&self, key: &K) -> Option<&V> {
        self.root.search(key)
    }

    /// Mutable access to a payload stored under `key`
    pub fn search_mut(&mut self, key: &K) -> Option<&mut V> {
        self.root.search_mut(key)
    }

    /// Check whether `key` is present
    pub fn contains(&self, key: &K) -> bool {
        self.search(key).is_some()
    }

    /// Number of stored pairs
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Number of internal levels above the leaves
    pub fn height(&self) -> usize {
        self.height
    }

    /// Smallest key, if any
    pub fn first_key(&self) -> Option<&K> {
        self.iter().next().map(|(k, _)| k)
    }

    /// Largest key, if any
    pub fn last_key(&self) -> Option<&K> {
        self.iter_rev().next().map(|(k, _)| k)
    }

    /// Ascending iterator over `(key, payload)`
    pub fn iter(&self) -> Iter<'_, K, V> {
        Iter::new(&self.root, self.len, false)
    }

    /// Descending iterator over `(key, payload)`
    pub fn iter_rev(&self) -> Iter<'_, K, V> {
        Iter::new(&self.root, self.len, true)
    }

    /// Every payload in ascending key order, eagerly materialized
    pub fn ordered_traverse(&self) -> Vec<&V> {
        self.iter().map(|(_, v)| v).collect()
    }

    /// Ascending pairs with key strictly less than `bound`.
    ///
    /// Stops at the first key `>= bound` instead of scanning the whole tree.
    pub fn before<'a>(&'a self, bound: &'a K) -> impl Iterator<Item = (&'a K, &'a V)> + 'a {
        self.iter().take_while(move |(k, _)| *k < bound)
    }

    /// Descending pairs with `lo <= key < hi`.
    ///
    /// Skips keys at or above `hi`, then stops at the first key below `lo`.
    pub fn between_rev<'a>(
        &'a self,
        lo: &'a K,
        hi: &'a K,
    ) -> impl Iterator<Item = (&'a K, &'a V)> + 'a {
        self.iter_rev()
            .skip_while(move |(k, _)| *k >= hi)
            .take_while(move |(k, _)| *k >= lo)
    }

    /// Entry count of every node below the root, depth first. Each lies in
    /// `ORDER / 2 .. ORDER` in a well-formed tree.
    pub fn node_sizes(&self) -> Vec<usize> {
        let mut sizes = Vec::new();
        self.root.node_sizes(&mut sizes);
        sizes
    }

    /// Depth of every leaf, left to right. All entries equal `height()` in a
    /// well-formed tree.
    pub fn leaf_depths(&self) -> Vec<usize> {
        let mut depths = Vec::new();
        self.root.leaf_depths(0, &mut depths);
        depths
    }
}

/// Lazy in-order walk over an [`OrderedIndex`], in either direction
pub struct Iter<'a, K, V> {
    stack: Vec<std::slice::Iter<'a, (K, Node<K, V>)>>,
    leaf: std::slice::Iter<'a, (K, V)>,
    remaining: usize,
    reverse: bool,
}

impl<'a, K, V> Iter<'a, K, V> {
    fn new(root: &'a Node<K, V>, len: usize, reverse: bool) -> Self {
        let mut iter = Self {
            stack: Vec::new(),
            leaf: Default::default(),
            remaining: len,
            reverse,
        };
        iter.push(root);
        iter
    }

    fn push(&mut self, node: &'a Node<K, V>) {
        match node {
            Node::Leaf(entries) => self.leaf = entries.iter(),
            Node::Internal(children) => self.stack.push(children.iter()),
        }
    }
}

impl<'a, K, V> Iterator for Iter<'a, K, V> {
    type Item = (&'a K, &'a V);

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let entry = if self.reverse {
                self.leaf.next_back()
            } else {
                self.leaf.next()
            };

            if let Some((k, v)) = entry {
                self.remaining -= 1;
                return Some((k, v));
            }

            let level = self.stack.last_mut()?;
            let child = if self.reverse {
                level.next_back()
            } else {
                level.next()
            };

            match child {
                Some((_, node)) => self.push(node),
                None => {
                    self.stack.pop();
                }
            }
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<K, V> ExactSizeIterator for Iter<'_, K, V> {}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_empty_index() {
        let index: OrderedIndex<i64, &str> = OrderedIndex::new();

        assert!(index.is_empty());
        assert_eq!(index.height(), 0);
        assert!(index.search(&1).is_none());
        assert!(index.ordered_traverse().is_empty());
        assert_eq!(index.iter_rev().count(), 0);
    }

    #[test]
    fn test_insert_and_search() {
        let mut index = OrderedIndex::new();
        for key in [50, 10, 40, 20, 30] {
            index.insert(key, key * 100);
        }

        assert_eq!(index.len(), 5);
        assert_eq!(index.search(&40), Some(&4000));
        assert_eq!(index.search(&10), Some(&1000));
        assert!(index.contains(&30));
        assert!(!index.contains(&35));
    }

    #[test]
    fn test_root_split_grows_height() {
        let mut index = OrderedIndex::new();

        for key in 0..3 {
            index.insert(key, ());
        }
        assert_eq!(index.height(), 0);

        // Fourth entry overflows the root leaf
        index.insert(3, ());
        assert_eq!(index.height(), 1);
        assert_eq!(index.leaf_depths(), vec![1, 1]);
        assert_eq!(index.node_sizes(), vec![2, 2]);
        assert!(OrderedIndex::<u32, ()>::new().node_sizes().is_empty());
    }

    #[test]
    fn test_descending_insert_keeps_min_summaries() {
        let mut index = OrderedIndex::new();
        for key in (0..100).rev() {
            index.insert(key, key);
        }

        for key in 0..100 {
            assert_eq!(index.search(&key), Some(&key), "missing key {}", key);
        }

        let keys: Vec<i32> = index.iter().map(|(k, _)| *k).collect();
        assert_eq!(keys, (0..100).collect::<Vec<_>>());
    }

    #[test]
    fn test_equal_keys_keep_insertion_order() {
        let mut index = OrderedIndex::new();
        for (i, key) in [5, 1, 5, 3, 5, 5, 2, 5].iter().enumerate() {
            index.insert(*key, i);
        }

        let fives: Vec<usize> = index
            .iter()
            .filter(|(k, _)| **k == 5)
            .map(|(_, v)| *v)
            .collect();
        assert_eq!(fives, vec![0, 2, 4, 5, 7]);

        let fives_rev: Vec<usize> = index
            .iter_rev()
            .filter(|(k, _)| **k == 5)
            .map(|(_, v)| *v)
            .collect();
        assert_eq!(fives_rev, vec![7, 5, 4, 2, 0]);
    }

    #[test]
    fn test_search_mut() {
        let mut index = OrderedIndex::new();
        for key in 0..20 {
            index.insert(key, vec![key]);
        }

        index.search_mut(&13).unwrap().push(99);
        assert_eq!(index.search(&13), Some(&vec![13, 99]));
        assert!(index.search_mut(&42).is_none());
    }

    #[test]
    fn test_before_stops_at_bound() {
        let mut index = OrderedIndex::new();
        for key in [10, 20, 30, 40, 50] {
            index.insert(key, key);
        }

        let below: Vec<i32> = index.before(&30).map(|(_, v)| *v).collect();
        assert_eq!(below, vec![10, 20]);

        assert_eq!(index.before(&10).count(), 0);
        assert_eq!(index.before(&100).count(), 5);
    }

    #[test]
    fn test_between_rev() {
        let mut index = OrderedIndex::new();
        for key in 0..30 {
            index.insert(key, key);
        }

        let window: Vec<i32> = index.between_rev(&10, &15).map(|(k, _)| *k).collect();
        assert_eq!(window, vec![14, 13, 12, 11, 10]);

        assert_eq!(index.between_rev(&40, &50).count(), 0);
    }

    #[test]
    fn test_first_and_last_key() {
        let mut index = OrderedIndex::new();
        assert!(index.first_key().is_none());

        for key in [7, 3, 9, 1] {
            index.insert(key, ());
        }
        assert_eq!(index.first_key(), Some(&1));
        assert_eq!(index.last_key(), Some(&9));
    }

    #[test]
    fn test_iter_is_exact_size() {
        let mut index = OrderedIndex::new();
        for key in 0..57 {
            index.insert(key, ());
        }

        let mut iter = index.iter();
        assert_eq!(iter.len(), 57);
        iter.next();
        assert_eq!(iter.len(), 56);
    }

    #[test]
    fn test_large_insert_stays_shallow() {
        let mut index = OrderedIndex::new();
        for key in 0..10_000u32 {
            index.insert(key.wrapping_mul(2_654_435_761) % 10_007, key);
        }

        assert_eq!(index.len(), 10_000);
        // Every non-root node has at least ORDER / 2 children
        assert!(index.height() <= 14, "height {} too large", index.height());
    }

    proptest! {
        #[test]
        fn traversal_is_sorted(keys in proptest::collection::vec(any::<i32>(), 0..300)) {
            let mut index = OrderedIndex::new();
            for k in &keys {
                index.insert(*k, ());
            }

            let traversed: Vec<i32> = index.iter().map(|(k, _)| *k).collect();
            let mut expected = keys.clone();
            expected.sort();
            prop_assert_eq!(traversed, expected);
        }

        #[test]
        fn reverse_traversal_mirrors_forward(keys in proptest::collection::vec(0u16..50, 0..200)) {
            let mut index = OrderedIndex::new();
            for (i, k) in keys.iter().enumerate() {
                index.insert(*k, i);
            }

            let mut forward: Vec<(u16, usize)> = index.iter().map(|(k, v)| (*k, *v)).collect();
            let backward: Vec<(u16, usize)> = index.iter_rev().map(|(k, v)| (*k, *v)).collect();
            forward.reverse();
            prop_assert_eq!(forward, backward);
        }

        #[test]
        fn leaves_share_one_depth(keys in proptest::collection::vec(any::<u32>(), 1..400)) {
            let mut index = OrderedIndex::new();
            for k in &keys {
                index.insert(*k, ());
            }

            let height = index.height();
            prop_assert!(index.leaf_depths().iter().all(|d| *d == height));
        }

        #[test]
        fn non_root_nodes_stay_half_full(keys in proptest::collection::vec(any::<u16>(), 1..400)) {
            let mut index = OrderedIndex::new();
            for k in &keys {
                index.insert(*k, ());
            }

            let sizes = index.node_sizes();
            prop_assert!(sizes.iter().all(|n| (ORDER / 2..ORDER).contains(n)), "sizes: {:?}", sizes);
        }

        #[test]
        fn distinct_keys_round_trip(keys in proptest::collection::btree_set(any::<i64>(), 0..300)) {
            let mut index = OrderedIndex::new();
            for k in &keys {
                index.insert(*k, k.wrapping_mul(3));
            }

            prop_assert_eq!(index.ordered_traverse().len(), keys.len());
            for k in &keys {
                prop_assert_eq!(index.search(k), Some(&k.wrapping_mul(3)));
            }
        }
    }
}
