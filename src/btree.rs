use std::ops::{Bound, RangeBounds, RangeInclusive};

use log::{debug, trace};

use crate::{error::Result, key::KeyType, BtreeConfig, Error};

use node::{Node, NodeArena, NodeId, SearchResult, StackEntry};

mod node;

/// In-memory B-tree mapping ordered keys to values.
///
/// Operations similar to the interface of [`std::collections::BTreeMap`] are
/// implemented, plus the inclusive range walks [`Btree::walk`],
/// [`Btree::walk_desc`] and [`Btree::count`].
///
/// The `order` of the tree is the maximum number of children of a node.
/// Every node except the root holds between `ceil(order / 2) - 1` and
/// `order - 1` keys and all leaves are at the same depth.
#[derive(Clone, Debug)]
pub struct Btree<K, V> {
    nodes: NodeArena<K, V>,
    root_id: NodeId,
    order: usize,
    nr_elements: usize,
}

impl<K, V> Default for Btree<K, V>
where
    K: KeyType,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<K, V> Btree<K, V>
where
    K: KeyType,
{
    /// Create an empty tree with the default configuration.
    pub fn new() -> Btree<K, V> {
        let order = BtreeConfig::default().order;
        let mut nodes = NodeArena::default();
        let root_id = nodes.allocate(Node::new_leaf());
        Btree {
            nodes,
            root_id,
            order,
            nr_elements: 0,
        }
    }

    /// Create an empty tree with the given configuration.
    pub fn with_config(config: BtreeConfig) -> Result<Btree<K, V>> {
        if config.order < 3 {
            return Err(Error::OrderTooSmall(config.order));
        }
        let mut result = Btree::new();
        result.order = config.order;
        Ok(result)
    }

    pub fn order(&self) -> usize {
        self.order
    }

    fn max_keys(&self) -> usize {
        self.order - 1
    }

    fn min_keys(&self) -> usize {
        (self.order + 1) / 2 - 1
    }

    /// Returns the length of the tree.
    pub fn len(&self) -> usize {
        self.nr_elements
    }

    /// Returns true if the tree does not contain any elements.
    pub fn is_empty(&self) -> bool {
        self.nr_elements == 0
    }

    /// Number of levels of the tree, which is 1 for a tree with only a root leaf.
    pub fn height(&self) -> usize {
        let mut height = 1;
        let mut node_id = self.root_id;
        while let Some(first_child) = self.nodes[node_id].child_nodes.first() {
            node_id = *first_child;
            height += 1;
        }
        height
    }

    /// Remove all elements.
    pub fn clear(&mut self) {
        self.nodes.clear();
        self.root_id = self.nodes.allocate(Node::new_leaf());
        self.nr_elements = 0;
    }

    /// Searches for a key in the tree and returns the value if found.
    pub fn get(&self, key: &K) -> Option<&V> {
        self.search(key)
            .map(|(node_id, i)| &self.nodes[node_id].values[i])
    }

    /// Returns a mutable reference to the value of the key if found.
    pub fn get_mut(&mut self, key: &K) -> Option<&mut V> {
        let (node_id, i) = self.search(key)?;
        Some(&mut self.nodes[node_id].values[i])
    }

    /// Returns whether the tree contains the given key.
    pub fn contains_key(&self, key: &K) -> bool {
        self.search(key).is_some()
    }

    /// Insert a new element into the tree.
    ///
    /// Existing values will be overwritten and returned.
    pub fn put(&mut self, key: K, value: V) -> Option<V> {
        // Remember the descent so overflowing nodes can be split bottom-up
        let mut path: Vec<(NodeId, usize)> = Vec::new();
        let mut node_id = self.root_id;
        loop {
            let node = &mut self.nodes[node_id];
            match node.binary_search(&key) {
                SearchResult::Found(i) => {
                    // Key already exists, replace the value
                    let previous = std::mem::replace(&mut node.values[i], value);
                    return Some(previous);
                }
                SearchResult::NotFound(i) => {
                    if node.is_leaf() {
                        node.keys.insert(i, key);
                        node.values.insert(i, value);
                        break;
                    } else {
                        path.push((node_id, i));
                        node_id = node.child_nodes[i];
                    }
                }
            }
        }
        self.nr_elements += 1;

        // Split all nodes on the path that have become too large
        while self.nodes[node_id].number_of_keys() > self.max_keys() {
            let (median_key, median_value, right) = self.nodes[node_id].split();
            let right_id = self.nodes.allocate(right);
            trace!("split node {}, new right sibling is {}", node_id, right_id);
            if let Some((parent_id, idx)) = path.pop() {
                let parent = &mut self.nodes[parent_id];
                parent.keys.insert(idx, median_key);
                parent.values.insert(idx, median_value);
                parent.child_nodes.insert(idx + 1, right_id);
                node_id = parent_id;
            } else {
                // The root was split, the tree grows by one level
                let new_root = Node {
                    keys: vec![median_key],
                    values: vec![median_value],
                    child_nodes: vec![node_id, right_id],
                };
                self.root_id = self.nodes.allocate(new_root);
                debug!("new root node {}, height is now {}", self.root_id, self.height());
                break;
            }
        }
        None
    }

    /// Remove the key from the tree and return its value.
    ///
    /// Removing a non-existing key does not change the tree.
    pub fn delete(&mut self, key: &K) -> Option<V> {
        let mut path: Vec<(NodeId, usize)> = Vec::new();
        let mut node_id = self.root_id;
        let removed = loop {
            let node = &mut self.nodes[node_id];
            match node.binary_search(key) {
                SearchResult::Found(i) => {
                    if node.is_leaf() {
                        node.keys.remove(i);
                        break node.values.remove(i);
                    } else {
                        // Replace the entry with its in-order predecessor,
                        // which is the largest key of the left subtree.
                        path.push((node_id, i));
                        let mut leaf_id = node.child_nodes[i];
                        while let Some(last_child) = self.nodes[leaf_id].child_nodes.last() {
                            let last_idx = self.nodes[leaf_id].child_nodes.len() - 1;
                            path.push((leaf_id, last_idx));
                            leaf_id = *last_child;
                        }
                        let leaf = &mut self.nodes[leaf_id];
                        let (pred_key, pred_value) = match (leaf.keys.pop(), leaf.values.pop()) {
                            (Some(k), Some(v)) => (k, v),
                            _ => panic!("leaf node {} in non-empty subtree has no keys", leaf_id),
                        };
                        let node = &mut self.nodes[node_id];
                        node.keys[i] = pred_key;
                        let removed = std::mem::replace(&mut node.values[i], pred_value);
                        node_id = leaf_id;
                        break removed;
                    }
                }
                SearchResult::NotFound(i) => {
                    if node.is_leaf() {
                        return None;
                    }
                    path.push((node_id, i));
                    node_id = node.child_nodes[i];
                }
            }
        };
        self.nr_elements -= 1;

        self.rebalance(node_id, path);
        Some(removed)
    }

    /// Restores the minimum occupancy of the node after a key was removed from it.
    fn rebalance(&mut self, mut node_id: NodeId, mut path: Vec<(NodeId, usize)>) {
        let min_keys = self.min_keys();
        while self.nodes[node_id].number_of_keys() < min_keys {
            let (parent_id, idx) = match path.pop() {
                Some(p) => p,
                // The root node is allowed to have less keys
                None => break,
            };
            let parent = &self.nodes[parent_id];
            let left_id = if idx > 0 {
                Some(parent.child_nodes[idx - 1])
            } else {
                None
            };
            let right_id = parent.child_nodes.get(idx + 1).copied();

            if let Some(left_id) = left_id.filter(|l| self.nodes[*l].number_of_keys() > min_keys)
            {
                self.rotate_right(parent_id, idx, left_id, node_id);
                trace!("node {} borrowed from left sibling {}", node_id, left_id);
                break;
            } else if let Some(right_id) =
                right_id.filter(|r| self.nodes[*r].number_of_keys() > min_keys)
            {
                self.rotate_left(parent_id, idx, node_id, right_id);
                trace!("node {} borrowed from right sibling {}", node_id, right_id);
                break;
            } else if let Some(left_id) = left_id {
                self.merge(parent_id, idx - 1, left_id, node_id);
                trace!("merged node {} into left sibling {}", node_id, left_id);
            } else if let Some(right_id) = right_id {
                self.merge(parent_id, idx, node_id, right_id);
                trace!("merged right sibling {} into node {}", right_id, node_id);
            } else {
                panic!("node {} has no siblings in parent {}", node_id, parent_id);
            }
            node_id = parent_id;
        }

        // An internal root without keys only has a single child left
        let root = &self.nodes[self.root_id];
        if root.keys.is_empty() && !root.is_leaf() {
            let old_root = self.root_id;
            self.root_id = root.child_nodes[0];
            self.nodes.release(old_root);
            debug!("root node shrunk, height is now {}", self.height());
        }
    }

    /// Move the separator at `idx - 1` down into `node_id` and replace it with
    /// the largest entry of the left sibling.
    fn rotate_right(&mut self, parent_id: NodeId, idx: usize, left_id: NodeId, node_id: NodeId) {
        let left = &mut self.nodes[left_id];
        let (k, v) = match (left.keys.pop(), left.values.pop()) {
            (Some(k), Some(v)) => (k, v),
            _ => panic!("sibling {} has no keys to borrow", left_id),
        };
        let child = left.child_nodes.pop();

        let parent = &mut self.nodes[parent_id];
        let sep_key = std::mem::replace(&mut parent.keys[idx - 1], k);
        let sep_value = std::mem::replace(&mut parent.values[idx - 1], v);

        let node = &mut self.nodes[node_id];
        node.keys.insert(0, sep_key);
        node.values.insert(0, sep_value);
        if let Some(child) = child {
            node.child_nodes.insert(0, child);
        }
    }

    /// Move the separator at `idx` down into `node_id` and replace it with
    /// the smallest entry of the right sibling.
    fn rotate_left(&mut self, parent_id: NodeId, idx: usize, node_id: NodeId, right_id: NodeId) {
        let right = &mut self.nodes[right_id];
        let k = right.keys.remove(0);
        let v = right.values.remove(0);
        let child = if right.is_leaf() {
            None
        } else {
            Some(right.child_nodes.remove(0))
        };

        let parent = &mut self.nodes[parent_id];
        let sep_key = std::mem::replace(&mut parent.keys[idx], k);
        let sep_value = std::mem::replace(&mut parent.values[idx], v);

        let node = &mut self.nodes[node_id];
        node.keys.push(sep_key);
        node.values.push(sep_value);
        if let Some(child) = child {
            node.child_nodes.push(child);
        }
    }

    /// Merge the right node and the separator at `sep_idx` into the left node.
    fn merge(&mut self, parent_id: NodeId, sep_idx: usize, left_id: NodeId, right_id: NodeId) {
        let parent = &mut self.nodes[parent_id];
        let sep_key = parent.keys.remove(sep_idx);
        let sep_value = parent.values.remove(sep_idx);
        parent.child_nodes.remove(sep_idx + 1);

        let right = self.nodes.release(right_id);
        let left = &mut self.nodes[left_id];
        left.keys.push(sep_key);
        left.values.push(sep_value);
        left.keys.extend(right.keys);
        left.values.extend(right.values);
        left.child_nodes.extend(right.child_nodes);
    }

    fn search(&self, key: &K) -> Option<(NodeId, usize)> {
        let mut node_id = self.root_id;
        loop {
            let node = &self.nodes[node_id];
            match node.binary_search(key) {
                SearchResult::Found(i) => return Some((node_id, i)),
                SearchResult::NotFound(i) => {
                    if node.is_leaf() {
                        return None;
                    }
                    // search in the matching child node
                    node_id = node.child_nodes[i];
                }
            }
        }
    }

    /// Returns the entry with the smallest key.
    pub fn first_key_value(&self) -> Option<(&K, &V)> {
        let mut node = &self.nodes[self.root_id];
        while let Some(c) = node.child_nodes.first() {
            node = &self.nodes[*c];
        }
        node.keys.first().zip(node.values.first())
    }

    /// Returns the entry with the largest key.
    pub fn last_key_value(&self) -> Option<(&K, &V)> {
        let mut node = &self.nodes[self.root_id];
        while let Some(c) = node.child_nodes.last() {
            node = &self.nodes[*c];
        }
        node.keys.last().zip(node.values.last())
    }

    /// Return an ascending iterator over a range of keys.
    ///
    /// If you want to iterate over all entries of the tree, use the unbounded `..` range.
    /// Ranges where the start is larger than the end are empty.
    ///
    /// # Example
    ///
    /// ```rust
    /// use record_index::Btree;
    ///
    /// let mut b = Btree::<u16, u16>::new();
    /// b.put(1, 2);
    /// b.put(200, 4);
    /// b.put(20, 3);
    ///
    /// let keys: Vec<_> = b.range(10..).map(|(k, _v)| *k).collect();
    /// assert_eq!(vec![20, 200], keys);
    /// ```
    pub fn range<R>(&self, range: R) -> Range<'_, K, V>
    where
        R: RangeBounds<K>,
    {
        Range::new(self, range, false)
    }

    /// Return a descending iterator over a range of keys.
    pub fn range_desc<R>(&self, range: R) -> Range<'_, K, V>
    where
        R: RangeBounds<K>,
    {
        Range::new(self, range, true)
    }

    /// Return an ascending iterator over all entries.
    pub fn iter(&self) -> Range<'_, K, V> {
        self.range(..)
    }

    /// Visit all entries with `start <= key <= end` in ascending order.
    pub fn walk<F>(&self, start: K, end: K, mut visitor: F)
    where
        F: FnMut(&K, &V),
    {
        for (k, v) in self.range(inclusive(start, end)) {
            visitor(k, v);
        }
    }

    /// Visit all entries with `start <= key <= end` in descending order.
    pub fn walk_desc<F>(&self, start: K, end: K, mut visitor: F)
    where
        F: FnMut(&K, &V),
    {
        for (k, v) in self.range_desc(inclusive(start, end)) {
            visitor(k, v);
        }
    }

    /// Number of keys with `start <= key <= end`.
    pub fn count(&self, start: K, end: K) -> usize {
        if start > end {
            return 0;
        }
        let range = inclusive(start, end);
        self.count_node(self.root_id, &range)
    }

    fn count_node(&self, node_id: NodeId, range: &RangeInclusive<K>) -> usize {
        let node = &self.nodes[node_id];
        node.find_range(node_id, range)
            .into_iter()
            .map(|e| match e {
                StackEntry::Key { .. } => 1,
                StackEntry::Child { parent, idx } => {
                    self.count_node(self.nodes[parent].child_nodes[idx], range)
                }
            })
            .sum()
    }

    /// Checks that the structure of the tree is a valid B-tree.
    pub fn check_invariants(&self) -> Result<()> {
        let mut leaf_depth = None;
        let counted = self.check_node(self.root_id, None, None, 0, &mut leaf_depth)?;
        if counted != self.nr_elements {
            return Err(Error::StructuralCorruption(format!(
                "tree contains {} keys but its length is {}",
                counted, self.nr_elements
            )));
        }
        Ok(())
    }

    fn check_node(
        &self,
        node_id: NodeId,
        lower: Option<&K>,
        upper: Option<&K>,
        depth: usize,
        leaf_depth: &mut Option<usize>,
    ) -> Result<usize> {
        let corrupted = |msg: String| Err(Error::StructuralCorruption(msg));
        let node = match self.nodes.get(node_id) {
            Some(n) => n,
            None => return corrupted(format!("node {} is not allocated", node_id)),
        };

        if node.keys.len() != node.values.len() {
            return corrupted(format!(
                "node {} has {} keys but {} values",
                node_id,
                node.keys.len(),
                node.values.len()
            ));
        }
        if node.keys.len() > self.max_keys() {
            return corrupted(format!("node {} has too many keys", node_id));
        }
        if node_id != self.root_id && node.keys.len() < self.min_keys() {
            return corrupted(format!("node {} has too few keys", node_id));
        }
        if node.keys.windows(2).any(|w| w[0] >= w[1]) {
            return corrupted(format!("keys of node {} are not sorted", node_id));
        }
        let out_of_bounds = node.keys.iter().any(|k| {
            lower.map_or(false, |l| k <= l) || upper.map_or(false, |u| k >= u)
        });
        if out_of_bounds {
            return corrupted(format!(
                "node {} has keys outside the range given by its parent",
                node_id
            ));
        }

        if node.is_leaf() {
            match *leaf_depth {
                Some(d) if d != depth => {
                    return corrupted(format!(
                        "leaf {} has depth {} but other leaves have depth {}",
                        node_id, depth, d
                    ));
                }
                Some(_) => {}
                None => *leaf_depth = Some(depth),
            }
            return Ok(node.keys.len());
        }

        if node.child_nodes.len() != node.keys.len() + 1 {
            return corrupted(format!(
                "internal node {} has {} keys but {} children",
                node_id,
                node.keys.len(),
                node.child_nodes.len()
            ));
        }
        let mut count = node.keys.len();
        for (i, child) in node.child_nodes.iter().enumerate() {
            let child_lower = if i == 0 { lower } else { node.keys.get(i - 1) };
            let child_upper = node.keys.get(i).or(upper);
            count += self.check_node(*child, child_lower, child_upper, depth + 1, leaf_depth)?;
        }
        Ok(count)
    }
}

fn inclusive<K>(start: K, end: K) -> RangeInclusive<K> {
    start..=end
}

impl<'a, K, V> IntoIterator for &'a Btree<K, V>
where
    K: KeyType,
{
    type Item = (&'a K, &'a V);
    type IntoIter = Range<'a, K, V>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<K, V> FromIterator<(K, V)> for Btree<K, V>
where
    K: KeyType,
{
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        let mut result = Btree::new();
        for (k, v) in iter {
            result.put(k, v);
        }
        result
    }
}

/// Iterator over a range of entries of a [`Btree`], in ascending or descending order.
pub struct Range<'a, K, V> {
    start: Bound<K>,
    end: Bound<K>,
    tree: &'a Btree<K, V>,
    stack: Vec<StackEntry>,
    descending: bool,
}

impl<'a, K, V> Range<'a, K, V>
where
    K: KeyType,
{
    fn new<R>(tree: &'a Btree<K, V>, range: R, descending: bool) -> Range<'a, K, V>
    where
        R: RangeBounds<K>,
    {
        // Start to search at the root node
        let start = range.start_bound().cloned();
        let end = range.end_bound().cloned();
        let mut result = Range {
            start,
            end,
            tree,
            stack: Vec::new(),
            descending,
        };
        result.push_node(tree.root_id);
        result
    }

    fn push_node(&mut self, node_id: NodeId) {
        let bounds = (self.start.clone(), self.end.clone());
        let mut new_elements = self.tree.nodes[node_id].find_range(node_id, &bounds);
        // The range is sorted by smallest first, but popping values from the end of the
        // stack is more effective
        if !self.descending {
            new_elements.reverse();
        }
        self.stack.extend(new_elements);
    }
}

impl<'a, K, V> Iterator for Range<'a, K, V>
where
    K: KeyType,
{
    type Item = (&'a K, &'a V);

    fn next(&mut self) -> Option<Self::Item> {
        while let Some(e) = self.stack.pop() {
            match e {
                StackEntry::Child { parent, idx } => {
                    // Add all entries for this child node on the stack
                    let c = self.tree.nodes[parent].child_nodes[idx];
                    self.push_node(c);
                }
                StackEntry::Key { node, idx } => {
                    let tree: &'a Btree<K, V> = self.tree;
                    let n = &tree.nodes[node];
                    return Some((&n.keys[idx], &n.values[idx]));
                }
            }
        }
        None
    }
}
