use std::ops::{Bound, Index, IndexMut, RangeBounds};

pub type NodeId = usize;

/// A single B-tree node.
///
/// Every node stores its key/value pairs sorted by key. Internal nodes
/// additionally have exactly one more child than keys.
#[derive(Clone, Debug)]
pub struct Node<K, V> {
    pub keys: Vec<K>,
    pub values: Vec<V>,
    pub child_nodes: Vec<NodeId>,
}

pub enum SearchResult {
    Found(usize),
    NotFound(usize),
}

/// Entry of the stack used for iterating over a range of keys.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StackEntry {
    Child { parent: NodeId, idx: usize },
    Key { node: NodeId, idx: usize },
}

impl<K, V> Node<K, V>
where
    K: Ord,
{
    pub fn new_leaf() -> Node<K, V> {
        Node {
            keys: Vec::new(),
            values: Vec::new(),
            child_nodes: Vec::new(),
        }
    }

    pub fn is_leaf(&self) -> bool {
        self.child_nodes.is_empty()
    }

    pub fn number_of_keys(&self) -> usize {
        self.keys.len()
    }

    pub fn binary_search(&self, key: &K) -> SearchResult {
        match self.keys.binary_search(key) {
            Ok(i) => SearchResult::Found(i),
            Err(i) => SearchResult::NotFound(i),
        }
    }

    /// Splits this overflowing node at its median.
    ///
    /// The upper half is returned as a new node together with the median
    /// key/value pair, which needs to be inserted into the parent.
    pub fn split(&mut self) -> (K, V, Node<K, V>) {
        let mid = self.keys.len() / 2;

        let right_keys = self.keys.split_off(mid + 1);
        let right_values = self.values.split_off(mid + 1);
        let right_children = if self.is_leaf() {
            Vec::new()
        } else {
            self.child_nodes.split_off(mid + 1)
        };

        // The median is now the last element of this node
        let median_key = self.keys.pop();
        let median_value = self.values.pop();
        let right = Node {
            keys: right_keys,
            values: right_values,
            child_nodes: right_children,
        };
        match (median_key, median_value) {
            (Some(k), Some(v)) => (k, v, right),
            _ => panic!("can not split a node with less than one key"),
        }
    }

    /// Returns the stack entries of this node that can contain keys in the range.
    ///
    /// The entries are sorted so that the smallest key comes first.
    pub fn find_range<R>(&self, node_id: NodeId, range: &R) -> Vec<StackEntry>
    where
        R: RangeBounds<K>,
    {
        let mut result = Vec::with_capacity(self.keys.len() + self.child_nodes.len());
        let is_leaf = self.is_leaf();
        for i in 0..=self.keys.len() {
            if !is_leaf {
                // The child node left of key i only has keys between the
                // previous key and key i.
                let lower_ok = i == 0 || end_after(range.end_bound(), &self.keys[i - 1]);
                let upper_ok =
                    i == self.keys.len() || start_before(range.start_bound(), &self.keys[i]);
                if lower_ok && upper_ok {
                    result.push(StackEntry::Child {
                        parent: node_id,
                        idx: i,
                    });
                }
            }
            if i < self.keys.len() && range.contains(&self.keys[i]) {
                result.push(StackEntry::Key { node: node_id, idx: i });
            }
        }
        result
    }
}

fn start_before<K: Ord>(start: Bound<&K>, key: &K) -> bool {
    match start {
        Bound::Included(s) | Bound::Excluded(s) => s < key,
        Bound::Unbounded => true,
    }
}

fn end_after<K: Ord>(end: Bound<&K>, key: &K) -> bool {
    match end {
        Bound::Included(e) | Bound::Excluded(e) => e > key,
        Bound::Unbounded => true,
    }
}

/// Owns all nodes of a tree. Nodes refer to each other by their [`NodeId`].
///
/// Slots of deleted nodes are reused by later allocations.
#[derive(Clone, Debug)]
pub struct NodeArena<K, V> {
    slots: Vec<Option<Node<K, V>>>,
    free: Vec<NodeId>,
}

impl<K, V> Default for NodeArena<K, V> {
    fn default() -> Self {
        NodeArena {
            slots: Vec::new(),
            free: Vec::new(),
        }
    }
}

impl<K, V> NodeArena<K, V> {
    /// Allocate a new node.
    ///
    /// Returns the ID of the new node.
    pub fn allocate(&mut self, node: Node<K, V>) -> NodeId {
        if let Some(id) = self.free.pop() {
            self.slots[id] = Some(node);
            id
        } else {
            self.slots.push(Some(node));
            self.slots.len() - 1
        }
    }

    /// Remove the node from the arena and return it.
    pub fn release(&mut self, node_id: NodeId) -> Node<K, V> {
        match self.slots.get_mut(node_id).and_then(Option::take) {
            Some(n) => {
                self.free.push(node_id);
                n
            }
            None => panic!("node {} is not allocated", node_id),
        }
    }

    pub fn get(&self, node_id: NodeId) -> Option<&Node<K, V>> {
        self.slots.get(node_id).and_then(Option::as_ref)
    }

    /// Number of allocated nodes.
    pub fn len(&self) -> usize {
        self.slots.len() - self.free.len()
    }

    pub fn clear(&mut self) {
        self.slots.clear();
        self.free.clear();
    }
}

impl<K, V> Index<NodeId> for NodeArena<K, V> {
    type Output = Node<K, V>;

    fn index(&self, node_id: NodeId) -> &Self::Output {
        match self.get(node_id) {
            Some(n) => n,
            None => panic!("node {} is not allocated", node_id),
        }
    }
}

impl<K, V> IndexMut<NodeId> for NodeArena<K, V> {
    fn index_mut(&mut self, node_id: NodeId) -> &mut Self::Output {
        match self.slots.get_mut(node_id).and_then(Option::as_mut) {
            Some(n) => n,
            None => panic!("node {} is not allocated", node_id),
        }
    }
}

#[cfg(test)]
mod tests;
