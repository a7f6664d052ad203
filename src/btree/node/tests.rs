use super::*;

fn leaf(keys: &[u32]) -> Node<u32, u32> {
    Node {
        keys: keys.to_vec(),
        values: keys.iter().map(|k| k * 10).collect(),
        child_nodes: Vec::new(),
    }
}

#[test]
fn allocate_nodes() {
    let mut f: NodeArena<u64, u64> = NodeArena::default();
    let n1 = f.allocate(Node::new_leaf());
    let n2 = f.allocate(Node::new_leaf());
    let n3 = f.allocate(Node::new_leaf());

    assert_eq!(0, n1);
    assert_eq!(1, n2);
    assert_eq!(2, n3);
    assert_eq!(3, f.len());

    assert_eq!(0, f[n1].number_of_keys());
    assert_eq!(true, f[n1].is_leaf());

    // Released slots are reused
    f.release(n2);
    assert_eq!(2, f.len());
    assert!(f.get(n2).is_none());
    let n4 = f.allocate(Node::new_leaf());
    assert_eq!(n2, n4);
}

#[test]
#[should_panic]
fn access_released_node() {
    let mut f: NodeArena<u64, u64> = NodeArena::default();
    let n = f.allocate(Node::new_leaf());
    f.release(n);
    let _ = f[n].number_of_keys();
}

#[test]
fn split_leaf() {
    let mut n = leaf(&[1, 2, 3, 4]);
    let (k, v, right) = n.split();
    assert_eq!(3, k);
    assert_eq!(30, v);
    assert_eq!(vec![1, 2], n.keys);
    assert_eq!(vec![10, 20], n.values);
    assert_eq!(vec![4], right.keys);
    assert_eq!(vec![40], right.values);
}

#[test]
fn split_internal() {
    let mut n = leaf(&[10, 20, 30]);
    n.child_nodes = vec![0, 1, 2, 3];
    let (k, _, right) = n.split();
    assert_eq!(20, k);
    assert_eq!(vec![10], n.keys);
    assert_eq!(vec![0, 1], n.child_nodes);
    assert_eq!(vec![30], right.keys);
    assert_eq!(vec![2, 3], right.child_nodes);
}

#[test]
fn range_entries_of_leaf() {
    let n = leaf(&[1, 3, 5, 7]);
    assert_eq!(
        vec![
            StackEntry::Key { node: 0, idx: 1 },
            StackEntry::Key { node: 0, idx: 2 }
        ],
        n.find_range(0, &(2..=5))
    );
    assert_eq!(4, n.find_range(0, &(..)).len());
    assert!(n.find_range(0, &(8..)).is_empty());
}

#[test]
fn range_entries_of_internal_node() {
    let mut n = leaf(&[10, 20]);
    n.child_nodes = vec![1, 2, 3];
    assert_eq!(
        vec![
            StackEntry::Child { parent: 0, idx: 1 },
            StackEntry::Key { node: 0, idx: 1 },
            StackEntry::Child { parent: 0, idx: 2 },
        ],
        n.find_range(0, &(15..25))
    );
    // Excluded upper bound equal to a key does not need the child right of it
    assert_eq!(
        vec![
            StackEntry::Child { parent: 0, idx: 0 },
            StackEntry::Key { node: 0, idx: 0 },
            StackEntry::Child { parent: 0, idx: 1 },
        ],
        n.find_range(0, &(..20))
    );
}
