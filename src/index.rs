use std::hash::Hash;

use linked_hash_map::LinkedHashMap;
use log::trace;

use crate::{key::KeyType, Btree};

type Bucket<R> = LinkedHashMap<R, ()>;

/// Inverted index from a field value to the records holding that value.
///
/// Values are kept in the order they have been seen first and record
/// identifiers in the order they have been added to a value.
/// A record is registered under at most one value at a time when it is
/// moved with [`Index::update`].
#[derive(Clone, Debug)]
pub struct Index<V, R>
where
    V: Hash + Eq,
    R: Hash + Eq,
{
    buckets: LinkedHashMap<V, Bucket<R>>,
}

impl<V, R> Default for Index<V, R>
where
    V: Hash + Eq,
    R: Hash + Eq,
{
    fn default() -> Self {
        Index {
            buckets: LinkedHashMap::new(),
        }
    }
}

impl<V, R> Index<V, R>
where
    V: Hash + Eq + Clone,
    R: Hash + Eq + Clone,
{
    pub fn new() -> Index<V, R> {
        Index::default()
    }

    /// Register the record under the value.
    pub fn add(&mut self, value: V, record: R) {
        if let Some(bucket) = self.buckets.get_mut(&value) {
            if !bucket.contains_key(&record) {
                bucket.insert(record, ());
            }
        } else {
            let mut bucket = LinkedHashMap::new();
            bucket.insert(record, ());
            self.buckets.insert(value, bucket);
        }
    }

    /// Move the record from the old value to the new value.
    pub fn update(&mut self, record: R, old_value: &V, new_value: V) {
        if old_value != &new_value {
            self.remove_from_bucket(&record, old_value);
        }
        self.add(new_value, record);
    }

    /// Remove the record from the given value or, if no value is given, from
    /// every value it is registered under.
    pub fn remove(&mut self, record: &R, value: Option<&V>) {
        if let Some(value) = value {
            self.remove_from_bucket(record, value);
        } else {
            // Delete the record from all buckets, including stale values
            for v in self.values_of(record) {
                self.remove_from_bucket(record, &v);
            }
        }
    }

    /// All values the record is registered under.
    pub fn values_of(&self, record: &R) -> Vec<V> {
        self.buckets
            .iter()
            .filter(|(_, bucket)| bucket.contains_key(record))
            .map(|(v, _)| v.clone())
            .collect()
    }

    fn remove_from_bucket(&mut self, record: &R, value: &V) -> bool {
        let (removed, now_empty) = match self.buckets.get_mut(value) {
            Some(bucket) => (bucket.remove(record).is_some(), bucket.is_empty()),
            None => (false, false),
        };
        if now_empty {
            trace!("removing empty index bucket");
            self.buckets.remove(value);
        }
        removed
    }

    /// Returns a copy of the records registered under the value.
    pub fn records_for(&self, value: &V) -> Vec<R> {
        self.buckets
            .get(value)
            .map(|bucket| bucket.keys().cloned().collect())
            .unwrap_or_default()
    }

    /// Number of records registered under the value.
    pub fn count_for(&self, value: &V) -> usize {
        self.buckets.get(value).map_or(0, |bucket| bucket.len())
    }

    /// Returns the distinct values in the order they have been seen first.
    pub fn keys(&self) -> Vec<V> {
        self.buckets.keys().cloned().collect()
    }

    pub fn unique_values(&self) -> impl Iterator<Item = &V> {
        self.buckets.keys()
    }

    pub fn contains(&self, value: &V) -> bool {
        self.buckets.contains_key(value)
    }

    /// Number of distinct values.
    pub fn len(&self) -> usize {
        self.buckets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buckets.is_empty()
    }

    /// Remove all values and records.
    pub fn reset(&mut self) {
        self.buckets.clear();
    }
}

/// [`Index`] that additionally keeps its values sorted, allowing to look up
/// all records with a value inside a range.
#[derive(Clone, Debug)]
pub struct OrderedIndex<V, R>
where
    V: Hash + Eq,
    R: Hash + Eq,
{
    index: Index<V, R>,
    /// Distinct values and the number of records registered under them
    sorted: Btree<V, usize>,
}

impl<V, R> Default for OrderedIndex<V, R>
where
    V: KeyType + Hash,
    R: Hash + Eq + Clone,
{
    fn default() -> Self {
        OrderedIndex {
            index: Index::default(),
            sorted: Btree::new(),
        }
    }
}

impl<V, R> OrderedIndex<V, R>
where
    V: KeyType + Hash,
    R: Hash + Eq + Clone,
{
    pub fn new() -> OrderedIndex<V, R> {
        OrderedIndex::default()
    }

    fn sync_value(&mut self, value: &V) {
        let count = self.index.count_for(value);
        if count == 0 {
            self.sorted.delete(value);
        } else if let Some(c) = self.sorted.get_mut(value) {
            *c = count;
        } else {
            self.sorted.put(value.clone(), count);
        }
    }

    pub fn add(&mut self, value: V, record: R) {
        self.index.add(value.clone(), record);
        self.sync_value(&value);
    }

    pub fn update(&mut self, record: R, old_value: &V, new_value: V) {
        self.index.update(record, old_value, new_value.clone());
        self.sync_value(old_value);
        self.sync_value(&new_value);
    }

    pub fn remove(&mut self, record: &R, value: Option<&V>) {
        if let Some(value) = value {
            self.index.remove(record, Some(value));
            self.sync_value(value);
        } else {
            let affected = self.index.values_of(record);
            self.index.remove(record, None);
            for v in affected.iter() {
                self.sync_value(v);
            }
        }
    }

    pub fn records_for(&self, value: &V) -> Vec<R> {
        self.index.records_for(value)
    }

    /// Records with `low <= value <= high`, sorted ascending by value.
    pub fn records_between(&self, low: V, high: V) -> Vec<R> {
        let mut result = Vec::new();
        self.sorted.walk(low, high, |v, _| {
            result.extend(self.index.records_for(v));
        });
        result
    }

    /// Records with `low <= value <= high`, sorted descending by value.
    pub fn records_between_desc(&self, low: V, high: V) -> Vec<R> {
        let mut result = Vec::new();
        self.sorted.walk_desc(low, high, |v, _| {
            result.extend(self.index.records_for(v));
        });
        result
    }

    /// Distinct values with `low <= value <= high` in ascending order.
    pub fn values_between(&self, low: V, high: V) -> Vec<V> {
        let mut result = Vec::new();
        self.sorted.walk(low, high, |v, _| result.push(v.clone()));
        result
    }

    /// Number of records with `low <= value <= high`.
    pub fn count_between(&self, low: V, high: V) -> usize {
        let mut result = 0;
        self.sorted.walk(low, high, |_, c| result += c);
        result
    }

    /// Distinct values in the order they have been seen first.
    pub fn keys(&self) -> Vec<V> {
        self.index.keys()
    }

    pub fn len(&self) -> usize {
        self.index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    pub fn reset(&mut self) {
        self.index.reset();
        self.sorted.clear();
    }
}
