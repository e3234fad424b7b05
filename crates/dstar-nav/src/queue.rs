use core::cmp::Ordering;
use std::collections::{BTreeMap, VecDeque};

/// Priority key with a total order so it can index a `BTreeMap`.
#[derive(Debug, Clone, Copy)]
struct Key(f32);

impl Key {
    fn new(priority: f32) -> Self {
        // Fold -0.0 into 0.0 so both land in the same bucket.
        Self(priority + 0.0)
    }
}

impl PartialEq for Key {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Key {}

impl PartialOrd for Key {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Key {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0.total_cmp(&other.0)
    }
}

/// Min-priority queue of FIFO buckets, one bucket per exact priority value.
///
/// Items sharing a priority come out in insertion order. There is no decrease-key: callers
/// re-key an item with [`remove`](Self::remove) followed by [`enqueue`](Self::enqueue).
/// `contains` and `remove` scan every bucket.
#[derive(Debug, Clone)]
pub struct BucketQueue<T> {
    buckets: BTreeMap<Key, VecDeque<T>>,
    len: usize,
}

impl<T> Default for BucketQueue<T> {
    fn default() -> Self {
        Self {
            buckets: BTreeMap::new(),
            len: 0,
        }
    }
}

impl<T: PartialEq> BucketQueue<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Appends `item` to the bucket for `priority`.
    pub fn enqueue(&mut self, item: T, priority: f32) {
        debug_assert!(!priority.is_nan(), "priority must not be NaN");
        self.buckets
            .entry(Key::new(priority))
            .or_default()
            .push_back(item);
        self.len += 1;
    }

    /// Removes the oldest item of the smallest priority, or `None` when empty.
    pub fn dequeue(&mut self) -> Option<T> {
        self.pop_with_priority().map(|(item, _)| item)
    }

    fn pop_with_priority(&mut self) -> Option<(T, f32)> {
        let mut entry = self.buckets.first_entry()?;
        let priority = entry.key().0;
        let item = entry.get_mut().pop_front();
        if entry.get().is_empty() {
            entry.remove();
        }
        let item = item?;
        self.len -= 1;
        Some((item, priority))
    }

    pub(crate) fn peek_priority(&self) -> Option<f32> {
        self.buckets.first_key_value().map(|(key, _)| key.0)
    }

    pub fn contains(&self, item: &T) -> bool {
        self.buckets.values().any(|bucket| bucket.contains(item))
    }

    /// Removes the first occurrence of `item`. Returns `false` if it was not queued.
    pub fn remove(&mut self, item: &T) -> bool {
        let found = self.buckets.iter().find_map(|(key, bucket)| {
            bucket
                .iter()
                .position(|queued| queued == item)
                .map(|index| (*key, index))
        });
        let Some((key, index)) = found else {
            return false;
        };

        if let Some(bucket) = self.buckets.get_mut(&key) {
            bucket.remove(index);
            if bucket.is_empty() {
                self.buckets.remove(&key);
            }
        }
        self.len -= 1;
        true
    }

    pub fn clear(&mut self) {
        self.buckets.clear();
        self.len = 0;
    }

    #[cfg(test)]
    fn iter(&self) -> impl Iterator<Item = (&T, f32)> + '_ {
        self.buckets
            .iter()
            .flat_map(|(key, bucket)| bucket.iter().map(move |item| (item, key.0)))
    }
}
