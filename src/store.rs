use crate::{Entry, QueueError, traits::PriorityStore};
use std::collections::{VecDeque, vec_deque};

/// Insertion-sorted array of entries, highest priority first.
///
/// The store keeps its entries in non-increasing priority order at all times.
/// A new entry is placed after every entry whose priority is greater than or
/// equal to its own, so equal priorities leave in arrival order.
///
/// - **Peek / pop**: O(1), the head is always the front slot
/// - **Push**: O(log n) to find the slot, O(n) to shift the tail
/// - **Growth**: capacity doubles when a push finds the store full, and never
///   shrinks
///
/// The store is not synchronized. [`PriorityQueue`] owns one behind its
/// mutex; standalone use needs `&mut` access for every mutation.
///
/// # Examples
///
/// ```
/// use prioq::{Entry, store::OrderedStore};
///
/// # fn main() -> Result<(), prioq::QueueError> {
/// let mut store = OrderedStore::try_with_capacity(4)?;
/// store.push(Entry::new('a', 1)).map_err(|(_, e)| e)?;
/// store.push(Entry::new('b', 9)).map_err(|(_, e)| e)?;
/// store.push(Entry::new('c', 1)).map_err(|(_, e)| e)?;
///
/// assert_eq!(store.peek().map(|e| e.value), Some('b'));
/// let order: Vec<char> = store.iter().map(|e| e.value).collect();
/// assert_eq!(order, ['b', 'a', 'c']);
/// # Ok(())
/// # }
/// ```
///
/// [`PriorityQueue`]: crate::queue::PriorityQueue
#[derive(Debug)]
pub struct OrderedStore<T> {
    entries: VecDeque<Entry<T>>,
    capacity: usize,
}

impl<T> OrderedStore<T> {
    /// Create an empty store with `capacity` reserved slots.
    pub fn try_with_capacity(capacity: usize) -> Result<Self, QueueError> {
        let mut entries = VecDeque::new();
        entries
            .try_reserve_exact(capacity)
            .map_err(|_| QueueError::AllocationFailed {
                requested: capacity,
            })?;
        Ok(Self { entries, capacity })
    }

    /// Number of live entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if the store is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of slots the store has allocated.
    pub const fn capacity(&self) -> usize {
        self.capacity
    }

    /// Drop every entry. The allocated slots are kept.
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Borrow the head entry.
    pub fn peek(&self) -> Option<&Entry<T>> {
        self.entries.front()
    }

    /// Remove the head entry. The remaining entries keep their order.
    pub fn pop(&mut self) -> Option<Entry<T>> {
        self.entries.pop_front()
    }

    /// Insert an entry behind every entry of greater or equal priority.
    pub fn push(&mut self, entry: Entry<T>) -> Result<(), (Entry<T>, QueueError)> {
        if self.entries.len() >= self.capacity
            && let Err(e) = self.grow()
        {
            return Err((entry, e));
        }

        // Descending order: the slot is the first one with a strictly lower
        // priority, or the end.
        let idx = self
            .entries
            .partition_point(|existing| existing.priority >= entry.priority);
        self.entries.insert(idx, entry);
        Ok(())
    }

    /// Iterate over the entries from highest to lowest priority.
    pub fn iter(&self) -> vec_deque::Iter<'_, Entry<T>> {
        self.entries.iter()
    }

    fn grow(&mut self) -> Result<(), QueueError> {
        let requested = self.capacity.max(1).saturating_mul(2);
        self.entries
            .try_reserve_exact(requested - self.entries.len())
            .map_err(|_| QueueError::AllocationFailed { requested })?;
        self.capacity = requested;
        Ok(())
    }
}

impl<'a, T> IntoIterator for &'a OrderedStore<T> {
    type Item = &'a Entry<T>;
    type IntoIter = vec_deque::Iter<'a, Entry<T>>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<T> PriorityStore<T> for OrderedStore<T> {
    fn try_with_capacity(capacity: usize) -> Result<Self, QueueError> {
        Self::try_with_capacity(capacity)
    }

    fn len(&self) -> usize {
        Self::len(self)
    }

    fn capacity(&self) -> usize {
        Self::capacity(self)
    }

    fn clear(&mut self) {
        Self::clear(self);
    }

    fn peek(&self) -> Option<&Entry<T>> {
        Self::peek(self)
    }

    fn pop(&mut self) -> Option<Entry<T>> {
        Self::pop(self)
    }

    fn push(&mut self, entry: Entry<T>) -> Result<(), (Entry<T>, QueueError)> {
        Self::push(self, entry)
    }
}
