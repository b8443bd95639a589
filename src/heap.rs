use crate::{Entry, QueueError, traits::PriorityStore};
use std::{cmp::Ordering, collections::BinaryHeap};

/// A heap slot: the entry plus the order in which it arrived.
#[derive(Debug)]
struct Slot<T> {
    entry: Entry<T>,
    seq: u64,
}

impl<T> PartialEq for Slot<T> {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl<T> Eq for Slot<T> {}

impl<T> PartialOrd for Slot<T> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl<T> Ord for Slot<T> {
    // Max-heap: higher priority first, then the earlier sequence number.
    fn cmp(&self, other: &Self) -> Ordering {
        self.entry
            .priority
            .cmp(&other.entry.priority)
            .then_with(|| other.seq.cmp(&self.seq))
    }
}

/// Binary-heap store with FIFO tie-breaking.
///
/// A plain heap does not keep equal priorities in arrival order, so every
/// entry is stamped with a monotonically increasing sequence number when it
/// is pushed and ties are broken on that number. Push and pop are O(log n),
/// which pays off over [`OrderedStore`] once queues hold thousands of
/// entries.
///
/// Capacity is tracked the same way as in [`OrderedStore`]: it doubles when a
/// push finds the store full and never shrinks.
///
/// # Examples
///
/// ```
/// use prioq::{Entry, heap::HeapStore};
///
/// # fn main() -> Result<(), prioq::QueueError> {
/// let mut store = HeapStore::try_with_capacity(4)?;
/// store.push(Entry::new("low", 0)).map_err(|(_, e)| e)?;
/// store.push(Entry::new("first", 7)).map_err(|(_, e)| e)?;
/// store.push(Entry::new("second", 7)).map_err(|(_, e)| e)?;
///
/// assert_eq!(store.pop().map(|e| e.value), Some("first"));
/// assert_eq!(store.pop().map(|e| e.value), Some("second"));
/// assert_eq!(store.pop().map(|e| e.value), Some("low"));
/// # Ok(())
/// # }
/// ```
///
/// [`OrderedStore`]: crate::store::OrderedStore
#[derive(Debug)]
pub struct HeapStore<T> {
    heap: BinaryHeap<Slot<T>>,
    capacity: usize,
    next_seq: u64,
}

impl<T> HeapStore<T> {
    /// Create an empty store with `capacity` reserved slots.
    pub fn try_with_capacity(capacity: usize) -> Result<Self, QueueError> {
        let mut heap = BinaryHeap::new();
        heap.try_reserve_exact(capacity)
            .map_err(|_| QueueError::AllocationFailed {
                requested: capacity,
            })?;
        Ok(Self {
            heap,
            capacity,
            next_seq: 0,
        })
    }

    /// Number of live entries.
    pub fn len(&self) -> usize {
        self.heap.len()
    }

    /// Check if the store is empty.
    pub fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }

    /// Number of slots the store has allocated.
    pub const fn capacity(&self) -> usize {
        self.capacity
    }

    /// Drop every entry. The allocated slots are kept.
    pub fn clear(&mut self) {
        self.heap.clear();
        self.next_seq = 0;
    }

    /// Borrow the head entry.
    pub fn peek(&self) -> Option<&Entry<T>> {
        self.heap.peek().map(|slot| &slot.entry)
    }

    /// Remove the head entry.
    pub fn pop(&mut self) -> Option<Entry<T>> {
        let slot = self.heap.pop()?;
        if self.heap.is_empty() {
            self.next_seq = 0;
        }
        Some(slot.entry)
    }

    /// Insert an entry, stamping it behind every earlier entry of the same
    /// priority.
    pub fn push(&mut self, entry: Entry<T>) -> Result<(), (Entry<T>, QueueError)> {
        if self.heap.len() >= self.capacity
            && let Err(e) = self.grow()
        {
            return Err((entry, e));
        }

        let seq = self.next_seq;
        self.next_seq = self.next_seq.wrapping_add(1);
        self.heap.push(Slot { entry, seq });
        Ok(())
    }

    fn grow(&mut self) -> Result<(), QueueError> {
        let requested = self.capacity.max(1).saturating_mul(2);
        self.heap
            .try_reserve_exact(requested - self.heap.len())
            .map_err(|_| QueueError::AllocationFailed { requested })?;
        self.capacity = requested;
        Ok(())
    }
}

impl<T> PriorityStore<T> for HeapStore<T> {
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

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::OrderedStore;

    fn drain<S: PriorityStore<u32>>(store: &mut S) -> Vec<(u32, i32)> {
        std::iter::from_fn(|| store.pop())
            .map(Entry::into_parts)
            .collect()
    }

    #[test]
    fn pops_in_priority_then_arrival_order() {
        let mut store = HeapStore::try_with_capacity(8).unwrap();
        for (value, priority) in [(0, 1), (1, 5), (2, 5), (3, 9), (4, 1), (5, 5)] {
            store.push(Entry::new(value, priority)).unwrap();
        }

        assert_eq!(
            drain(&mut store),
            [(3, 9), (1, 5), (2, 5), (5, 5), (0, 1), (4, 1)]
        );
    }

    #[test]
    fn matches_ordered_store_on_mixed_workload() {
        let mut heap = HeapStore::try_with_capacity(4).unwrap();
        let mut ordered = OrderedStore::try_with_capacity(4).unwrap();

        // Interleave pushes and pops with many repeated priorities.
        let mut popped_heap = Vec::new();
        let mut popped_ordered = Vec::new();
        for i in 0..200u32 {
            let priority = i32::try_from((i * 7) % 5).unwrap() - 2;
            heap.push(Entry::new(i, priority)).unwrap();
            ordered.push(Entry::new(i, priority)).unwrap();
            if i % 3 == 0 {
                popped_heap.push(heap.pop().unwrap().into_parts());
                popped_ordered.push(ordered.pop().unwrap().into_parts());
            }
        }
        popped_heap.extend(drain(&mut heap));
        popped_ordered.extend(drain(&mut ordered));

        assert_eq!(popped_heap, popped_ordered);
    }

    #[test]
    fn peek_matches_pop() {
        let mut store = HeapStore::try_with_capacity(2).unwrap();
        assert!(store.peek().is_none());

        store.push(Entry::new(10, 0)).unwrap();
        store.push(Entry::new(20, 3)).unwrap();
        assert_eq!(store.peek(), Some(&Entry::new(20, 3)));
        assert_eq!(store.pop(), Some(Entry::new(20, 3)));
        assert_eq!(store.peek(), Some(&Entry::new(10, 0)));
    }

    #[test]
    fn grows_by_doubling_and_clear_keeps_capacity() {
        let mut store = HeapStore::try_with_capacity(2).unwrap();
        for i in 0..5 {
            store.push(Entry::new(i, 0)).unwrap();
        }
        assert_eq!(store.capacity(), 8);

        store.clear();
        assert!(store.is_empty());
        assert_eq!(store.capacity(), 8);
    }
}
