use crate::{Entry, Priority, QueueError};
use std::time::Duration;

/// Storage strategy behind a [`PriorityQueue`](crate::queue::PriorityQueue).
///
/// A store is a plain, single-threaded container. The queue only touches it
/// while holding its lock, so implementations need no synchronization of
/// their own.
///
/// Every implementation must release entries in non-increasing priority
/// order and, among equal priorities, in the order they were pushed.
pub trait PriorityStore<T> {
    /// Create an empty store with room for `capacity` entries.
    ///
    /// # Returns
    /// The store, or `QueueError::AllocationFailed` if the initial storage
    /// could not be reserved
    fn try_with_capacity(capacity: usize) -> Result<Self, QueueError>
    where
        Self: Sized;

    /// Number of live entries.
    fn len(&self) -> usize;

    /// `true` when the store holds no entries.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Number of entries the store can hold before it has to grow.
    fn capacity(&self) -> usize;

    /// Drop every entry while keeping the allocated storage.
    fn clear(&mut self);

    /// Borrow the highest-priority entry without removing it.
    ///
    /// # Returns
    /// The head entry, or `None` if the store is empty
    fn peek(&self) -> Option<&Entry<T>>;

    /// Remove and return the highest-priority entry.
    ///
    /// # Returns
    /// The head entry, or `None` if the store is empty
    fn pop(&mut self) -> Option<Entry<T>>;

    /// Insert an entry at its ordered position, growing the storage if it is
    /// full.
    ///
    /// # Returns
    /// `Ok(())` on success, or the entry together with
    /// `QueueError::AllocationFailed` if growing failed
    fn push(&mut self, entry: Entry<T>) -> Result<(), (Entry<T>, QueueError)>;
}

/// Trait for queue producers that can push prioritized values into a queue.
///
/// This trait provides a consistent interface for all producer types,
/// whether they're direct queue references or dedicated producer handles.
pub trait QueueProducer<T> {
    /// Push a value with the given priority. Never blocks.
    ///
    /// # Arguments
    /// * `value` - The value to push
    /// * `priority` - Larger values are popped first
    ///
    /// # Returns
    /// `Ok(())` on success, or the value handed back with
    /// `QueueError::Full` / `QueueError::AllocationFailed`
    fn push(&self, value: T, priority: Priority) -> Result<(), (T, QueueError)>;
}

/// Trait for queue consumers that can pop entries from a queue.
///
/// This trait provides a consistent interface for all consumer types,
/// whether they're direct queue references or dedicated consumer handles.
pub trait QueueConsumer<T> {
    /// Pop the highest-priority entry, blocking until one is available.
    fn pop(&self) -> Entry<T>;

    /// Pop the highest-priority entry without blocking.
    ///
    /// # Returns
    /// The popped entry, or `QueueError::Empty` if the queue is empty
    fn try_pop(&self) -> Result<Entry<T>, QueueError>;

    /// Pop the highest-priority entry, waiting at most `timeout` for one to
    /// arrive.
    ///
    /// # Returns
    /// The popped entry, or `QueueError::Empty` if the deadline passed first
    fn pop_timeout(&self, timeout: Duration) -> Result<Entry<T>, QueueError>;

    /// Pop entries without blocking until the queue is empty or the closure
    /// returns true to stop.
    ///
    /// # Arguments
    /// * `consumer` - Function to process each entry, returns true to stop
    ///
    /// # Returns
    /// Number of entries consumed
    fn consume<F>(&self, mut consumer: F) -> usize
    where
        F: FnMut(Entry<T>) -> bool,
    {
        let mut count = 0;
        while let Ok(entry) = self.try_pop() {
            count += 1;
            if consumer(entry) {
                break;
            }
        }
        count
    }

    /// Check if the queue is empty.
    /// Note: In concurrent scenarios, this may be stale as soon as it returns.
    fn is_empty(&self) -> bool;

    /// Get the number of queued entries.
    /// Note: In concurrent scenarios, this may be stale as soon as it returns.
    fn size(&self) -> usize;
}

/// Trait for queues that can create producers and consumers.
pub trait QueueFactory<T> {
    /// The type of producers this queue creates
    type Producer: QueueProducer<T>;

    /// The type of consumers this queue creates
    type Consumer: QueueConsumer<T>;

    /// Create both producer and consumer handles in one call.
    ///
    /// This is a convenience method equivalent to calling both `producer()` and
    /// `consumer()`.
    fn channel(&self) -> (Self::Producer, Self::Consumer) {
        (self.producer(), self.consumer())
    }

    /// Create a new producer handle for this queue.
    fn producer(&self) -> Self::Producer;

    /// Create a new consumer handle for this queue.
    fn consumer(&self) -> Self::Consumer;
}
