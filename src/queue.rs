use crate::{
    Entry, Priority, QueueError,
    heap::HeapStore,
    store::OrderedStore,
    trace::{debug, trace, warn},
    traits::{PriorityStore, QueueConsumer, QueueFactory, QueueProducer},
};
use crossbeam_utils::CachePadded;
use parking_lot::{Condvar, Mutex};
use std::{
    fmt,
    marker::PhantomData,
    sync::{
        Arc,
        atomic::{AtomicU64, Ordering},
    },
    time::{Duration, Instant},
};

/// Limit used when a builder is given a negative limit or none at all.
pub const DEFAULT_LIMIT: usize = 64;

/// Bounded, blocking priority queue.
///
/// A monitor around a [`PriorityStore`]: one mutex guards the store, one
/// condition variable wakes consumers waiting for an entry. On top of the
/// store the queue enforces a fixed logical `limit`; the store itself may
/// have more slots allocated than that, but a push is only admitted while
/// fewer than `limit` entries are queued.
///
/// - **Push** never blocks: a full queue rejects the value and hands it back
/// - **Every accepted push wakes exactly one waiting consumer**
/// - **Waiters re-check the queue after every wake-up**, so a consumer that
///   loses the race for an entry simply goes back to waiting
///
/// Values are moved in and out; the queue never clones or inspects them.
/// Dropping the last `Arc` to the queue drops whatever entries are still
/// queued.
///
/// # Type Parameters
///
/// * `T` - The payload type
/// * `S` - The storage strategy (default: [`OrderedStore`])
///
/// # Examples
///
/// ```
/// use prioq::queue::queue;
///
/// # fn main() -> Result<(), prioq::QueueError> {
/// let q = queue::<&str>().limit(8).build()?;
///
/// q.push("A", 5).map_err(|(_, e)| e)?;
/// q.push("B", 5).map_err(|(_, e)| e)?;
/// q.push("C", 5).map_err(|(_, e)| e)?;
///
/// assert_eq!(q.pop().value, "A");
/// assert_eq!(q.pop().value, "B");
/// assert_eq!(q.pop().value, "C");
/// # Ok(())
/// # }
/// ```
pub struct PriorityQueue<T, S = OrderedStore<T>> {
    store: Mutex<S>,
    available: Condvar,
    limit: usize,
    counters: Counters,
    _phantom: PhantomData<fn(T) -> T>,
}

#[derive(Debug, Default)]
struct Counters {
    pushed: CachePadded<AtomicU64>,
    popped: CachePadded<AtomicU64>,
    rejected: CachePadded<AtomicU64>,
}

/// Lifetime counters of a queue.
///
/// Read without taking the queue's lock, so the three numbers are not a
/// consistent snapshot while producers and consumers are running. The one
/// guarantee is `popped <= pushed`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct QueueStats {
    /// Entries accepted by `push`.
    pub pushed: u64,
    /// Entries handed out by any pop variant or by `drain`.
    pub popped: u64,
    /// Pushes refused because the queue was full or the store could not grow.
    pub rejected: u64,
}

impl<T, S> fmt::Debug for PriorityQueue<T, S>
where
    S: PriorityStore<T>,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PriorityQueue")
            .field("limit", &self.limit)
            .field("len", &self.len())
            .field("is_empty", &self.is_empty())
            .finish_non_exhaustive()
    }
}

/// Builder for creating priority queues.
///
/// # Type Parameters
///
/// * `T` - The payload type
/// * `S` - The storage strategy (default: [`OrderedStore`])
///
/// # Examples
///
/// ```
/// use prioq::{queue::{DEFAULT_LIMIT, queue}, traits::QueueProducer};
///
/// # fn main() -> Result<(), prioq::QueueError> {
/// // A negative limit falls back to the default
/// let q = queue::<u32>().limit(-1).build()?;
/// assert_eq!(q.limit(), DEFAULT_LIMIT);
///
/// let (producer, _consumer) = queue::<u32>().limit(16).channels()?;
/// producer.push(42, 1).map_err(|(_, e)| e)?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct QueueBuilder<T, S = OrderedStore<T>> {
    limit: Option<i64>,
    _phantom: PhantomData<fn() -> (T, S)>,
}

impl<T, S> Default for QueueBuilder<T, S>
where
    S: PriorityStore<T>,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<T, S> QueueBuilder<T, S>
where
    S: PriorityStore<T>,
{
    /// Create a new queue builder
    pub const fn new() -> Self {
        Self {
            limit: None,
            _phantom: PhantomData,
        }
    }

    /// Set the maximum number of queued entries.
    ///
    /// A negative limit selects [`DEFAULT_LIMIT`]. A limit of zero is
    /// accepted and produces a queue that rejects every push.
    #[must_use]
    pub const fn limit(mut self, limit: i64) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Build the queue
    ///
    /// Fails with `QueueError::AllocationFailed` if the initial storage
    /// cannot be reserved.
    pub fn build(self) -> Result<Arc<PriorityQueue<T, S>>, QueueError> {
        let limit = resolve_limit(self.limit);
        Ok(Arc::new(PriorityQueue::new(limit)?))
    }

    /// Create producer/consumer pair
    pub fn channels(self) -> Result<(Producer<T, S>, Consumer<T, S>), QueueError> {
        let queue = self.build()?;
        Ok(queue.channel())
    }
}

fn resolve_limit(limit: Option<i64>) -> usize {
    match limit {
        Some(limit) if limit >= 0 => usize::try_from(limit).unwrap_or(usize::MAX),
        _ => DEFAULT_LIMIT,
    }
}

/// Entry point for queues backed by the insertion-sorted [`OrderedStore`].
///
/// # Examples
///
/// ```
/// use prioq::{queue::queue, traits::{QueueConsumer, QueueProducer}};
///
/// # fn main() -> Result<(), prioq::QueueError> {
/// let (producer, consumer) = queue::<u64>().limit(128).channels()?;
///
/// producer.push(1, 0).map_err(|(_, e)| e)?;
/// producer.push(2, 10).map_err(|(_, e)| e)?;
/// assert_eq!(consumer.pop().value, 2);
/// # Ok(())
/// # }
/// ```
pub const fn queue<T>() -> QueueBuilder<T, OrderedStore<T>> {
    QueueBuilder::new()
}

/// Entry point for queues backed by the sequence-stamped [`HeapStore`].
pub const fn heap_queue<T>() -> QueueBuilder<T, HeapStore<T>> {
    QueueBuilder::new()
}

/// Entry point for queues backed by a custom [`PriorityStore`].
pub const fn queue_with_store<T, S>() -> QueueBuilder<T, S>
where
    S: PriorityStore<T>,
{
    QueueBuilder::new()
}

impl<T, S> PriorityQueue<T, S>
where
    S: PriorityStore<T>,
{
    /// Create a new queue admitting at most `limit` entries
    pub(crate) fn new(limit: usize) -> Result<Self, QueueError> {
        // A zero limit still gets real slots; it just never admits anything.
        let slots = if limit == 0 { DEFAULT_LIMIT } else { limit };
        let store = S::try_with_capacity(slots)?;

        debug!(limit, slots, "priority queue created");

        Ok(Self {
            store: Mutex::new(store),
            available: Condvar::new(),
            limit,
            counters: Counters::default(),
            _phantom: PhantomData,
        })
    }

    /// Get the maximum number of entries the queue admits
    pub const fn limit(&self) -> usize {
        self.limit
    }

    /// Get the number of slots the underlying store has allocated
    pub fn capacity(&self) -> usize {
        self.store.lock().capacity()
    }

    /// Get the current number of queued entries
    pub fn len(&self) -> usize {
        self.store.lock().len()
    }

    /// Check if the queue is empty
    pub fn is_empty(&self) -> bool {
        self.store.lock().is_empty()
    }

    /// Check if the queue is full
    pub fn is_full(&self) -> bool {
        self.store.lock().len() >= self.limit
    }

    /// Priority of the entry the next pop would return
    pub fn peek_priority(&self) -> Option<Priority> {
        self.store.lock().peek().map(|entry| entry.priority)
    }

    /// Lifetime push/pop/reject counters
    pub fn stats(&self) -> QueueStats {
        // `popped` first: any pop it observes was pushed before it.
        let popped = self.counters.popped.load(Ordering::Acquire);
        QueueStats {
            pushed: self.counters.pushed.load(Ordering::Relaxed),
            popped,
            rejected: self.counters.rejected.load(Ordering::Relaxed),
        }
    }

    /// Push a value without blocking.
    ///
    /// A full queue rejects the value with `QueueError::Full`; a store that
    /// cannot grow rejects it with `QueueError::AllocationFailed`. Either
    /// way the value comes back to the caller untouched.
    pub fn push(&self, value: T, priority: Priority) -> Result<(), (T, QueueError)> {
        let mut store = self.store.lock();

        if store.len() >= self.limit {
            drop(store);
            self.counters.rejected.fetch_add(1, Ordering::Relaxed);
            debug!(limit = self.limit, priority, "push rejected: queue is full");
            return Err((value, QueueError::Full));
        }

        if let Err((entry, e)) = store.push(Entry::new(value, priority)) {
            drop(store);
            self.counters.rejected.fetch_add(1, Ordering::Relaxed);
            warn!(error = %e, priority, "push rejected: store could not grow");
            return Err((entry.value, e));
        }

        // Counted under the lock so `popped` never runs ahead of `pushed`.
        self.counters.pushed.fetch_add(1, Ordering::Relaxed);
        trace!(priority, len = store.len(), "pushed");
        // One entry in, one waiter out.
        self.available.notify_one();
        drop(store);
        Ok(())
    }

    /// Pop the highest-priority entry, blocking until one is available
    pub fn pop(&self) -> Entry<T> {
        let mut store = self.store.lock();
        loop {
            if let Some(entry) = self.take(&mut store) {
                return entry;
            }
            self.available.wait(&mut store);
        }
    }

    /// Try to pop an entry without blocking
    pub fn try_pop(&self) -> Result<Entry<T>, QueueError> {
        let mut store = self.store.lock();
        self.take(&mut store).ok_or(QueueError::Empty)
    }

    /// Pop an entry, waiting at most `timeout` for one to arrive.
    ///
    /// The deadline is fixed when the call starts. Wake-ups that find the
    /// queue empty go back to waiting for whatever time is left; once the
    /// deadline passes the queue is checked one final time and
    /// `QueueError::Empty` is returned if it is still empty.
    pub fn pop_timeout(&self, timeout: Duration) -> Result<Entry<T>, QueueError> {
        // An unrepresentable deadline waits without one.
        let deadline = Instant::now().checked_add(timeout);
        let mut store = self.store.lock();

        loop {
            if let Some(entry) = self.take(&mut store) {
                return Ok(entry);
            }

            let timed_out = if let Some(deadline) = deadline {
                self.available.wait_until(&mut store, deadline).timed_out()
            } else {
                self.available.wait(&mut store);
                false
            };

            if timed_out {
                break;
            }
        }

        let entry = self.take(&mut store);
        drop(store);
        if entry.is_none() {
            trace!(?timeout, "timed pop expired");
        }
        entry.ok_or(QueueError::Empty)
    }

    /// Millisecond variant of [`pop_timeout`](Self::pop_timeout)
    pub fn pop_timeout_ms(&self, timeout_ms: u32) -> Result<Entry<T>, QueueError> {
        self.pop_timeout(Duration::from_millis(u64::from(timeout_ms)))
    }

    /// Remove every queued entry, highest priority first
    pub fn drain(&self) -> Vec<Entry<T>> {
        let mut store = self.store.lock();
        let mut drained = Vec::with_capacity(store.len());
        while let Some(entry) = self.take(&mut store) {
            drained.push(entry);
        }
        drop(store);
        drained
    }

    // Caller holds the lock.
    fn take(&self, store: &mut S) -> Option<Entry<T>> {
        let entry = store.pop()?;
        self.counters.popped.fetch_add(1, Ordering::Release);
        trace!(priority = entry.priority, len = store.len(), "popped");
        Some(entry)
    }
}

// Type aliases for common configurations

/// Convenient type alias for [`QueueProducerHandle`].
pub type Producer<T, S = OrderedStore<T>> = QueueProducerHandle<T, S>;

/// Convenient type alias for [`QueueConsumerHandle`].
pub type Consumer<T, S = OrderedStore<T>> = QueueConsumerHandle<T, S>;

/// Producer handle for the priority queue.
///
/// A lightweight, cloneable handle that allows pushing entries to the queue.
/// Every clone shares the same underlying queue via `Arc`.
///
/// # Examples
///
/// ```
/// use prioq::{queue::queue, traits::QueueProducer};
/// use std::thread;
///
/// # fn main() -> Result<(), prioq::QueueError> {
/// let (producer, consumer) = queue::<u64>().limit(128).channels()?;
///
/// // Clone producer for another thread
/// let producer2 = producer.clone();
/// let handle = thread::spawn(move || {
///     producer2.push(42, 1).unwrap();
/// });
///
/// producer.push(100, 0).map_err(|(_, e)| e)?;
/// handle.join().unwrap();
/// # Ok(())
/// # }
/// ```
pub struct QueueProducerHandle<T, S = OrderedStore<T>> {
    queue: Arc<PriorityQueue<T, S>>,
}

impl<T, S> fmt::Debug for QueueProducerHandle<T, S>
where
    S: PriorityStore<T>,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("QueueProducerHandle")
            .field("queue", &self.queue)
            .finish()
    }
}

impl<T, S> Clone for QueueProducerHandle<T, S> {
    fn clone(&self) -> Self {
        Self {
            queue: self.queue.clone(),
        }
    }
}

impl<T, S> QueueProducer<T> for QueueProducerHandle<T, S>
where
    S: PriorityStore<T>,
{
    fn push(&self, value: T, priority: Priority) -> Result<(), (T, QueueError)> {
        self.queue.push(value, priority)
    }
}

/// Consumer handle for the priority queue.
///
/// A lightweight, cloneable handle that allows popping entries from the
/// queue. Every clone shares the same underlying queue via `Arc`.
///
/// # Examples
///
/// ```
/// use prioq::{
///     queue::queue,
///     traits::{QueueConsumer, QueueProducer},
/// };
/// use std::time::Duration;
///
/// # fn main() -> Result<(), prioq::QueueError> {
/// let (producer, consumer) = queue::<i32>().limit(64).channels()?;
///
/// producer.push(1, 0).map_err(|(_, e)| e)?;
/// producer.push(2, 2).map_err(|(_, e)| e)?;
/// producer.push(3, 1).map_err(|(_, e)| e)?;
///
/// assert_eq!(consumer.pop_timeout(Duration::from_millis(5))?.value, 2);
///
/// // Bulk consume
/// let mut sum = 0;
/// consumer.consume(|entry| {
///     sum += entry.value;
///     false // continue until empty
/// });
/// assert_eq!(sum, 4);
/// # Ok(())
/// # }
/// ```
pub struct QueueConsumerHandle<T, S = OrderedStore<T>> {
    queue: Arc<PriorityQueue<T, S>>,
}

impl<T, S> fmt::Debug for QueueConsumerHandle<T, S>
where
    S: PriorityStore<T>,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("QueueConsumerHandle")
            .field("queue", &self.queue)
            .finish()
    }
}

impl<T, S> Clone for QueueConsumerHandle<T, S> {
    fn clone(&self) -> Self {
        Self {
            queue: self.queue.clone(),
        }
    }
}

impl<T, S> QueueConsumer<T> for QueueConsumerHandle<T, S>
where
    S: PriorityStore<T>,
{
    fn pop(&self) -> Entry<T> {
        self.queue.pop()
    }

    fn try_pop(&self) -> Result<Entry<T>, QueueError> {
        self.queue.try_pop()
    }

    fn pop_timeout(&self, timeout: Duration) -> Result<Entry<T>, QueueError> {
        self.queue.pop_timeout(timeout)
    }

    fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    fn size(&self) -> usize {
        self.queue.len()
    }
}

impl<T, S> QueueFactory<T> for Arc<PriorityQueue<T, S>>
where
    S: PriorityStore<T>,
{
    type Producer = QueueProducerHandle<T, S>;
    type Consumer = QueueConsumerHandle<T, S>;

    fn producer(&self) -> Self::Producer {
        QueueProducerHandle {
            queue: self.clone(),
        }
    }

    fn consumer(&self) -> Self::Consumer {
        QueueConsumerHandle {
            queue: self.clone(),
        }
    }
}
