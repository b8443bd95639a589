//! # Prioq: Bounded Blocking Priority Message Queues
//!
//! Prioq is a bounded, thread-safe priority message queue. Any number of
//! producer threads push values tagged with an integer priority; any number of
//! consumer threads pop the highest-priority pending value, blocking
//! indefinitely, with a timeout, or not at all when nothing is available.
//!
//! ## Features
//!
//! - **Strict priority order**: Larger priorities are delivered first
//! - **FIFO among equals**: Entries with the same priority leave in the order
//!   their pushes acquired the queue's lock
//! - **Backpressure**: A fixed logical limit; pushes beyond it are rejected
//!   immediately and hand the value back to the caller
//! - **Three ways to pop**: Blocking, non-blocking, and deadline-bounded
//! - **Pluggable storage**: An insertion-sorted array (default) or a
//!   sequence-stamped binary heap
//! - **Payload agnostic**: Values are moved in and out, never cloned or
//!   inspected
//!
//! ## Quick Start
//!
//! ```rust
//! use prioq::{
//!     queue::queue,
//!     traits::{QueueConsumer, QueueProducer},
//! };
//!
//! # fn main() -> Result<(), prioq::QueueError> {
//! let (producer, consumer) = queue::<&str>().limit(2).channels()?;
//!
//! producer.push("A", 1).map_err(|(_, e)| e)?;
//! producer.push("B", 5).map_err(|(_, e)| e)?;
//! // Full: the rejected value comes back with the error
//! let (rejected, err) = producer.push("C", 3).unwrap_err();
//! assert_eq!((rejected, err), ("C", prioq::QueueError::Full));
//!
//! assert_eq!(consumer.pop().into_parts(), ("B", 5));
//! producer.push("C", 3).map_err(|(_, e)| e)?;
//! assert_eq!(consumer.pop().into_parts(), ("C", 3));
//! assert_eq!(consumer.pop().into_parts(), ("A", 1));
//! assert!(consumer.try_pop().is_err());
//! # Ok(())
//! # }
//! ```
//!
//! ## Blocking and Timed Pops
//!
//! ```rust
//! use prioq::{
//!     queue::queue,
//!     traits::{QueueConsumer, QueueProducer},
//! };
//! use std::{thread, time::Duration};
//!
//! let (producer, consumer) = queue::<u64>().limit(16).channels().unwrap();
//!
//! let waiter = thread::spawn(move || consumer.pop().into_parts());
//! producer.push(7, 0).unwrap();
//! assert_eq!(waiter.join().unwrap(), (7, 0));
//!
//! let (_, consumer) = queue::<u64>().limit(16).channels().unwrap();
//! assert!(consumer.pop_timeout(Duration::from_millis(10)).is_err());
//! ```
//!
//! ## Storage Strategies
//!
//! The default [`OrderedStore`](store::OrderedStore) keeps entries in a
//! descending array and pays O(n) per push. For deep queues the
//! [`HeapStore`](heap::HeapStore) gives O(log n) push and pop while keeping the
//! same FIFO-among-equals guarantee:
//!
//! ```rust
//! use prioq::{queue::heap_queue, traits::{QueueConsumer, QueueProducer}};
//!
//! let (producer, consumer) = heap_queue::<char>().limit(8).channels().unwrap();
//! for v in ['a', 'b', 'c'] {
//!     producer.push(v, 5).unwrap();
//! }
//! assert_eq!(consumer.pop().value, 'a');
//! assert_eq!(consumer.pop().value, 'b');
//! assert_eq!(consumer.pop().value, 'c');
//! ```
//!
//! ## Error Handling
//!
//! - `QueueError::Full` - The queue already holds `limit` entries
//! - `QueueError::Empty` - Nothing to pop, or a timed pop reached its deadline
//! - `QueueError::AllocationFailed` - The store could not grow its backing
//!   storage
//!
//! ## Tracing
//!
//! With the `tracing` feature enabled the queue emits `tracing` events and
//! [`init_tracing`] installs a formatting subscriber. Without it every
//! event compiles away.
//!
//! ## Minimum Supported Rust Version (MSRV)
//!
//! Prioq requires Rust 1.88 or later.
#![deny(
    missing_docs,
    unused_imports,
    unused_variables,
    dead_code,
    unreachable_code,
    unused_must_use
)]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(
    clippy::module_name_repetitions,
    clippy::must_use_candidate,
    clippy::missing_errors_doc,
    clippy::type_complexity,
    clippy::cargo_common_metadata
)]
#![cfg_attr(docsrs, feature(doc_cfg))]

/// Binary-heap storage strategy with sequence-number tie-breaking.
///
/// This module provides [`HeapStore`], an O(log n) alternative to the
/// insertion-sorted array that still releases equal priorities in arrival
/// order.
///
/// [`HeapStore`]: heap::HeapStore
pub mod heap;

/// The thread-safe priority queue, its builder and its handles.
///
/// This module provides [`PriorityQueue`], the mutex and condition variable
/// monitor that adds blocking pops and a logical limit on top of a
/// [`PriorityStore`].
///
/// [`PriorityQueue`]: queue::PriorityQueue
/// [`PriorityStore`]: traits::PriorityStore
pub mod queue;

/// Insertion-sorted array storage, the default strategy.
///
/// [`OrderedStore`] keeps entries in descending priority order with O(1)
/// access to the head.
///
/// [`OrderedStore`]: store::OrderedStore
pub mod store;

/// Common traits for storage strategies, producers, consumers and factories.
///
/// [`PriorityStore`] is the seam between the queue and its storage;
/// [`QueueProducer`], [`QueueConsumer`] and [`QueueFactory`] give every
/// handle the same API.
///
/// [`PriorityStore`]: traits::PriorityStore
/// [`QueueProducer`]: traits::QueueProducer
/// [`QueueConsumer`]: traits::QueueConsumer
/// [`QueueFactory`]: traits::QueueFactory
pub mod traits;

mod trace;

pub use trace::init_tracing;

use thiserror::Error;

/// Message priority. Larger values are delivered first.
pub type Priority = i32;

/// Errors that can occur during queue operations.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum QueueError {
    /// The queue already holds as many entries as its limit allows.
    ///
    /// Pushes never wait for room; the caller decides whether to retry, drop
    /// the value or slow down upstream.
    #[error("queue is full")]
    Full,

    /// The queue contains no entries to consume.
    ///
    /// Returned by `try_pop` on an empty queue and by `pop_timeout` when the
    /// deadline passes before an entry arrives. The two cases are reported
    /// identically.
    #[error("queue is empty")]
    Empty,

    /// The store could not grow its backing storage.
    #[error("failed to grow queue storage to {requested} slots")]
    AllocationFailed {
        /// The physical capacity the store attempted to reach.
        requested: usize,
    },
}

/// A value paired with the priority it was pushed with.
///
/// # Examples
///
/// ```
/// use prioq::Entry;
///
/// let entry = Entry::new("job", 3);
/// assert_eq!(entry.priority, 3);
/// assert_eq!(entry.into_parts(), ("job", 3));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Entry<T> {
    /// The caller's payload.
    pub value: T,
    /// The priority the payload was pushed with.
    pub priority: Priority,
}

impl<T> Entry<T> {
    /// Pair a value with a priority.
    pub const fn new(value: T, priority: Priority) -> Self {
        Self { value, priority }
    }

    /// Split the entry into `(value, priority)`.
    pub fn into_parts(self) -> (T, Priority) {
        (self.value, self.priority)
    }
}

impl<T> From<(T, Priority)> for Entry<T> {
    fn from((value, priority): (T, Priority)) -> Self {
        Self::new(value, priority)
    }
}
