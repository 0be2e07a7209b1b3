//! Bounded multi-producer event queue.
//!
//! [`EventQueue`] is a fixed-capacity ring buffer guarded by a single mutex.
//! Producers (platform callback threads) call [`EventQueue::enqueue`], which never
//! blocks on a full queue: the oldest buffered item is evicted instead. The single
//! consumer (the render thread) drains everything once per tick with
//! [`EventQueue::dequeue_all`].
//!
//! ## Invariants
//! - The slot at `first` is `None` iff the queue is empty.
//! - `first == next` with an occupied slot at `first` means the queue is full.
//! - Items come out in the order they were inserted; eviction only ever drops the
//!   stalest item.
//!
//! The lock is held for slot bookkeeping only and never across a callback.

use std::sync::{Mutex, MutexGuard, PoisonError};

/// Capacity used by the framework's event queue.
pub const DEFAULT_QUEUE_CAPACITY: usize = 2048;

struct Ring<T> {
    items: Box<[Option<T>]>,
    first: usize,
    next: usize,
    /// Evictions since the last `dequeue_all`.
    dropped_since_drain: u64,
    /// Evictions since construction.
    dropped_total: u64,
}

impl<T> Ring<T> {
    fn with_capacity(capacity: usize) -> Self {
        Self {
            items: std::iter::repeat_with(|| None).take(capacity).collect(),
            first: 0,
            next: 0,
            dropped_since_drain: 0,
            dropped_total: 0,
        }
    }

    #[inline]
    fn capacity(&self) -> usize {
        self.items.len()
    }

    #[inline]
    fn advance(&self, idx: usize) -> usize {
        let idx = idx + 1;
        if idx == self.capacity() {
            0
        } else {
            idx
        }
    }

    fn len(&self) -> usize {
        if self.first == self.next {
            if self.items[self.first].is_some() {
                self.capacity()
            } else {
                0
            }
        } else if self.next > self.first {
            self.next - self.first
        } else {
            self.next + self.capacity() - self.first
        }
    }

    fn push(&mut self, item: T) {
        if self.first == self.next && self.items[self.first].is_some() {
            // Full: drop the oldest entry.
            self.items[self.first] = None;
            self.first = self.advance(self.first);
            self.dropped_since_drain += 1;
            self.dropped_total += 1;
        }
        self.items[self.next] = Some(item);
        self.next = self.advance(self.next);
    }

    fn pop(&mut self) -> Option<T> {
        let item = self.items[self.first].take();
        if item.is_some() {
            self.first = self.advance(self.first);
        }
        item
    }

    /// Indices of occupied slots, oldest first.
    fn occupied(&self) -> impl Iterator<Item = usize> + '_ {
        let cap = self.capacity();
        (0..self.len()).map(move |offset| (self.first + offset) % cap)
    }
}

/// Thread-safe, fixed-capacity FIFO with drop-oldest backpressure.
///
/// ```
/// use kobold_input::EventQueue;
///
/// let queue = EventQueue::new(4);
/// for n in 1..=6 {
///     queue.enqueue(n);
/// }
/// assert_eq!(queue.dequeue_all(), vec![3, 4, 5, 6]);
/// assert!(queue.dequeue_all().is_empty());
/// ```
pub struct EventQueue<T> {
    ring: Mutex<Ring<T>>,
}

impl<T> EventQueue<T> {
    /// Create a queue holding at most `capacity` items (clamped to at least 1).
    pub fn new(capacity: usize) -> Self {
        Self {
            ring: Mutex::new(Ring::with_capacity(capacity.max(1))),
        }
    }

    /// A queue sized with [`DEFAULT_QUEUE_CAPACITY`].
    pub fn with_default_capacity() -> Self {
        Self::new(DEFAULT_QUEUE_CAPACITY)
    }

    fn lock(&self) -> MutexGuard<'_, Ring<T>> {
        // Cursor updates never straddle a panic point; a poisoned ring is consistent.
        self.ring.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Insert an item. Never blocks; evicts the oldest item when full.
    pub fn enqueue(&self, item: T) {
        self.lock().push(item);
    }

    /// Remove and return the oldest item, if any.
    pub fn dequeue(&self) -> Option<T> {
        self.lock().pop()
    }

    /// Drain every buffered item in FIFO order and reset the queue to empty.
    ///
    /// This is the consumer's once-per-tick operation.
    pub fn dequeue_all(&self) -> Vec<T> {
        let (items, dropped) = {
            let mut ring = self.lock();
            let mut items = Vec::with_capacity(ring.len());
            while let Some(item) = ring.pop() {
                items.push(item);
            }
            ring.first = 0;
            ring.next = 0;
            let dropped = std::mem::take(&mut ring.dropped_since_drain);
            (items, dropped)
        };

        if dropped > 0 {
            log::warn!(
                "event queue overflowed: {dropped} oldest event(s) dropped since last drain"
            );
        }
        items
    }

    /// Number of buffered items.
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    /// `true` if nothing is buffered.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Fixed maximum number of buffered items.
    pub fn capacity(&self) -> usize {
        self.lock().capacity()
    }

    /// Total number of items evicted by overflow since construction.
    pub fn dropped(&self) -> u64 {
        self.lock().dropped_total
    }
}

impl<T: Clone> EventQueue<T> {
    /// Clone of the oldest item without removing it.
    pub fn peek(&self) -> Option<T> {
        let ring = self.lock();
        ring.items[ring.first].clone()
    }

    /// Clones of every buffered item, oldest first, without removing them.
    pub fn peek_all(&self) -> Vec<T> {
        let ring = self.lock();
        ring.occupied()
            .filter_map(|idx| ring.items[idx].clone())
            .collect()
    }
}

impl<T> Default for EventQueue<T> {
    fn default() -> Self {
        Self::with_default_capacity()
    }
}

impl<T> std::fmt::Debug for EventQueue<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let ring = self.lock();
        f.debug_struct("EventQueue")
            .field("len", &ring.len())
            .field("capacity", &ring.capacity())
            .field("dropped", &ring.dropped_total)
            .finish()
    }
}
