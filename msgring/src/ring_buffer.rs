use parking_lot::Mutex;
use serde::Serialize;
use std::fmt;
use std::time::Duration;

/// A fixed-capacity ring buffer (circular buffer) that overwrites the oldest message when full.
///
/// Slots are allocated once at construction. A read cursor and a write cursor walk them
/// modulo the capacity, and a `full` flag tells "empty" and "full" apart when the two
/// cursors meet. Every operation runs under one lock, so the ring can be shared by any
/// number of producers and a draining consumer.
pub struct MessageRing<T> {
    inner: Mutex<Inner<T>>,
    capacity: usize,
}

struct Inner<T> {
    slots: Box<[Option<T>]>,
    read: usize,
    write: usize,
    full: bool,
    inserted: u64,
    drained: u64,
    evicted: u64,
}

/// Point-in-time counters of a [`MessageRing`], taken under its lock.
///
/// Every pushed message is accounted for: `inserted == live + drained + evicted`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Stats {
    /// Number of slots.
    pub capacity: usize,
    /// Messages pushed and not yet drained or evicted.
    pub live: usize,
    /// Every `push` since construction, including ones a zero-capacity ring discarded.
    pub inserted: u64,
    /// Messages handed out by `drain_batch`.
    pub drained: u64,
    /// Messages overwritten by a push into a full ring, or discarded by a
    /// zero-capacity ring.
    pub evicted: u64,
}

impl<T> Inner<T> {
    fn new(capacity: usize) -> Self {
        Self {
            slots: (0..capacity).map(|_| None).collect(),
            read: 0,
            write: 0,
            full: false,
            inserted: 0,
            drained: 0,
            evicted: 0,
        }
    }

    #[inline]
    fn capacity(&self) -> usize {
        self.slots.len()
    }

    #[inline]
    fn is_empty(&self) -> bool {
        !self.full && self.read == self.write
    }

    #[inline]
    fn len(&self) -> usize {
        if self.full {
            self.capacity()
        } else if self.write >= self.read {
            self.write - self.read
        } else {
            self.capacity() - self.read + self.write
        }
    }

    fn push(&mut self, msg: T) {
        let capacity = self.capacity();
        // No slot to write to: the message is discarded on arrival.
        if capacity == 0 {
            self.inserted = self.inserted.wrapping_add(1);
            self.evicted = self.evicted.wrapping_add(1);
            return;
        }

        if self.full {
            // Evict the oldest before the new message lands in its slot.
            self.slots[self.read] = None;
            self.read = (self.read + 1) % capacity;
            self.evicted = self.evicted.wrapping_add(1);
        }
        self.slots[self.write] = Some(msg);
        self.write = (self.write + 1) % capacity;
        self.full = self.write == self.read;
        self.inserted = self.inserted.wrapping_add(1);
    }

    fn pop(&mut self) -> Option<T> {
        if self.is_empty() {
            return None;
        }
        let msg = self.slots[self.read].take();
        self.read = (self.read + 1) % self.capacity();
        self.full = false;
        msg
    }

    fn drain(&mut self, max: usize) -> Vec<T> {
        let mut batch = Vec::with_capacity(max.min(self.len()));
        while batch.len() < max {
            match self.pop() {
                Some(msg) => batch.push(msg),
                None => break,
            }
        }
        self.drained = self.drained.wrapping_add(batch.len() as u64);
        batch
    }

    fn stats(&self) -> Stats {
        Stats {
            capacity: self.capacity(),
            live: self.len(),
            inserted: self.inserted,
            drained: self.drained,
            evicted: self.evicted,
        }
    }
}

impl<T> MessageRing<T> {
    /// Creates a new `MessageRing` with `capacity` empty slots.
    ///
    /// A capacity of zero is allowed and yields a ring that never holds anything; pushes
    /// into it are counted as evicted.
    pub fn new(capacity: usize) -> Self {
        MessageRing {
            inner: Mutex::new(Inner::new(capacity)),
            capacity,
        }
    }

    /// Inserts `msg`, silently evicting the oldest message if the ring is full.
    ///
    /// Never blocks on capacity and never reports the loss to the caller. On a
    /// zero-capacity ring the message is dropped immediately.
    #[inline]
    pub fn push(&self, msg: T) {
        self.inner.lock().push(msg);
    }

    /// Removes and returns up to `max` of the oldest messages, oldest first.
    ///
    /// An empty ring and `max == 0` both yield an empty `Vec`.
    pub fn drain_batch(&self, max: usize) -> Vec<T> {
        self.inner.lock().drain(max)
    }

    /// Like [`drain_batch`](Self::drain_batch), but gives up with `None` if the lock
    /// cannot be taken within `timeout`.
    pub fn try_drain_batch_for(&self, max: usize, timeout: Duration) -> Option<Vec<T>> {
        self.inner
            .try_lock_for(timeout)
            .map(|mut inner| inner.drain(max))
    }

    /// Number of live messages.
    #[inline]
    pub fn len(&self) -> usize {
        self.inner.lock().len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.inner.lock().is_empty()
    }

    #[inline]
    pub fn is_full(&self) -> bool {
        self.inner.lock().full
    }

    #[inline]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn stats(&self) -> Stats {
        self.inner.lock().stats()
    }
}

impl<T> fmt::Debug for MessageRing<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MessageRing")
            .field("capacity", &self.capacity)
            .field("len", &self.len())
            .finish()
    }
}
