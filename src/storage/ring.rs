// Copyright (c) 2025 Varshith Gudur. Licensed under AGPLv3.
//! Fixed-capacity event ring.
//!
//! Slots are allocated once. When the ring is full, `push` discards the
//! oldest event before writing the new one, so a filled ring always holds
//! the `capacity` most recent events. Eviction is the steady state, not a
//! fault, and is never reported as an error.

use alloc::vec::Vec;

use crate::error::{KernelError, KernelResult};
use crate::event::DispenseEvent;

pub struct EventRing {
    slots: Vec<DispenseEvent>,
    head: usize,
    tail: usize,
    count: usize,
}

impl EventRing {
    /// Allocates every slot up front. Fails with `MemoryError` if the
    /// allocator refuses the request.
    pub fn with_capacity(capacity: usize) -> KernelResult<Self> {
        if capacity == 0 {
            return Err(KernelError::InvalidConfig);
        }
        let mut slots = Vec::new();
        slots
            .try_reserve_exact(capacity)
            .map_err(|_| KernelError::MemoryError)?;
        slots.resize(capacity, DispenseEvent::default());

        Ok(Self {
            slots,
            head: 0,
            tail: 0,
            count: 0,
        })
    }

    /// Appends an event, evicting the oldest one when full.
    /// Returns the evicted event, if any.
    pub fn push(&mut self, event: DispenseEvent) -> Option<DispenseEvent> {
        let capacity = self.slots.len();
        let mut evicted = None;

        if self.count >= capacity {
            evicted = Some(self.slots[self.tail]);
            self.tail = (self.tail + 1) % capacity;
            self.count -= 1;
        }

        self.slots[self.head] = event;
        self.head = (self.head + 1) % capacity;
        self.count = (self.count + 1).min(capacity);

        evicted
    }

    pub fn len(&self) -> usize {
        self.count
    }

    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    pub fn is_full(&self) -> bool {
        self.count == self.slots.len()
    }

    /// Oldest buffered event.
    pub fn oldest(&self) -> Option<&DispenseEvent> {
        self.iter().next()
    }

    /// Newest buffered event.
    pub fn newest(&self) -> Option<&DispenseEvent> {
        if self.count == 0 {
            return None;
        }
        let capacity = self.slots.len();
        Some(&self.slots[(self.head + capacity - 1) % capacity])
    }

    /// Iterates buffered events from oldest to newest.
    pub fn iter(&self) -> RingIter<'_> {
        RingIter {
            ring: self,
            offset: 0,
        }
    }
}

pub struct RingIter<'a> {
    ring: &'a EventRing,
    offset: usize,
}

impl<'a> Iterator for RingIter<'a> {
    type Item = &'a DispenseEvent;

    fn next(&mut self) -> Option<Self::Item> {
        if self.offset >= self.ring.count {
            return None;
        }
        let idx = (self.ring.tail + self.offset) % self.ring.slots.len();
        self.offset += 1;
        Some(&self.ring.slots[idx])
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.ring.count - self.offset;
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for RingIter<'_> {}
