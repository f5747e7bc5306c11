//! Bounded message history

use std::collections::vec_deque::{self, VecDeque};

use super::MessageRecord;

/// FIFO ring of message records. Once full, each push evicts the oldest.
#[derive(Debug, Clone)]
pub struct Scrollback {
    records: VecDeque<MessageRecord>,
    capacity: usize,
}

impl Scrollback {
    /// `capacity` is clamped to at least one record.
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            records: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Append a record, returning the evicted one when the buffer was full.
    pub fn push(&mut self, record: MessageRecord) -> Option<MessageRecord> {
        let evicted = if self.records.len() == self.capacity {
            self.records.pop_front()
        } else {
            None
        };
        self.records.push_back(record);
        evicted
    }

    /// Ordered view of every retained record, oldest first
    pub fn snapshot(&self) -> vec_deque::Iter<'_, MessageRecord> {
        self.iter()
    }

    pub fn iter(&self) -> vec_deque::Iter<'_, MessageRecord> {
        self.records.iter()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn last(&self) -> Option<&MessageRecord> {
        self.records.back()
    }
}
