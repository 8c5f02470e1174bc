//! In-memory error record buffer
//!
//! Pure bookkeeping with no I/O or timers. The telemetry actor is the only
//! owner, so none of this needs locking.

use std::collections::VecDeque;

use leadpipe_domain::ErrorRecord;

/// Ordered list of records awaiting a batch write.
#[derive(Debug)]
pub struct ErrorBuffer {
    records: VecDeque<ErrorRecord>,
    capacity: usize,
}

impl ErrorBuffer {
    /// `capacity` is the length that triggers an immediate flush. It is a
    /// threshold, not a hard limit: restored records may push the buffer past
    /// it.
    pub fn new(capacity: usize) -> Self {
        Self { records: VecDeque::new(), capacity: capacity.max(1) }
    }

    /// Append a record. Returns `true` once the buffer has reached capacity.
    pub fn push(&mut self, record: ErrorRecord) -> bool {
        self.records.push_back(record);
        self.is_full()
    }

    pub fn is_full(&self) -> bool {
        self.records.len() >= self.capacity
    }

    /// Remove every buffered record, oldest first.
    pub fn take_all(&mut self) -> Vec<ErrorRecord> {
        self.records.drain(..).collect()
    }

    /// Put records from a failed flush back in front of anything buffered
    /// since, keeping their original order.
    pub fn restore_front(&mut self, records: Vec<ErrorRecord>) {
        for record in records.into_iter().rev() {
            self.records.push_front(record);
        }
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

    pub fn iter(&self) -> impl Iterator<Item = &ErrorRecord> {
        self.records.iter()
    }
}

#[cfg(test)]
mod tests {
    use leadpipe_domain::{AppError, EnvironmentSnapshot};
    use serde_json::Map;

    use super::*;

    fn record(message: &str) -> ErrorRecord {
        ErrorRecord::new(
            AppError::from_message(message),
            Map::new(),
            EnvironmentSnapshot::capture(None),
        )
    }

    fn messages(buffer: &ErrorBuffer) -> Vec<String> {
        buffer.iter().map(|r| r.message.clone()).collect()
    }

    #[test]
    fn push_reports_capacity() {
        let mut buffer = ErrorBuffer::new(2);
        assert!(!buffer.push(record("a")));
        assert!(buffer.push(record("b")));
        assert_eq!(buffer.len(), 2);
    }

    #[test]
    fn take_all_empties_in_order() {
        let mut buffer = ErrorBuffer::new(10);
        buffer.push(record("a"));
        buffer.push(record("b"));

        let taken: Vec<_> = buffer.take_all().into_iter().map(|r| r.message).collect();
        assert_eq!(taken, vec!["a", "b"]);
        assert!(buffer.is_empty());
    }

    #[test]
    fn restore_front_goes_ahead_of_newer_records() {
        let mut buffer = ErrorBuffer::new(10);
        buffer.push(record("a"));
        buffer.push(record("b"));
        let taken = buffer.take_all();

        buffer.push(record("c"));
        buffer.restore_front(taken);

        assert_eq!(messages(&buffer), vec!["a", "b", "c"]);
    }

    #[test]
    fn restore_after_failed_flush_is_identical() {
        let mut buffer = ErrorBuffer::new(10);
        for message in ["x", "y", "z"] {
            buffer.push(record(message));
        }
        let before: Vec<_> = buffer.iter().map(|r| r.id).collect();

        let taken = buffer.take_all();
        buffer.restore_front(taken);

        let after: Vec<_> = buffer.iter().map(|r| r.id).collect();
        assert_eq!(before, after);
    }

    #[test]
    fn zero_capacity_is_clamped() {
        let mut buffer = ErrorBuffer::new(0);
        assert_eq!(buffer.capacity(), 1);
        assert!(buffer.push(record("a")));
    }
}
