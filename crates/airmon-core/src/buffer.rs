use crate::error::BufferError;
use airmon_common::types::SensorReading;
use chrono::{DateTime, Duration, Utc};
use std::collections::VecDeque;

/// A bounded, strictly time-ordered window of sensor readings.
///
/// Appends must arrive in increasing timestamp order; anything else is
/// rejected rather than reordered. Eviction runs oldest-first after every
/// append, by count and optionally by age relative to the newest entry.
/// Reads hand out snapshot copies, never live views, so a renderer can
/// iterate while the poll loop keeps appending.
#[derive(Debug, Clone)]
pub struct SeriesBuffer {
    data: VecDeque<SensorReading>,
    capacity: usize,
    max_age: Option<Duration>,
}

impl SeriesBuffer {
    /// Creates a buffer holding at most `capacity` readings.
    /// A capacity of zero is clamped to one so that the newest reading
    /// always survives its own append.
    pub fn new(capacity: usize) -> Self {
        Self {
            data: VecDeque::with_capacity(capacity.max(1)),
            capacity: capacity.max(1),
            max_age: None,
        }
    }

    /// Additionally drops entries older than `max_age` relative to the
    /// newest buffered reading.
    pub fn with_max_age(mut self, max_age: Duration) -> Self {
        self.max_age = Some(max_age);
        self
    }

    /// Appends a reading and evicts until within bounds.
    ///
    /// # Errors
    ///
    /// Returns [`BufferError::OutOfOrder`] when the reading's timestamp is
    /// not strictly after the newest entry; the buffer is left unchanged.
    pub fn append(&mut self, reading: SensorReading) -> Result<(), BufferError> {
        if let Some(last) = self.data.back() {
            if reading.timestamp <= last.timestamp {
                return Err(BufferError::OutOfOrder {
                    last: last.timestamp,
                    incoming: reading.timestamp,
                });
            }
        }
        self.data.push_back(reading);
        self.evict();
        Ok(())
    }

    fn evict(&mut self) {
        while self.data.len() > self.capacity {
            self.data.pop_front();
        }
        if let (Some(max_age), Some(newest)) = (self.max_age, self.data.back()) {
            let cutoff = newest.timestamp - max_age;
            while let Some(front) = self.data.front() {
                if front.timestamp < cutoff {
                    self.data.pop_front();
                } else {
                    break;
                }
            }
        }
    }

    /// Readings with `timestamp >= now - duration`, in insertion order.
    /// Returns an owned copy.
    pub fn window(&self, duration: Duration, now: DateTime<Utc>) -> Vec<SensorReading> {
        let cutoff = now - duration;
        self.data
            .iter()
            .filter(|r| r.timestamp >= cutoff)
            .copied()
            .collect()
    }

    /// The full buffered contents, oldest first, as an owned copy.
    pub fn snapshot(&self) -> Vec<SensorReading> {
        self.data.iter().copied().collect()
    }

    pub fn last_timestamp(&self) -> Option<DateTime<Utc>> {
        self.data.back().map(|r| r.timestamp)
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}
