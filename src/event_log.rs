use std::collections::VecDeque;

pub const EVENT_LOG_CAPACITY: usize = 200;

/// Rendered events, newest first, bounded to `capacity` entries.
#[derive(Debug, Clone)]
pub struct EventLog {
    entries: VecDeque<String>,
    capacity: usize,
}

impl EventLog {
    pub fn new() -> Self {
        Self::with_capacity(EVENT_LOG_CAPACITY)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Record `message` stamped with simulated second `time`; returns the
    /// stamped line.
    pub fn record(&mut self, time: u64, message: impl std::fmt::Display) -> String {
        let line = format!("[T={}s] {}", time, message);
        self.entries.push_front(line.clone());
        while self.entries.len() > self.capacity {
            self.entries.pop_back();
        }
        line
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

impl Default for EventLog {
    fn default() -> Self {
        Self::new()
    }
}
