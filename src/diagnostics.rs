//! In-memory diagnostic log.
//!
//! Recoverable resource errors (a missing or malformed settings file, a light
//! skipped for channel exhaustion) are appended here in addition to the `log`
//! facade, so the application shell can surface them in its debug overlay
//! without scraping logger output. The log is bounded; old entries fall off
//! the front.

use std::collections::VecDeque;

const DEFAULT_CAPACITY: usize = 64;

/// Bounded journal of recoverable-error messages.
#[derive(Debug)]
pub struct DiagnosticLog {
    entries: VecDeque<String>,
    capacity: usize,
}

impl DiagnosticLog {
    #[must_use]
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }

    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: VecDeque::with_capacity(capacity.min(DEFAULT_CAPACITY)),
            capacity: capacity.max(1),
        }
    }

    /// Appends a message, evicting the oldest entry once full.
    pub fn push(&mut self, message: impl Into<String>) {
        if self.entries.len() == self.capacity {
            self.entries.pop_front();
        }
        self.entries.push_back(message.into());
    }

    /// Removes and returns all entries, oldest first.
    pub fn drain(&mut self) -> Vec<String> {
        self.entries.drain(..).collect()
    }

    /// Iterates entries oldest first without consuming them.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(String::as_str)
    }

    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Default for DiagnosticLog {
    fn default() -> Self {
        Self::new()
    }
}
