//! Rolling vote window over recently admitted labels

use std::collections::{HashMap, VecDeque};
use std::num::NonZeroUsize;

pub const DEFAULT_HISTORY_LENGTH: usize = 5;

/// Longest window a config may ask for (several seconds of frames at 60Hz)
pub const MAX_HISTORY_LENGTH: usize = 1024;

// Grows on demand past this
const PREALLOCATED_LABELS: usize = 64;

/// Fixed-capacity FIFO of admitted labels, oldest first
#[derive(Debug, Clone)]
pub struct VoteWindow {
    labels: VecDeque<String>,
    capacity: NonZeroUsize,
}

impl VoteWindow {
    pub fn new(capacity: NonZeroUsize) -> Self {
        Self {
            labels: VecDeque::with_capacity(capacity.get().min(PREALLOCATED_LABELS)),
            capacity,
        }
    }

    /// Append a label, evicting the oldest one once the window is full
    pub fn push(&mut self, label: impl Into<String>) {
        if self.labels.len() == self.capacity.get() {
            self.labels.pop_front();
        }
        self.labels.push_back(label.into());
    }

    /// Most frequent label in the window.
    ///
    /// Ties go to the label whose latest occurrence is most recent, so two
    /// competing gestures with equal votes can't flicker back and forth.
    pub fn majority(&self) -> Option<&str> {
        // label -> (count, index of latest occurrence)
        let mut tally: HashMap<&str, (usize, usize)> = HashMap::with_capacity(self.labels.len());
        for (i, label) in self.labels.iter().enumerate() {
            let entry = tally.entry(label.as_str()).or_insert((0, i));
            entry.0 += 1;
            entry.1 = i;
        }

        tally
            .into_iter()
            .max_by_key(|&(_, (count, last_seen))| (count, last_seen))
            .map(|(label, _)| label)
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity.get()
    }

    /// Labels in window order, oldest first
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.labels.iter().map(String::as_str)
    }

    pub fn clear(&mut self) {
        self.labels.clear();
    }
}
