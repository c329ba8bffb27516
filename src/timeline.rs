//! Timed jobs on the widget's single event queue

use std::cmp::{Ordering, Reverse};
use std::collections::BinaryHeap;

use crate::types::Millis;

#[derive(Debug)]
struct Entry<J> {
    at: Millis,
    seq: u64,
    job: J,
}

impl<J> PartialEq for Entry<J> {
    fn eq(&self, other: &Self) -> bool {
        (self.at, self.seq) == (other.at, other.seq)
    }
}

impl<J> Eq for Entry<J> {}

impl<J> PartialOrd for Entry<J> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl<J> Ord for Entry<J> {
    fn cmp(&self, other: &Self) -> Ordering {
        (self.at, self.seq).cmp(&(other.at, other.seq))
    }
}

/// Min-queue of jobs; equal timestamps pop in scheduling order
#[derive(Debug)]
pub struct Timeline<J> {
    entries: BinaryHeap<Reverse<Entry<J>>>,
    next_seq: u64,
}

impl<J> Default for Timeline<J> {
    fn default() -> Self {
        Self {
            entries: BinaryHeap::new(),
            next_seq: 0,
        }
    }
}

impl<J> Timeline<J> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn schedule(&mut self, at: Millis, job: J) {
        self.next_seq += 1;
        self.entries.push(Reverse(Entry {
            at,
            seq: self.next_seq,
            job,
        }));
    }

    pub fn next_due(&self) -> Option<Millis> {
        self.entries.peek().map(|Reverse(entry)| entry.at)
    }

    /// Remove the earliest job due at or before `now`
    pub fn pop_due(&mut self, now: Millis) -> Option<(Millis, J)> {
        if self.next_due()? > now {
            return None;
        }
        self.entries.pop().map(|Reverse(entry)| (entry.at, entry.job))
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
