//! Deferred work keyed to the simulation clock
//!
//! Replaces "wait N seconds then do X" with entries polled once per step.
//! Pending entries can be cancelled by id.

use serde::{Deserialize, Serialize};

/// Identifier returned by [`Scheduler::schedule`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TaskId(u64);

#[derive(Debug, Clone, Serialize, Deserialize)]
struct Entry<T> {
    id: TaskId,
    due: f64,
    payload: T,
}

/// Queue of payloads released once the clock reaches their due time
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Scheduler<T> {
    entries: Vec<Entry<T>>,
    next_id: u64,
}

impl<T> Default for Scheduler<T> {
    fn default() -> Self {
        Self {
            entries: Vec::new(),
            next_id: 1,
        }
    }
}

impl<T> Scheduler<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue `payload` to fire `delay` seconds after `now`
    pub fn schedule(&mut self, now: f64, delay: f32, payload: T) -> TaskId {
        let id = TaskId(self.next_id);
        self.next_id += 1;
        self.entries.push(Entry {
            id,
            due: now + delay.max(0.0) as f64,
            payload,
        });
        id
    }

    /// Drop a pending entry. Returns false if it already fired or never existed.
    pub fn cancel(&mut self, id: TaskId) -> bool {
        let before = self.entries.len();
        self.entries.retain(|e| e.id != id);
        self.entries.len() != before
    }

    pub fn is_pending(&self, id: TaskId) -> bool {
        self.entries.iter().any(|e| e.id == id)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Remove and return every payload due at `now`, earliest first
    /// (ties keep scheduling order)
    pub fn poll(&mut self, now: f64) -> Vec<T> {
        let mut due = Vec::new();
        let mut i = 0;
        while i < self.entries.len() {
            if self.entries[i].due <= now {
                due.push(self.entries.remove(i));
            } else {
                i += 1;
            }
        }
        due.sort_by(|a, b| a.due.total_cmp(&b.due).then(a.id.0.cmp(&b.id.0)));
        due.into_iter().map(|e| e.payload).collect()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}
