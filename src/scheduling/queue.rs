use std::cmp::Ordering;
use std::collections::BinaryHeap;

use crate::reminder::Reminder;

/// Pending reminders ordered by due time. Reminders sharing a due time come
/// out in no particular order.
pub struct ReminderQueue {
    heap: BinaryHeap<QueueEntry>,
}

// BinaryHeap is a max-heap, so entries compare reversed on `when` to surface
// the earliest due time first.
struct QueueEntry(Reminder);

impl Ord for QueueEntry {
    fn cmp(&self, other: &Self) -> Ordering {
        other.0.when.cmp(&self.0.when)
    }
}

impl PartialOrd for QueueEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for QueueEntry {
    fn eq(&self, other: &Self) -> bool {
        self.0.when == other.0.when
    }
}

impl Eq for QueueEntry {}

impl ReminderQueue {
    pub fn new() -> Self {
        Self {
            heap: BinaryHeap::new(),
        }
    }

    pub fn from_reminders(reminders: Vec<Reminder>) -> Self {
        let heap = reminders.into_iter().map(QueueEntry).collect();
        Self { heap }
    }

    pub fn insert(&mut self, reminder: Reminder) {
        self.heap.push(QueueEntry(reminder));
    }

    pub fn peek_earliest(&self) -> Option<&Reminder> {
        self.heap.peek().map(|entry| &entry.0)
    }

    pub fn remove_earliest(&mut self) -> Option<Reminder> {
        self.heap.pop().map(|entry| entry.0)
    }

    pub fn len(&self) -> usize {
        self.heap.len()
    }

    pub fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }

    /// Copies every pending reminder out, in arbitrary order.
    pub fn snapshot(&self) -> Vec<Reminder> {
        self.heap.iter().map(|entry| entry.0.clone()).collect()
    }
}

impl Default for ReminderQueue {
    fn default() -> Self {
        Self::new()
    }
}
