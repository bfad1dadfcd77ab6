//! At-most-once delivery cache for notifications.

use std::collections::HashSet;

use nudge_store::Weekday;

/// Which notification a key identifies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NotifyKind {
    /// The task is due this minute.
    Due,
    /// The task comes up in the configured lead time.
    Upcoming,
}

/// De-duplication identity for one occurrence of a task for one recipient.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct NotificationKey {
    pub day: Weekday,
    pub time: String,
    pub chat_id: i64,
    pub kind: NotifyKind,
}

impl NotificationKey {
    pub fn due(day: Weekday, time: &str, chat_id: i64) -> Self {
        Self {
            day,
            time: time.to_string(),
            chat_id,
            kind: NotifyKind::Due,
        }
    }

    pub fn upcoming(day: Weekday, time: &str, chat_id: i64) -> Self {
        Self {
            day,
            time: time.to_string(),
            chat_id,
            kind: NotifyKind::Upcoming,
        }
    }
}

/// In-memory set of keys already fired today.
///
/// Never persisted: a process restart re-arms all of today's notifications.
/// Bounded in practice by today's entries × subscribers × 2 kinds.
#[derive(Debug, Default)]
pub struct FiredSet {
    keys: HashSet<NotificationKey>,
}

impl FiredSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark a key as fired. Returns true when it had not fired before.
    pub fn mark(&mut self, key: NotificationKey) -> bool {
        self.keys.insert(key)
    }

    pub fn contains(&self, key: &NotificationKey) -> bool {
        self.keys.contains(key)
    }

    /// Daily reset: forget everything so the same times can fire again.
    pub fn clear(&mut self) {
        self.keys.clear();
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }
}
