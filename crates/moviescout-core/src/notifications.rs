use std::collections::VecDeque;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub const DEFAULT_CAPACITY: usize = 5;

/// How a message should be presented
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Success,
    #[default]
    Info,
    Warning,
    Error,
}

impl Severity {
    /// Display category the front-end colors the message with
    pub fn color(&self) -> &'static str {
        match self {
            Severity::Success => "success",
            Severity::Info => "info",
            Severity::Warning => "warning",
            Severity::Error => "error",
        }
    }
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.color())
    }
}

/// A short-lived, user-facing status message
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub id: u64,
    pub text: String,
    pub severity: Severity,
    pub created_at: DateTime<Utc>,
}

/// Bounded FIFO of messages
///
/// Ids start at 1 and are never reused, even after removals or `clear`.
/// When the queue grows past capacity the oldest messages are dropped.
#[derive(Debug, Clone)]
pub struct NotificationQueue {
    queue: VecDeque<Message>,
    capacity: usize,
    next_id: u64,
}

impl NotificationQueue {
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }

    /// Queue holding at most `capacity` messages (at least one)
    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            queue: VecDeque::with_capacity(capacity + 1),
            capacity,
            next_id: 1,
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Queue a message and return its id
    pub fn add_message(&mut self, text: impl Into<String>, severity: Severity) -> u64 {
        let id = self.next_id;
        self.next_id += 1;

        self.queue.push_back(Message {
            id,
            text: text.into(),
            severity,
            created_at: Utc::now(),
        });

        while self.queue.len() > self.capacity {
            self.queue.pop_front();
        }

        id
    }

    /// Queue an `Info` message
    pub fn info(&mut self, text: impl Into<String>) -> u64 {
        self.add_message(text, Severity::Info)
    }

    pub fn remove(&mut self, id: u64) {
        self.queue.retain(|m| m.id != id);
    }

    pub fn clear(&mut self) {
        self.queue.clear();
    }

    /// Take every queued message, oldest first
    pub fn drain(&mut self) -> Vec<Message> {
        self.queue.drain(..).collect()
    }

    pub fn messages(&self) -> impl Iterator<Item = &Message> {
        self.queue.iter()
    }

    pub fn len(&self) -> usize {
        self.queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }
}

impl Default for NotificationQueue {
    fn default() -> Self {
        Self::new()
    }
}
