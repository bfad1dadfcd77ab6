//! Message types crossing the channel boundary.

use chrono::{DateTime, Utc};

/// A text message received from the platform.
#[derive(Debug, Clone)]
pub struct IncomingMessage {
    /// Platform chat identifier; doubles as the subscriber id.
    pub chat_id: i64,
    pub sender_name: Option<String>,
    pub text: String,
    pub timestamp: DateTime<Utc>,
}

/// A text message to push to one recipient.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutgoingMessage {
    pub chat_id: i64,
    pub text: String,
}
