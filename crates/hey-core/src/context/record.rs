use crate::error::{HeyError, Result};
use crate::llm::Message;
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

const REQUIRED_FIELDS: &[&str] = &["messages", "continuation_token", "last_updated"];

/// The single persisted conversation: recent messages, the backend's
/// continuation token and the time of the last successful turn.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ConversationRecord {
    pub messages: Vec<Message>,
    pub continuation_token: Option<String>,
    pub last_updated: DateTime<Utc>,
}

impl ConversationRecord {
    pub fn new(last_updated: DateTime<Utc>) -> Self {
        Self {
            messages: Vec::new(),
            continuation_token: None,
            last_updated,
        }
    }

    /// Push a message, dropping the oldest ones beyond `max_messages`.
    pub fn push(&mut self, message: Message, max_messages: usize) {
        self.messages.push(message);
        if self.messages.len() > max_messages {
            let excess = self.messages.len() - max_messages;
            self.messages.drain(..excess);
        }
    }

    /// Older than `ttl` as of `now`.
    pub fn is_expired(&self, now: DateTime<Utc>, ttl: Duration) -> bool {
        now.signed_duration_since(self.last_updated) > ttl
    }

    /// Stamped more than `ttl` after `now`, which only a bad clock produces.
    /// Such a record would otherwise never expire.
    pub fn is_from_future(&self, now: DateTime<Utc>, ttl: Duration) -> bool {
        self.last_updated.signed_duration_since(now) > ttl
    }

    /// Parse and validate a stored record. Every field must be present;
    /// nothing is filled in with defaults.
    pub fn from_json(data: &str, max_messages: usize) -> Result<Self> {
        let value: serde_json::Value = serde_json::from_str(data)
            .map_err(|e| HeyError::CorruptState(format!("invalid JSON: {e}")))?;
        let object = value
            .as_object()
            .ok_or_else(|| HeyError::CorruptState("record is not an object".into()))?;
        if let Some(missing) = REQUIRED_FIELDS.iter().find(|f| !object.contains_key(**f)) {
            return Err(HeyError::CorruptState(format!("missing field `{missing}`")));
        }

        let record: Self = serde_json::from_value(value)
            .map_err(|e| HeyError::CorruptState(e.to_string()))?;
        record.validate(max_messages)?;
        Ok(record)
    }

    fn validate(&self, max_messages: usize) -> Result<()> {
        if self.messages.is_empty() {
            return Err(HeyError::CorruptState("record has no messages".into()));
        }
        if self.messages.len() > max_messages {
            return Err(HeyError::CorruptState(format!(
                "record holds {} messages, limit is {max_messages}",
                self.messages.len()
            )));
        }
        if matches!(self.continuation_token.as_deref(), Some("")) {
            return Err(HeyError::CorruptState("empty continuation token".into()));
        }
        Ok(())
    }
}
