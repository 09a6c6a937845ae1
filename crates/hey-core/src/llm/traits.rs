use crate::error::Result;
use futures::channel::mpsc::UnboundedReceiver;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Message {
    pub role: Role,
    pub content: String,
}

impl Message {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
        }
    }
}

/// Everything the backend needs for one turn.
#[derive(Debug, Clone)]
pub struct ChatRequest {
    pub model: String,
    /// Prior history followed by the new user message.
    pub messages: Vec<Message>,
    /// `None` asks the backend for a new conversation.
    pub continuation_token: Option<String>,
}

/// Events emitted while an answer streams in.
#[derive(Debug, Clone, PartialEq)]
pub enum StreamEvent {
    TextDelta(String),
    Done,
    Error(String),
}

/// A started answer: the token to use next time plus the chunk stream.
///
/// The receiver is finite and cannot be restarted. Dropping it stops the
/// producer at its next send.
#[derive(Debug)]
pub struct ChatStream {
    pub continuation_token: Option<String>,
    pub events: UnboundedReceiver<StreamEvent>,
}

/// The remote chat backend.
#[async_trait::async_trait]
pub trait ChatClient: Send + Sync {
    /// Send the request and return as soon as the response starts streaming.
    async fn chat_stream(&self, request: ChatRequest) -> Result<ChatStream>;
}
