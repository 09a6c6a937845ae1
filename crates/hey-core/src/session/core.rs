use crate::context::ConversationStore;
use crate::error::{HeyError, Result};
use crate::llm::{ChatClient, ChatRequest, ChatStream, Message, StreamEvent};
use futures::StreamExt;
use tokio::sync::mpsc::UnboundedSender;
use tracing::{debug, warn};

/// Events emitted during a turn - the interface between session and CLI.
#[derive(Debug, Clone, PartialEq)]
pub enum TurnEvent {
    /// The request is about to go out. `resumed` is true when stored history
    /// and a continuation token are being sent along.
    Started { resumed: bool },
    TextDelta(String),
    Complete,
    Error(String),
}

#[derive(Debug)]
pub struct TurnResponse {
    /// The answer as streamed.
    pub content: String,
    pub resumed: bool,
    /// Set when the answer arrived but history could not be saved.
    pub persist_error: Option<HeyError>,
}

/// Runs single turns against a backend, keeping history in a store.
pub struct ChatSession<'a> {
    client: Box<dyn ChatClient>,
    store: &'a ConversationStore,
    model: String,
    system_prompt: Option<String>,
}

impl<'a> ChatSession<'a> {
    pub fn new(
        client: Box<dyn ChatClient>,
        store: &'a ConversationStore,
        model: impl Into<String>,
    ) -> Self {
        Self {
            client,
            store,
            model: model.into(),
            system_prompt: None,
        }
    }

    pub fn with_system_prompt(mut self, prompt: Option<String>) -> Self {
        self.system_prompt = prompt.filter(|p| !p.trim().is_empty());
        self
    }

    /// Run a turn and return the final response.
    pub async fn send(&self, prompt: impl Into<String>) -> Result<TurnResponse> {
        let (tx, _rx) = tokio::sync::mpsc::unbounded_channel();
        self.handle_turn(prompt, tx).await
    }

    /// Run a turn, emitting TurnEvents through the channel.
    ///
    /// History is only written after the stream completes. A failed or
    /// abandoned turn leaves the store exactly as it was.
    pub async fn handle_turn(
        &self,
        prompt: impl Into<String>,
        event_tx: UnboundedSender<TurnEvent>,
    ) -> Result<TurnResponse> {
        let prompt = prompt.into();

        let record = self.store.load();
        let resumed = record.is_some();
        let (mut messages, continuation_token) = record
            .map(|r| (r.messages, r.continuation_token))
            .unwrap_or_default();
        messages.push(Message::user(self.outgoing_text(&prompt)));

        let request = ChatRequest {
            model: self.model.clone(),
            messages,
            continuation_token,
        };

        debug!(resumed, history = request.messages.len() - 1, "starting turn");
        let _ = event_tx.send(TurnEvent::Started { resumed });

        let ChatStream {
            continuation_token: next_token,
            mut events,
        } = self
            .client
            .chat_stream(request)
            .await
            .inspect_err(|e| {
                let _ = event_tx.send(TurnEvent::Error(e.to_string()));
            })?;

        let mut content = String::new();
        let mut completed = false;

        while let Some(event) = events.next().await {
            match event {
                StreamEvent::TextDelta(delta) => {
                    content.push_str(&delta);
                    let _ = event_tx.send(TurnEvent::TextDelta(delta));
                }
                StreamEvent::Done => {
                    completed = true;
                    break;
                }
                StreamEvent::Error(err) => {
                    let _ = event_tx.send(TurnEvent::Error(err.clone()));
                    return Err(HeyError::Remote(err));
                }
            }
        }

        if !completed {
            let err = "response stream ended before completion";
            let _ = event_tx.send(TurnEvent::Error(err.to_string()));
            return Err(HeyError::remote(err));
        }

        let persist_error = self
            .store
            .append_turn(prompt, content.trim(), next_token)
            .err();
        if let Some(ref e) = persist_error {
            warn!(error = %e, "answer received but history was not saved");
        }

        let _ = event_tx.send(TurnEvent::Complete);

        Ok(TurnResponse {
            content,
            resumed,
            persist_error,
        })
    }

    fn outgoing_text(&self, prompt: &str) -> String {
        match self.system_prompt {
            Some(ref system) => format!("{system}: {prompt}"),
            None => prompt.to_string(),
        }
    }
}
