pub mod error;
pub mod clock;
pub mod constants;
pub mod llm;
pub mod context;
pub mod config;
pub mod session;

// Re-export key types
pub use error::HeyError;
pub use clock::{Clock, ManualClock, SystemClock};
pub use llm::{ChatClient, ChatRequest, ChatStream, DuckChatClient, Message, Role, StreamEvent};
pub use context::{ConversationRecord, ConversationStore, StorePolicy};
pub use config::{AppPaths, ProxyRule, Settings};
pub use session::{ChatSession, TurnEvent, TurnResponse};
