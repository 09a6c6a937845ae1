mod record;
pub mod persistence;

pub use record::ConversationRecord;
pub use persistence::{ConversationStore, StorePolicy};
