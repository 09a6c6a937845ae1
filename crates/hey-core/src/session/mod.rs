mod core;

pub use self::core::{ChatSession, TurnEvent, TurnResponse};
