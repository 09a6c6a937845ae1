mod traits;
mod duckchat;

pub use traits::*;
pub use duckchat::DuckChatClient;
