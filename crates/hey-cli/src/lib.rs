// Library interface for the hey binary, shared with the integration tests.

pub mod app;
pub mod commands;
pub mod config_editor;
pub mod overrides;
pub mod theme;

pub use commands::{parse_command, Command};
pub use theme::Theme;
