use crossterm::style::{Color, Stylize};
use std::io::IsTerminal;

/// Colors for status lines. Answers themselves are printed unstyled.
#[derive(Clone)]
pub struct Theme {
    pub enabled: bool,
    pub success: Color,
    pub error: Color,
    pub warning: Color,
    pub accent: Color,
    pub muted: Color,
}

impl Theme {
    pub fn new(enabled: bool) -> Self {
        Self {
            enabled,
            success: Color::Green,
            error: Color::Red,
            warning: Color::Yellow,
            accent: Color::Cyan,
            muted: Color::DarkGrey,
        }
    }

    /// Colors only when stderr is a terminal.
    pub fn detect() -> Self {
        Self::new(std::io::stderr().is_terminal())
    }

    fn paint(&self, text: &str, color: Color) -> String {
        if self.enabled {
            text.with(color).to_string()
        } else {
            text.to_string()
        }
    }

    pub fn success(&self, text: &str) -> String {
        self.paint(text, self.success)
    }

    pub fn warning(&self, text: &str) -> String {
        self.paint(text, self.warning)
    }

    pub fn accent(&self, text: &str) -> String {
        self.paint(text, self.accent)
    }

    pub fn muted(&self, text: &str) -> String {
        self.paint(text, self.muted)
    }

    /// "Error:" label in bold red followed by the message.
    pub fn error(&self, message: &str) -> String {
        if self.enabled {
            format!("{} {message}", "Error:".with(self.error).bold())
        } else {
            format!("Error: {message}")
        }
    }
}

impl Default for Theme {
    fn default() -> Self {
        Self::detect()
    }
}
