use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum HeyError {
    #[error("Remote error: {0}")]
    Remote(String),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Persistence error: {path}: {message}")]
    Persistence { path: String, message: String },

    #[error("Corrupt state: {0}")]
    CorruptState(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Turn cancelled")]
    Cancelled,
}

impl HeyError {
    pub fn persistence(path: &Path, message: impl std::fmt::Display) -> Self {
        Self::Persistence {
            path: path.display().to_string(),
            message: message.to_string(),
        }
    }

    pub fn remote(message: impl Into<String>) -> Self {
        Self::Remote(message.into())
    }

    /// True for failures of the backend or the network path to it.
    pub fn is_remote(&self) -> bool {
        matches!(self, Self::Remote(_) | Self::Http(_))
    }
}

pub type Result<T> = std::result::Result<T, HeyError>;

#[cfg(test)]
mod tests {
    use super::*;

    fn save_somewhere(path: &Path) -> Result<()> {
        Err(HeyError::persistence(path, "read-only file system"))
    }

    #[test]
    fn test_error_classification() {
        assert!(HeyError::remote("418").is_remote());
        assert!(!HeyError::Cancelled.is_remote());
        assert!(!HeyError::CorruptState("x".into()).is_remote());

        let err = save_somewhere(Path::new("/tmp/hey/messages.json")).unwrap_err();
        assert!(!err.is_remote());
        assert_eq!(
            err.to_string(),
            "Persistence error: /tmp/hey/messages.json: read-only file system"
        );
    }
}
