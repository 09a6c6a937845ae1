use crate::clock::{Clock, SystemClock};
use crate::config::AppPaths;
use crate::constants::{memory, paths};
use crate::context::record::ConversationRecord;
use crate::error::{HeyError, Result};
use crate::llm::{Message, Role};
use chrono::Duration;
use std::fs::{self, File};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, warn};

/// Size and age limits for the stored conversation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StorePolicy {
    pub max_messages: usize,
    pub ttl: Duration,
}

impl Default for StorePolicy {
    fn default() -> Self {
        Self {
            max_messages: memory::MAX_MESSAGES,
            ttl: Duration::hours(memory::EXPIRY_HOURS),
        }
    }
}

/// Owns the on-disk conversation record for one profile.
///
/// Expiry is checked on every read; writes replace the file atomically so a
/// reader sees either the previous record or the new one.
pub struct ConversationStore {
    path: PathBuf,
    clock: Arc<dyn Clock>,
    policy: StorePolicy,
}

impl ConversationStore {
    /// Store keeping `messages.json` inside `cache_dir`, on the wall clock.
    pub fn new(cache_dir: impl Into<PathBuf>) -> Self {
        Self {
            path: cache_dir.into().join(paths::MESSAGES_FILE),
            clock: Arc::new(SystemClock),
            policy: StorePolicy::default(),
        }
    }

    pub fn from_paths(app_paths: &AppPaths) -> Self {
        Self::new(&app_paths.cache_dir)
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn with_policy(mut self, policy: StorePolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn policy(&self) -> StorePolicy {
        self.policy
    }

    /// The current conversation, or `None` if there is none, it cannot be
    /// read, it is malformed, or it has expired.
    pub fn load(&self) -> Option<ConversationRecord> {
        let record = match self.read_record() {
            Ok(record) => record?,
            Err(e) => {
                warn!(path = %self.path.display(), error = %e, "discarding stored conversation");
                return None;
            }
        };

        let now = self.clock.now();
        if record.is_expired(now, self.policy.ttl) {
            debug!(last_updated = %record.last_updated, "stored conversation expired");
            return None;
        }
        if record.is_from_future(now, self.policy.ttl) {
            warn!(last_updated = %record.last_updated, "discarding conversation stamped in the future");
            return None;
        }
        Some(record)
    }

    /// Append one message and set the continuation token.
    pub fn append(
        &self,
        role: Role,
        content: impl Into<String>,
        continuation_token: Option<String>,
    ) -> Result<()> {
        let message = Message {
            role,
            content: content.into(),
        };
        self.append_messages(vec![message], continuation_token)
    }

    /// Append a full user/assistant exchange in a single write.
    pub fn append_turn(
        &self,
        user: impl Into<String>,
        assistant: impl Into<String>,
        continuation_token: Option<String>,
    ) -> Result<()> {
        self.append_messages(
            vec![Message::user(user), Message::assistant(assistant)],
            continuation_token,
        )
    }

    fn append_messages(
        &self,
        messages: Vec<Message>,
        continuation_token: Option<String>,
    ) -> Result<()> {
        let now = self.clock.now();
        let mut record = self
            .load()
            .unwrap_or_else(|| ConversationRecord::new(now));

        for message in messages {
            record.push(message, self.policy.max_messages);
        }
        record.continuation_token = continuation_token.filter(|t| !t.is_empty());
        record.last_updated = record.last_updated.max(now);

        self.write_record(&record)
    }

    /// Delete the stored conversation. Deleting nothing is fine.
    pub fn clear(&self) -> Result<()> {
        match fs::remove_file(&self.path) {
            Ok(()) => {
                debug!(path = %self.path.display(), "cleared conversation");
                Ok(())
            }
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(HeyError::persistence(&self.path, e)),
        }
    }

    fn read_record(&self) -> Result<Option<ConversationRecord>> {
        let contents = match fs::read_to_string(&self.path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(HeyError::persistence(&self.path, e)),
        };
        if contents.trim().is_empty() {
            return Ok(None);
        }
        ConversationRecord::from_json(&contents, self.policy.max_messages).map(Some)
    }

    fn write_record(&self, record: &ConversationRecord) -> Result<()> {
        if let Some(dir) = self.path.parent() {
            fs::create_dir_all(dir).map_err(|e| HeyError::persistence(dir, e))?;
        }
        let contents = serde_json::to_string_pretty(record)?;

        // One temp file per process so concurrent writers never share it.
        let tmp_path = self
            .path
            .with_extension(format!("json.{}.tmp", std::process::id()));
        {
            let mut file =
                File::create(&tmp_path).map_err(|e| HeyError::persistence(&tmp_path, e))?;
            if let Err(e) = file
                .write_all(contents.as_bytes())
                .and_then(|_| file.sync_all())
            {
                let _ = fs::remove_file(&tmp_path);
                return Err(HeyError::persistence(&tmp_path, e));
            }
        }

        if let Err(e) = fs::rename(&tmp_path, &self.path) {
            let _ = fs::remove_file(&tmp_path);
            return Err(HeyError::persistence(&self.path, e));
        }

        debug!(
            path = %self.path.display(),
            messages = record.messages.len(),
            "saved conversation"
        );
        Ok(())
    }
}
