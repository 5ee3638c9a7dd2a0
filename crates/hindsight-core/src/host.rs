//! Collaborator interfaces supplied by the host runtime.
//!
//! The engine only talks to the outside world through these traits. Real
//! adapters live in `hindsight-store`; in-memory doubles live in
//! `hindsight_bridge::mock`.

use std::fmt;
use std::path::Path;

use anyhow::Result;
use serde::{Deserialize, Serialize};

use crate::message::Message;
use crate::session::SessionInfo;

// ── Session store ──

/// A single structured prompt part sent to a reflection session.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum PromptPart {
    Text { text: String },
}

/// Prompt addressed to a named agent inside a session.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PromptRequest {
    pub agent: String,
    pub parts: Vec<PromptPart>,
}

impl PromptRequest {
    /// Concatenated text of all parts.
    pub fn text(&self) -> String {
        self.parts
            .iter()
            .map(|p| match p {
                PromptPart::Text { text } => text.as_str(),
            })
            .collect::<Vec<_>>()
            .join("\n")
    }
}

#[async_trait::async_trait]
pub trait SessionStore: Send + Sync {
    /// Session metadata, or `None` when the session no longer exists.
    async fn get(&self, id: &str) -> Result<Option<SessionInfo>>;

    /// Full message history in chronological order.
    async fn messages(&self, id: &str) -> Result<Vec<Message>>;

    /// Create a new session. `None` means the host did not hand back an id.
    async fn create(&self, title: &str) -> Result<Option<SessionInfo>>;

    async fn prompt(&self, id: &str, request: PromptRequest) -> Result<()>;
}

// ── Marker search ──

/// Looks for a prior analysis artifact mentioning a session id.
///
/// Implementations must not fail: any internal error is reported as `false`.
#[async_trait::async_trait]
pub trait MarkerSearch: Send + Sync {
    async fn exists(&self, dir: &Path, session_id: &str) -> bool;
}

// ── Directory provisioning ──

#[async_trait::async_trait]
pub trait DirProvisioner: Send + Sync {
    /// Create `path` and its parents. Succeeds when it already exists.
    async fn ensure_dir(&self, path: &Path) -> Result<()>;
}

// ── Logging ──

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum LogLevel {
    Debug,
    Info,
    Error,
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LogLevel::Debug => write!(f, "debug"),
            LogLevel::Info => write!(f, "info"),
            LogLevel::Error => write!(f, "error"),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct LogEntry {
    pub service: String,
    pub level: LogLevel,
    pub message: String,
}

#[async_trait::async_trait]
pub trait LogSink: Send + Sync {
    async fn log(&self, entry: LogEntry);
}

// ── Notifications ──

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ToastVariant {
    Info,
    Success,
    Warning,
    Error,
}

/// User-visible, non-blocking notification.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Toast {
    pub message: String,
    pub variant: ToastVariant,
}

#[async_trait::async_trait]
pub trait Notifier: Send + Sync {
    async fn notify(&self, toast: Toast) -> Result<()>;
}
