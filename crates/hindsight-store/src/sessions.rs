//! Synchronous `std::fs` session store. The async trait methods block the
//! calling task, which suits the single-threaded CLI loop.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use hindsight_core::{Message, PromptRequest, SessionInfo, SessionStore};
use serde::{Deserialize, Serialize};

use crate::write_atomic;

/// On-disk record for one session: `<root>/sessions/<id>.json`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct StoredSession {
    pub info: SessionInfo,
    #[serde(default)]
    pub messages: Vec<Message>,
}

/// Session store over a plain directory tree.
///
/// ```text
/// <root>/sessions/<id>.json   session metadata + messages
/// <root>/prompts/<id>.jsonl   prompts sent to that session, one per line
/// ```
pub struct FsSessionStore {
    root: PathBuf,
}

impl FsSessionStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn session_path(&self, id: &str) -> Result<PathBuf> {
        validate_id(id)?;
        Ok(self.root.join("sessions").join(format!("{id}.json")))
    }

    fn prompts_path(&self, id: &str) -> Result<PathBuf> {
        validate_id(id)?;
        Ok(self.root.join("prompts").join(format!("{id}.jsonl")))
    }

    pub fn load(&self, id: &str) -> Result<Option<StoredSession>> {
        let path = self.session_path(id)?;
        if !path.exists() {
            return Ok(None);
        }
        let content = fs::read_to_string(&path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        let record: StoredSession = serde_json::from_str(&content)
            .with_context(|| format!("failed to parse {}", path.display()))?;
        Ok(Some(record))
    }

    pub fn save(&self, record: &StoredSession) -> Result<()> {
        let path = self.session_path(&record.info.id)?;
        let json = serde_json::to_string_pretty(record)?;
        write_atomic(&path, json.as_bytes())
    }

    /// Prompts previously sent to `id`, oldest first.
    pub fn prompts(&self, id: &str) -> Result<Vec<PromptRequest>> {
        let path = self.prompts_path(id)?;
        if !path.exists() {
            return Ok(Vec::new());
        }
        let content = fs::read_to_string(&path)?;
        content
            .lines()
            .filter(|l| !l.trim().is_empty())
            .map(|l| Ok(serde_json::from_str::<PromptRequest>(l)?))
            .collect()
    }
}

/// Reject ids that would escape the store directory.
fn validate_id(id: &str) -> Result<()> {
    if id.is_empty() || id.contains(['/', '\\']) || id.contains("..") {
        bail!("invalid session id: {id:?}");
    }
    Ok(())
}

fn now_rfc3339() -> String {
    let now = time::OffsetDateTime::now_utc();
    now.format(&time::format_description::well_known::Rfc3339)
        .expect("RFC3339 formatting should not fail")
}

#[async_trait::async_trait]
impl SessionStore for FsSessionStore {
    async fn get(&self, id: &str) -> Result<Option<SessionInfo>> {
        Ok(self.load(id)?.map(|r| r.info))
    }

    async fn messages(&self, id: &str) -> Result<Vec<Message>> {
        Ok(self.load(id)?.map(|r| r.messages).unwrap_or_default())
    }

    async fn create(&self, title: &str) -> Result<Option<SessionInfo>> {
        let info = SessionInfo {
            id: format!("ses_{}", ulid::Ulid::new()),
            title: Some(title.to_string()),
            created_at: Some(now_rfc3339()),
        };
        self.save(&StoredSession {
            info: info.clone(),
            messages: Vec::new(),
        })?;
        Ok(Some(info))
    }

    async fn prompt(&self, id: &str, request: PromptRequest) -> Result<()> {
        if self.load(id)?.is_none() {
            bail!("cannot prompt unknown session {id}");
        }
        let path = self.prompts_path(id)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let line = serde_json::to_string(&request)?;
        let mut file = fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)?;
        writeln!(file, "{line}")?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hindsight_core::{MessagePart, PromptPart};
    use serde_json::json;

    fn sample(id: &str) -> StoredSession {
        StoredSession {
            info: SessionInfo::new(id).with_title("Refactor parser"),
            messages: vec![
                Message::user(vec![MessagePart::text("split the lexer")]),
                Message::assistant(vec![MessagePart::tool(
                    "edit",
                    json!({"filePath": "src/lexer.rs"}),
                )]),
            ],
        }
    }

    #[tokio::test]
    async fn save_then_get_and_messages() {
        let tmp = tempfile::tempdir().unwrap();
        let store = FsSessionStore::new(tmp.path());
        store.save(&sample("ses_1")).unwrap();

        let info = store.get("ses_1").await.unwrap().unwrap();
        assert_eq!(info.title.as_deref(), Some("Refactor parser"));
        let messages = store.messages("ses_1").await.unwrap();
        assert_eq!(messages.len(), 2);
        assert!(messages[0].is_user());
    }

    #[tokio::test]
    async fn unknown_session_is_absent() {
        let tmp = tempfile::tempdir().unwrap();
        let store = FsSessionStore::new(tmp.path());
        assert!(store.get("ses_missing").await.unwrap().is_none());
        assert!(store.messages("ses_missing").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn create_assigns_id_and_timestamp() {
        let tmp = tempfile::tempdir().unwrap();
        let store = FsSessionStore::new(tmp.path());
        let created = store.create("Reflect: Refactor parser").await.unwrap().unwrap();
        assert!(created.id.starts_with("ses_"));
        assert!(created.created_at.is_some());

        let loaded = store.get(&created.id).await.unwrap().unwrap();
        assert_eq!(loaded, created);
    }

    #[tokio::test]
    async fn prompt_appends_lines() {
        let tmp = tempfile::tempdir().unwrap();
        let store = FsSessionStore::new(tmp.path());
        let created = store.create("Reflect: x").await.unwrap().unwrap();
        for text in ["one", "two"] {
            let req = PromptRequest {
                agent: "reflect-classifier".into(),
                parts: vec![PromptPart::Text { text: text.into() }],
            };
            store.prompt(&created.id, req).await.unwrap();
        }
        let prompts = store.prompts(&created.id).unwrap();
        assert_eq!(prompts.len(), 2);
        assert_eq!(prompts[1].text(), "two");
    }

    #[tokio::test]
    async fn prompt_to_unknown_session_fails() {
        let tmp = tempfile::tempdir().unwrap();
        let store = FsSessionStore::new(tmp.path());
        let req = PromptRequest {
            agent: "a".into(),
            parts: vec![],
        };
        assert!(store.prompt("ses_nope", req).await.is_err());
    }

    #[tokio::test]
    async fn traversal_ids_rejected() {
        let tmp = tempfile::tempdir().unwrap();
        let store = FsSessionStore::new(tmp.path());
        assert!(store.get("../etc/passwd").await.is_err());
        assert!(store.get("a/b").await.is_err());
        assert!(store.get("").await.is_err());
    }

    #[test]
    fn corrupt_record_is_an_error() {
        let tmp = tempfile::tempdir().unwrap();
        let store = FsSessionStore::new(tmp.path());
        let path = tmp.path().join("sessions").join("ses_bad.json");
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, "{not json").unwrap();
        assert!(store.load("ses_bad").is_err());
    }
}
