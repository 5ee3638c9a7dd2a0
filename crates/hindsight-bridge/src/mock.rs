//! In-memory collaborators for driving the engine without a host runtime.

use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use anyhow::{bail, Result};
use async_trait::async_trait;
use hindsight_core::{
    DirProvisioner, LogEntry, LogLevel, LogSink, MarkerSearch, Message, MessagePart, Notifier,
    PromptRequest, SessionInfo, SessionStore, Toast,
};

use tokio_util::task::TaskTracker;

use crate::host::Host;

/// Store operations that can be told to fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MockFailure {
    Get,
    Messages,
    Create,
    Prompt,
}

#[derive(Default)]
struct StoreState {
    sessions: HashMap<String, (SessionInfo, Vec<Message>)>,
    failures: HashSet<MockFailure>,
    failing_ids: HashSet<String>,
    create_without_id: bool,
    next_id: usize,
    get_calls: Vec<String>,
    message_calls: Vec<String>,
    created_titles: Vec<String>,
    prompts: Vec<(String, PromptRequest)>,
}

/// Session store over a map, recording every call.
#[derive(Default)]
pub struct MockStore {
    state: Mutex<StoreState>,
}

impl MockStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, (info, messages): (SessionInfo, Vec<Message>)) {
        self.state
            .lock()
            .unwrap()
            .sessions
            .insert(info.id.clone(), (info, messages));
    }

    pub fn fail_on(&self, op: MockFailure) {
        self.state.lock().unwrap().failures.insert(op);
    }

    /// Make `get` fail for this id only.
    pub fn fail_for(&self, id: &str) {
        self.state.lock().unwrap().failing_ids.insert(id.to_string());
    }

    /// Make `create` answer without a session.
    pub fn create_without_id(&self) {
        self.state.lock().unwrap().create_without_id = true;
    }

    pub fn get_calls(&self) -> Vec<String> {
        self.state.lock().unwrap().get_calls.clone()
    }

    pub fn message_calls(&self) -> Vec<String> {
        self.state.lock().unwrap().message_calls.clone()
    }

    pub fn created_titles(&self) -> Vec<String> {
        self.state.lock().unwrap().created_titles.clone()
    }

    pub fn prompts(&self) -> Vec<(String, PromptRequest)> {
        self.state.lock().unwrap().prompts.clone()
    }
}

#[async_trait]
impl SessionStore for MockStore {
    async fn get(&self, id: &str) -> Result<Option<SessionInfo>> {
        let mut state = self.state.lock().unwrap();
        state.get_calls.push(id.to_string());
        if state.failures.contains(&MockFailure::Get) || state.failing_ids.contains(id) {
            bail!("session store unavailable");
        }
        Ok(state.sessions.get(id).map(|(info, _)| info.clone()))
    }

    async fn messages(&self, id: &str) -> Result<Vec<Message>> {
        let mut state = self.state.lock().unwrap();
        state.message_calls.push(id.to_string());
        if state.failures.contains(&MockFailure::Messages) {
            bail!("message fetch failed");
        }
        Ok(state
            .sessions
            .get(id)
            .map(|(_, messages)| messages.clone())
            .unwrap_or_default())
    }

    async fn create(&self, title: &str) -> Result<Option<SessionInfo>> {
        let mut state = self.state.lock().unwrap();
        state.created_titles.push(title.to_string());
        if state.failures.contains(&MockFailure::Create) {
            bail!("session create failed");
        }
        if state.create_without_id {
            return Ok(None);
        }
        state.next_id += 1;
        let info = SessionInfo::new(format!("reflect_{}", state.next_id)).with_title(title);
        state
            .sessions
            .insert(info.id.clone(), (info.clone(), Vec::new()));
        Ok(Some(info))
    }

    async fn prompt(&self, id: &str, request: PromptRequest) -> Result<()> {
        let mut state = self.state.lock().unwrap();
        if state.failures.contains(&MockFailure::Prompt) {
            bail!("prompt rejected");
        }
        state.prompts.push((id.to_string(), request));
        Ok(())
    }
}

/// Marker search answering from a fixed set of ids.
#[derive(Default)]
pub struct StaticMarkers {
    marked: Mutex<HashSet<String>>,
    queries: Mutex<Vec<(PathBuf, String)>>,
}

impl StaticMarkers {
    pub fn mark(&self, session_id: &str) {
        self.marked.lock().unwrap().insert(session_id.to_string());
    }

    pub fn queries(&self) -> Vec<(PathBuf, String)> {
        self.queries.lock().unwrap().clone()
    }
}

#[async_trait]
impl MarkerSearch for StaticMarkers {
    async fn exists(&self, dir: &Path, session_id: &str) -> bool {
        self.queries
            .lock()
            .unwrap()
            .push((dir.to_path_buf(), session_id.to_string()));
        self.marked.lock().unwrap().contains(session_id)
    }
}

/// Directory provisioning that only records paths.
#[derive(Default)]
pub struct MockDirs {
    ensured: Mutex<Vec<PathBuf>>,
    fail: Mutex<bool>,
}

impl MockDirs {
    pub fn fail(&self) {
        *self.fail.lock().unwrap() = true;
    }

    pub fn ensured(&self) -> Vec<PathBuf> {
        self.ensured.lock().unwrap().clone()
    }
}

#[async_trait]
impl DirProvisioner for MockDirs {
    async fn ensure_dir(&self, path: &Path) -> Result<()> {
        if *self.fail.lock().unwrap() {
            bail!("permission denied: {}", path.display());
        }
        self.ensured.lock().unwrap().push(path.to_path_buf());
        Ok(())
    }
}

/// Collects log entries in memory.
#[derive(Default)]
pub struct CollectLog {
    entries: Mutex<Vec<LogEntry>>,
}

impl CollectLog {
    pub fn entries(&self) -> Vec<LogEntry> {
        self.entries.lock().unwrap().clone()
    }

    pub fn messages_at(&self, level: LogLevel) -> Vec<String> {
        self.entries
            .lock()
            .unwrap()
            .iter()
            .filter(|e| e.level == level)
            .map(|e| e.message.clone())
            .collect()
    }
}

#[async_trait]
impl LogSink for CollectLog {
    async fn log(&self, entry: LogEntry) {
        self.entries.lock().unwrap().push(entry);
    }
}

/// Collects toasts in memory; can be told to fail after recording.
#[derive(Default)]
pub struct CollectNotifier {
    toasts: Mutex<Vec<Toast>>,
    fail: Mutex<bool>,
}

impl CollectNotifier {
    pub fn fail(&self) {
        *self.fail.lock().unwrap() = true;
    }

    pub fn toasts(&self) -> Vec<Toast> {
        self.toasts.lock().unwrap().clone()
    }
}

#[async_trait]
impl Notifier for CollectNotifier {
    async fn notify(&self, toast: Toast) -> Result<()> {
        self.toasts.lock().unwrap().push(toast);
        if *self.fail.lock().unwrap() {
            bail!("toast rejected");
        }
        Ok(())
    }
}

/// All mock collaborators, kept as concrete handles for assertions.
#[derive(Default, Clone)]
pub struct MockHost {
    pub store: Arc<MockStore>,
    pub markers: Arc<StaticMarkers>,
    pub dirs: Arc<MockDirs>,
    pub log: Arc<CollectLog>,
    pub notifier: Arc<CollectNotifier>,
    pub tasks: TaskTracker,
}

impl MockHost {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn host(&self) -> Host {
        Host {
            store: self.store.clone(),
            markers: self.markers.clone(),
            dirs: self.dirs.clone(),
            log: self.log.clone(),
            notifier: self.notifier.clone(),
            tasks: self.tasks.clone(),
        }
    }

    pub async fn wait_for_notifications(&self) {
        self.host().wait_for_notifications().await;
    }
}

/// Session fixture with `users` user prompts followed by one assistant
/// message holding `tools` tool invocations.
pub fn session_with_counts(
    id: &str,
    title: &str,
    users: usize,
    tools: usize,
) -> (SessionInfo, Vec<Message>) {
    let mut messages: Vec<Message> = (1..=users)
        .map(|i| Message::user(vec![MessagePart::text(format!("request {i}"))]))
        .collect();
    let calls = (1..=tools)
        .map(|i| MessagePart::tool("bash", serde_json::json!({ "command": format!("step {i}") })))
        .collect();
    messages.push(Message::assistant(calls));
    (SessionInfo::new(id).with_title(title), messages)
}
