use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

pub const SESSION_CREATED: &str = "session.created";
pub const SESSION_IDLE: &str = "session.idle";

/// Property keys that may carry the session id, in priority order.
const SESSION_ID_KEYS: [&str; 2] = ["sessionID", "session_id"];

/// Raw event as delivered by the host runtime.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct HostEvent {
    #[serde(rename = "type")]
    pub event_type: String,
    #[serde(default)]
    pub properties: Map<String, Value>,
}

impl HostEvent {
    pub fn new(event_type: impl Into<String>, properties: Value) -> Self {
        let properties = match properties {
            Value::Object(map) => map,
            _ => Map::new(),
        };
        Self {
            event_type: event_type.into(),
            properties,
        }
    }

    pub fn created(session_id: &str) -> Self {
        Self::new(SESSION_CREATED, serde_json::json!({ "sessionID": session_id }))
    }

    pub fn idle(session_id: &str) -> Self {
        Self::new(SESSION_IDLE, serde_json::json!({ "sessionID": session_id }))
    }
}

/// The two lifecycle events the engine reacts to. Everything else is `Ignored`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
    Created(String),
    Idle(String),
    Ignored,
}

impl SessionEvent {
    pub fn from_host(event: &HostEvent) -> Self {
        let Some(id) = extract_session_id(&event.properties) else {
            return SessionEvent::Ignored;
        };
        match event.event_type.as_str() {
            SESSION_CREATED => SessionEvent::Created(id),
            SESSION_IDLE => SessionEvent::Idle(id),
            _ => SessionEvent::Ignored,
        }
    }
}

/// First non-empty string among the known session id keys.
pub fn extract_session_id(properties: &Map<String, Value>) -> Option<String> {
    SESSION_ID_KEYS
        .iter()
        .filter_map(|k| properties.get(*k).and_then(|v| v.as_str()))
        .find(|s| !s.is_empty())
        .map(str::to_string)
}

#[derive(Debug, thiserror::Error)]
pub enum EventError {
    #[error("event line is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("event has no type tag")]
    MissingType,
}

/// Parse one newline-delimited JSON event.
pub fn parse_event_line(line: &str) -> Result<HostEvent, EventError> {
    let event: HostEvent = serde_json::from_str(line)?;
    if event.event_type.is_empty() {
        return Err(EventError::MissingType);
    }
    Ok(event)
}
