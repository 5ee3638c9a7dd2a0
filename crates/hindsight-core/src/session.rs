use serde::{Deserialize, Serialize};

use crate::message::Message;

/// Session metadata as returned by the host's session store.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct SessionInfo {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(
        default,
        rename = "createdAt",
        alias = "created_at",
        skip_serializing_if = "Option::is_none"
    )]
    pub created_at: Option<String>,
}

impl SessionInfo {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            ..Default::default()
        }
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// Title if set and non-empty, otherwise the id.
    pub fn label(&self) -> &str {
        match self.title.as_deref() {
            Some(t) if !t.is_empty() => t,
            _ => &self.id,
        }
    }
}

/// Volume statistics computed over a session's messages.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SessionStats {
    pub user_messages: usize,
    pub tool_calls: usize,
}

impl SessionStats {
    pub fn from_messages(messages: &[Message]) -> Self {
        let mut stats = SessionStats::default();
        for msg in messages {
            if msg.is_user() {
                stats.user_messages += 1;
            }
            stats.tool_calls += msg.parts.iter().filter(|p| p.is_tool_invocation()).count();
        }
        stats
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::message::MessagePart;
    use serde_json::json;

    #[test]
    fn label_prefers_title() {
        let s = SessionInfo::new("ses_1").with_title("Fix flaky test");
        assert_eq!(s.label(), "Fix flaky test");
        assert_eq!(SessionInfo::new("ses_2").label(), "ses_2");
        assert_eq!(SessionInfo::new("ses_3").with_title("").label(), "ses_3");
    }

    #[test]
    fn stats_count_user_messages_and_tool_invocations() {
        let messages = vec![
            Message::user(vec![MessagePart::text("hi")]),
            Message::assistant(vec![
                MessagePart::tool("bash", json!({"command": "ls"})),
                MessagePart::tool_result("a\nb", false),
                MessagePart::tool("read", json!({"filePath": "a"})),
            ]),
            Message::user(vec![]),
            Message::user(vec![MessagePart::tool("grep", json!({"pattern": "x"}))]),
        ];
        let stats = SessionStats::from_messages(&messages);
        assert_eq!(stats.user_messages, 3);
        assert_eq!(stats.tool_calls, 3);
    }

    #[test]
    fn session_info_accepts_camel_and_snake_created_at() {
        let a: SessionInfo =
            serde_json::from_value(json!({"id": "a", "createdAt": "2026-01-01T00:00:00Z"}))
                .unwrap();
        let b: SessionInfo =
            serde_json::from_value(json!({"id": "b", "created_at": "2026-01-01T00:00:00Z"}))
                .unwrap();
        assert_eq!(a.created_at, b.created_at);
        assert!(a.title.is_none());
    }
}
