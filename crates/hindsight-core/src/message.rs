use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Author of a message. Anything the host sends besides the known roles
/// collapses into `Other`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    User,
    Assistant,
    System,
    #[default]
    #[serde(other)]
    Other,
}

/// One piece of a message. The `type` tag decides which fields are meaningful.
///
/// ```json
/// {"type":"text","text":"fix the build"}
/// {"type":"tool-invocation","toolName":"bash","args":{"command":"cargo test"}}
/// {"type":"tool-result","result":"exit 101","isError":true}
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type")]
pub enum MessagePart {
    #[serde(rename = "text")]
    Text {
        #[serde(default)]
        text: String,
    },
    #[serde(rename = "tool-invocation")]
    ToolInvocation {
        #[serde(rename = "toolName", default)]
        tool_name: String,
        #[serde(default)]
        args: Map<String, Value>,
    },
    #[serde(rename = "tool-result")]
    ToolResult {
        #[serde(default)]
        result: String,
        #[serde(rename = "isError", default)]
        is_error: bool,
    },
    /// Part types this crate does not interpret (reasoning, file, step markers...).
    #[serde(other)]
    Unknown,
}

impl MessagePart {
    pub fn text(text: impl Into<String>) -> Self {
        MessagePart::Text { text: text.into() }
    }

    pub fn tool(tool_name: impl Into<String>, args: Value) -> Self {
        let args = match args {
            Value::Object(map) => map,
            _ => Map::new(),
        };
        MessagePart::ToolInvocation {
            tool_name: tool_name.into(),
            args,
        }
    }

    pub fn tool_result(result: impl Into<String>, is_error: bool) -> Self {
        MessagePart::ToolResult {
            result: result.into(),
            is_error,
        }
    }

    pub fn is_tool_invocation(&self) -> bool {
        matches!(self, MessagePart::ToolInvocation { .. })
    }
}

/// A single message of a session. Part order is chronological.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct Message {
    #[serde(default)]
    pub role: Role,
    #[serde(default)]
    pub parts: Vec<MessagePart>,
}

impl Message {
    pub fn new(role: Role, parts: Vec<MessagePart>) -> Self {
        Self { role, parts }
    }

    pub fn user(parts: Vec<MessagePart>) -> Self {
        Self::new(Role::User, parts)
    }

    pub fn assistant(parts: Vec<MessagePart>) -> Self {
        Self::new(Role::Assistant, parts)
    }

    pub fn is_user(&self) -> bool {
        self.role == Role::User
    }

    /// All `text` parts joined by newlines, in part order.
    pub fn joined_text(&self) -> String {
        let texts: Vec<&str> = self
            .parts
            .iter()
            .filter_map(|p| match p {
                MessagePart::Text { text } => Some(text.as_str()),
                _ => None,
            })
            .collect();
        texts.join("\n")
    }
}
