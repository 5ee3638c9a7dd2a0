use hindsight_core::{Message, MessagePart};
use serde_json::{Map, Value};

use crate::truncate::{flatten_newlines, truncate_chars};

/// Default line budget for a compressed transcript.
pub const DEFAULT_MAX_LINES: usize = 50;
pub const USER_TEXT_MAX_CHARS: usize = 400;
pub const TOOL_SUMMARY_MAX_CHARS: usize = 80;
pub const ERROR_MAX_CHARS: usize = 100;

/// Argument keys that summarize a tool call, in priority order.
const SUMMARY_KEYS: [&str; 4] = ["command", "prompt", "pattern", "filePath"];

/// Lazily render a message history into transcript lines.
///
/// For every message, in order: one `[USER n]` line (user messages with
/// non-blank text only), then one line per tool invocation and per failed
/// tool result. Nothing is reordered; callers bound the output with
/// `Iterator::take`, which also stops the walk over the remaining parts.
///
/// The user counter advances for every user message, including ones whose
/// text is blank and therefore emit no line.
pub fn transcript_lines(messages: &[Message]) -> impl Iterator<Item = String> + '_ {
    let mut user_seq = 0usize;
    messages.iter().flat_map(move |msg| {
        let user_line = if msg.is_user() {
            user_seq += 1;
            render_user_line(user_seq, msg)
        } else {
            None
        };
        user_line
            .into_iter()
            .chain(msg.parts.iter().filter_map(render_part))
    })
}

/// Compress `messages` into at most `max_lines` lines joined by `\n`.
pub fn format_transcript(messages: &[Message], max_lines: usize) -> String {
    transcript_lines(messages)
        .take(max_lines)
        .collect::<Vec<_>>()
        .join("\n")
}

fn render_user_line(seq: usize, msg: &Message) -> Option<String> {
    let text = msg.joined_text();
    if text.trim().is_empty() {
        return None;
    }
    Some(format!(
        "\n[USER {seq}] {}",
        truncate_chars(&text, USER_TEXT_MAX_CHARS)
    ))
}

fn render_part(part: &MessagePart) -> Option<String> {
    match part {
        MessagePart::ToolInvocation { tool_name, args } => {
            Some(format!("  → {tool_name}: {}", tool_summary(args)))
        }
        MessagePart::ToolResult {
            result,
            is_error: true,
        } => {
            let flat = flatten_newlines(result);
            Some(format!(
                "  ✗ ERROR: {}",
                truncate_chars(&flat, ERROR_MAX_CHARS)
            ))
        }
        _ => None,
    }
}

/// One-line summary of tool arguments: the first non-empty string among
/// `command`, `prompt`, `pattern`, `filePath`, else the arguments as JSON.
pub fn tool_summary(args: &Map<String, Value>) -> String {
    let picked = SUMMARY_KEYS
        .iter()
        .filter_map(|k| args.get(*k).and_then(Value::as_str))
        .find(|s| !s.is_empty());
    let raw = match picked {
        Some(s) => s.to_string(),
        None => {
            let json = serde_json::to_string(args).unwrap_or_default();
            truncate_chars(&json, TOOL_SUMMARY_MAX_CHARS).to_string()
        }
    };
    let flat = flatten_newlines(&raw);
    truncate_chars(&flat, TOOL_SUMMARY_MAX_CHARS).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn args(v: Value) -> Map<String, Value> {
        v.as_object().cloned().unwrap()
    }

    #[test]
    fn tool_invocation_replaces_newlines() {
        let msgs = vec![Message::assistant(vec![MessagePart::tool(
            "bash",
            json!({"command": "ls -la\nfoo"}),
        )])];
        assert_eq!(format_transcript(&msgs, 50), "  → bash: ls -la foo");
    }

    #[test]
    fn summary_priority_order() {
        assert_eq!(
            tool_summary(&args(json!({"filePath": "a.rs", "pattern": "fn main", "prompt": "p"}))),
            "p"
        );
        assert_eq!(
            tool_summary(&args(json!({"filePath": "a.rs", "pattern": "fn main"}))),
            "fn main"
        );
        assert_eq!(tool_summary(&args(json!({"filePath": "a.rs"}))), "a.rs");
    }

    #[test]
    fn summary_skips_empty_and_non_string_values() {
        assert_eq!(
            tool_summary(&args(json!({"command": "", "prompt": 7, "pattern": "todo"}))),
            "todo"
        );
    }

    #[test]
    fn summary_falls_back_to_json() {
        assert_eq!(tool_summary(&args(json!({"path": "x"}))), r#"{"path":"x"}"#);
        assert_eq!(tool_summary(&Map::new()), "{}");
        let long = "y".repeat(200);
        let summary = tool_summary(&args(json!({ "content": long })));
        assert_eq!(summary.chars().count(), TOOL_SUMMARY_MAX_CHARS);
        assert!(summary.starts_with(r#"{"content":"yyy"#));
    }

    #[test]
    fn summary_truncates_long_command() {
        let cmd = "x".repeat(120);
        assert_eq!(tool_summary(&args(json!({ "command": cmd }))).len(), 80);
    }

    #[test]
    fn error_result_truncated_to_100() {
        let result = "e".repeat(200);
        let msgs = vec![Message::assistant(vec![MessagePart::tool_result(result, true)])];
        let out = format_transcript(&msgs, 50);
        assert_eq!(out, format!("  ✗ ERROR: {}", "e".repeat(100)));
    }

    #[test]
    fn error_result_newlines_flattened() {
        let msgs = vec![Message::assistant(vec![MessagePart::tool_result(
            "line one\nline two",
            true,
        )])];
        assert_eq!(format_transcript(&msgs, 50), "  ✗ ERROR: line one line two");
    }

    #[test]
    fn successful_results_never_emitted() {
        let msgs = vec![Message::assistant(vec![
            MessagePart::tool_result("fine", false),
            MessagePart::text("assistant prose"),
        ])];
        assert_eq!(format_transcript(&msgs, 50), "");
    }

    #[test]
    fn user_text_joined_and_truncated() {
        let msgs = vec![Message::user(vec![
            MessagePart::text("first"),
            MessagePart::text("second"),
        ])];
        assert_eq!(format_transcript(&msgs, 50), "\n[USER 1] first\nsecond");

        let long = "z".repeat(500);
        let msgs = vec![Message::user(vec![MessagePart::text(long)])];
        let out = format_transcript(&msgs, 50);
        assert_eq!(out, format!("\n[USER 1] {}", "z".repeat(400)));
    }

    #[test]
    fn blank_user_message_consumes_sequence_number() {
        let msgs = vec![
            Message::user(vec![MessagePart::text("")]),
            Message::user(vec![MessagePart::text("   ")]),
            Message::user(vec![MessagePart::text("third")]),
        ];
        let lines: Vec<String> = transcript_lines(&msgs).collect();
        assert_eq!(lines, vec!["\n[USER 3] third".to_string()]);
    }

    #[test]
    fn assistant_text_is_not_a_user_line() {
        let msgs = vec![
            Message::assistant(vec![MessagePart::text("I will help")]),
            Message::user(vec![MessagePart::text("thanks")]),
        ];
        assert_eq!(format_transcript(&msgs, 50), "\n[USER 1] thanks");
    }

    #[test]
    fn interleaves_user_and_tool_lines_per_message() {
        let msgs = vec![
            Message::user(vec![MessagePart::text("fix it")]),
            Message::assistant(vec![
                MessagePart::tool("bash", json!({"command": "cargo build"})),
                MessagePart::tool_result("error[E0308]", true),
            ]),
            Message::user(vec![
                MessagePart::text("try again"),
                MessagePart::tool("read", json!({"filePath": "src/lib.rs"})),
            ]),
        ];
        let lines: Vec<String> = transcript_lines(&msgs).collect();
        assert_eq!(
            lines,
            vec![
                "\n[USER 1] fix it",
                "  → bash: cargo build",
                "  ✗ ERROR: error[E0308]",
                "\n[USER 2] try again",
                "  → read: src/lib.rs",
            ]
        );
    }

    #[test]
    fn budget_caps_emitted_lines() {
        let msgs: Vec<Message> = (0..60)
            .map(|i| {
                Message::assistant(vec![MessagePart::tool(
                    "bash",
                    json!({ "command": format!("step {i}") }),
                )])
            })
            .collect();
        let out = format_transcript(&msgs, 50);
        let lines: Vec<&str> = out.split('\n').collect();
        assert_eq!(lines.len(), 50);
        assert_eq!(lines[49], "  → bash: step 49");
        assert!(!out.contains("step 50"));
    }

    #[test]
    fn budget_cuts_mid_message() {
        let msgs = vec![
            Message::user(vec![
                MessagePart::text("go"),
                MessagePart::tool("a", json!({"command": "1"})),
                MessagePart::tool("b", json!({"command": "2"})),
                MessagePart::tool("c", json!({"command": "3"})),
            ]),
            Message::user(vec![MessagePart::text("never seen")]),
        ];
        let lines: Vec<String> = transcript_lines(&msgs).take(3).collect();
        assert_eq!(lines, vec!["\n[USER 1] go", "  → a: 1", "  → b: 2"]);
    }

    #[test]
    fn zero_budget_emits_nothing() {
        let msgs = vec![Message::user(vec![MessagePart::text("hi")])];
        assert_eq!(format_transcript(&msgs, 0), "");
    }

    #[test]
    fn take_stops_walking_remaining_messages() {
        let msgs: Vec<Message> = (0..10)
            .map(|i| Message::user(vec![MessagePart::text(format!("m{i}"))]))
            .collect();
        let mut iter = transcript_lines(&msgs);
        assert_eq!(iter.next().as_deref(), Some("\n[USER 1] m0"));
        assert_eq!(iter.next().as_deref(), Some("\n[USER 2] m1"));
    }
}
