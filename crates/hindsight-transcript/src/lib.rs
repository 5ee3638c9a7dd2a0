mod compress;
mod truncate;

pub use compress::{
    format_transcript, tool_summary, transcript_lines, DEFAULT_MAX_LINES, ERROR_MAX_CHARS,
    TOOL_SUMMARY_MAX_CHARS, USER_TEXT_MAX_CHARS,
};
pub use truncate::{flatten_newlines, truncate_chars};
