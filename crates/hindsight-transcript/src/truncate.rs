/// Return at most `max_chars` leading characters of `s`.
///
/// Counts Unicode scalar values, so the cut never lands inside a multi-byte
/// character.
pub fn truncate_chars(s: &str, max_chars: usize) -> &str {
    match s.char_indices().nth(max_chars) {
        Some((byte_idx, _)) => &s[..byte_idx],
        None => s,
    }
}

/// Replace every `\n` with a single space.
pub fn flatten_newlines(s: &str) -> String {
    s.replace('\n', " ")
}
