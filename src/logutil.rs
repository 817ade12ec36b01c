//! Helpers for putting chat input into log lines without breaking them apart.

use std::fmt::Write;

/// Longest preview of user text written to a log line.
pub const LOG_PREVIEW_CHARS: usize = 120;

/// Escape control characters so a chat message stays on one log line,
/// cutting it off after [`LOG_PREVIEW_CHARS`] characters.
pub fn escape_log(s: &str) -> String {
    escape_log_with_limit(s, LOG_PREVIEW_CHARS)
}

pub fn escape_log_with_limit(s: &str, limit: usize) -> String {
    let mut out = String::with_capacity(s.len().min(limit) + 4);
    for (count, ch) in s.chars().enumerate() {
        if count >= limit {
            out.push('…');
            break;
        }
        match ch {
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c if c.is_control() => {
                let _ = write!(out, "\\u{{{:04x}}}", c as u32);
            }
            c => out.push(c),
        }
    }
    out
}
