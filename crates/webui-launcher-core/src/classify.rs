//! Pure classification of captured output lines.
//!
//! The backend (and the Python runtime underneath it) interleaves useful log
//! records with verbose traceback dumps and box-drawing banners. This module
//! maps each raw line to a rendering instruction: drop it, show it as an
//! error, or show it as a structured log record. Classification is a total,
//! stateless function; identical input always yields identical output.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::events::{RawLine, RenderedEvent, StreamChannel};

/// Substitute message for stderr lines reporting Unicode encode failures
/// inside the backend. The original text is discarded.
pub const UNICODE_ERROR_MESSAGE: &str =
    "ERROR: Unicode encoding issue with OpenWebUI output (continuing...)";

/// Whole-line substitute used when the raw bytes do not decode as UTF-8.
pub const UNDECODABLE_PLACEHOLDER: &str = "[OpenWebUI output contains special characters]";

static LOG_LINE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"^(\d{4}-\d{2}-\d{2}\s+\d{2}:\d{2}:\d{2}\.\d{3})\s*\|\s*(INFO|ERROR|WARNING|DEBUG|TRACE|WARN|CRITICAL)\s*\|\s*(.*)$",
    )
    .expect("invalid log line pattern")
});

/// Classify one captured line into a rendering instruction.
pub fn classify(line: &RawLine) -> RenderedEvent {
    classify_line(line.channel, &line.bytes)
}

/// Classify raw line content from the given channel.
pub fn classify_line(channel: StreamChannel, bytes: &[u8]) -> RenderedEvent {
    match std::str::from_utf8(bytes) {
        Ok(text) => classify_text(channel, text),
        // Undecodable output cannot be matched against the markers; the
        // whole line is replaced and rendered as plain text.
        Err(_) => render_text(UNDECODABLE_PLACEHOLDER.to_string()),
    }
}

fn classify_text(channel: StreamChannel, text: &str) -> RenderedEvent {
    if is_traceback_noise(text) {
        return RenderedEvent::Suppressed;
    }

    if channel == StreamChannel::Stderr && text.contains("UnicodeEncodeError") {
        return RenderedEvent::PlainError {
            message: UNICODE_ERROR_MESSAGE.to_string(),
        };
    }

    render_text(sanitize(text))
}

/// Verbose traceback detail the backend dumps on crashes: locals banners,
/// stack-frame gutters, raw memory addresses, and long lines of unicode
/// escapes.
fn is_traceback_noise(text: &str) -> bool {
    text.contains("+----- locals -----+")
        || text.contains(
            "+-------------------------------- locals ---------------------------------+",
        )
        || text.contains("| +")
        || text.starts_with("| |")
        || text.contains("Traceback (most recent call last)")
        || text.contains("at 0x")
        || (text.contains("\\u") && text.chars().count() > 100)
}

/// Replace the box-drawing characters the backend's startup banner uses
/// with ASCII equivalents.
pub fn sanitize(text: &str) -> String {
    text.chars()
        .map(|c| match c {
            '\u{2588}' => '#',
            '\u{2557}' | '\u{2554}' | '\u{255d}' => '+',
            '\u{2550}' => '-',
            '\u{2551}' => '|',
            other => other,
        })
        .collect()
}

fn render_text(text: String) -> RenderedEvent {
    if let Some(caps) = LOG_LINE.captures(&text) {
        return RenderedEvent::StructuredLog {
            timestamp: caps[1].to_string(),
            level: caps[2].to_string(),
            message: caps[3].to_string(),
        };
    }

    if text.to_uppercase().contains("ERROR") {
        RenderedEvent::PlainError { message: text }
    } else {
        RenderedEvent::Plain { message: text }
    }
}
