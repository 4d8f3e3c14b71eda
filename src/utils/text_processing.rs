//! Text processing utilities.
//!
//! Helpers for turning user-supplied text into safe file names and for
//! rendering stored timestamps.

use chrono::format::{Item, StrftimeItems};
use chrono::{DateTime, Local, SecondsFormat, Utc};
use log::*;
use regex::Regex;
use std::fmt::Write;

const UNSAFE_CHARS: &str = r"[^A-Za-z0-9]";

/// Replace every character outside `[A-Za-z0-9]` with `_`.
///
/// Each non-ASCII character becomes a single underscore, so "Café 1"
/// becomes "Caf__1".
pub fn sanitize_file_stem(text: &str) -> String {
    match Regex::new(UNSAFE_CHARS) {
        Ok(re) => re.replace_all(text, "_").into_owned(),
        Err(e) => {
            warn!("Failed to compile regex pattern '{}': {}", UNSAFE_CHARS, e);
            text.chars()
                .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
                .collect()
        }
    }
}

/// Check that a strftime pattern only contains specifiers chrono understands.
///
pub fn is_valid_time_format(pattern: &str) -> bool {
    !StrftimeItems::new(pattern).any(|item| matches!(item, Item::Error))
}

/// Render a stored UTC timestamp in the local time zone.
///
/// Patterns chrono cannot render fall back to RFC 3339.
pub fn format_local_time(time: &DateTime<Utc>, pattern: &str) -> String {
    let local = time.with_timezone(&Local);
    let mut rendered = String::new();
    match write!(rendered, "{}", local.format(pattern)) {
        Ok(()) => rendered,
        Err(_) => {
            warn!("Invalid time format '{}', using RFC 3339", pattern);
            local.to_rfc3339_opts(SecondsFormat::Secs, false)
        }
    }
}
