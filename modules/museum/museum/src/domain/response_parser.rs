//! Tolerant JSON extraction from model replies.
//!
//! Models wrap JSON in commentary or code fences. The extractor looks at every
//! balanced `{...}` span and keeps the one that ends last among those that
//! parse as a JSON object; for nested spans sharing that end the outermost wins.

use serde_json::{Map, Value};

/// Returns the last balanced-brace JSON object embedded in `text`.
#[must_use]
pub fn extract_json_object(text: &str) -> Option<Map<String, Value>> {
    let trimmed = text.trim();
    if let Ok(Value::Object(map)) = serde_json::from_str::<Value>(trimmed) {
        return Some(map);
    }

    let bytes = trimmed.as_bytes();
    let mut spans: Vec<(usize, usize)> = bytes
        .iter()
        .enumerate()
        .filter(|&(_, b)| *b == b'{')
        .filter_map(|(start, _)| matching_brace(bytes, start).map(|end| (start, end)))
        .collect();

    // Latest end first; for equal ends the outermost (smallest start) first.
    spans.sort_by(|a, b| b.1.cmp(&a.1).then(a.0.cmp(&b.0)));

    spans.into_iter().find_map(|(start, end)| {
        match serde_json::from_str::<Value>(&trimmed[start..=end]) {
            Ok(Value::Object(map)) => Some(map),
            _ => None,
        }
    })
}

/// Index of the `}` closing the `{` at `start`, skipping braces inside JSON
/// string literals.
fn matching_brace(bytes: &[u8], start: usize) -> Option<usize> {
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for (offset, &b) in bytes[start..].iter().enumerate() {
        if in_string {
            match b {
                _ if escaped => escaped = false,
                b'\\' => escaped = true,
                b'"' => in_string = false,
                _ => {}
            }
            continue;
        }
        match b {
            b'"' => in_string = true,
            b'{' => depth += 1,
            b'}' => {
                depth = depth.saturating_sub(1);
                if depth == 0 {
                    return Some(start + offset);
                }
            }
            _ => {}
        }
    }
    None
}

/// Non-empty trimmed string field.
#[must_use]
pub fn string_field<'a>(map: &'a Map<String, Value>, key: &str) -> Option<&'a str> {
    map.get(key)
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
}
