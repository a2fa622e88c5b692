//! Turns the raw stage-two reply into checklist items.
//!
//! Models are asked for a bare JSON array but often wrap it in prose or a
//! Markdown fence. The first JSON array of strings found anywhere in the
//! reply wins. Failing that, the first array of plain scalars is used with
//! numbers and booleans rendered as text. Otherwise the reply is split into
//! lines. Parsing never fails.

use log::{debug, warn};
use serde_json::Value;

/// Parses a checklist reply, falling back to line splitting.
pub fn parse_checklist(raw: &str) -> Vec<String> {
    if let Some(items) = find_string_array(raw) {
        return items;
    }

    if let Some(items) = find_scalar_array(raw) {
        debug!("Checklist reply had non-string items; converted {} to text", items.len());
        return items;
    }

    warn!(
        "Checklist reply is not a JSON array ({} chars), using line fallback",
        raw.len()
    );
    split_lines(raw)
}

/// Returns the first balanced `[...]` in `text` that decodes as `Vec<String>`.
pub fn find_string_array(text: &str) -> Option<Vec<String>> {
    json_arrays(text).find_map(|candidate| serde_json::from_str::<Vec<String>>(candidate).ok())
}

/// Returns the first array whose items are all strings, numbers or booleans.
fn find_scalar_array(text: &str) -> Option<Vec<String>> {
    json_arrays(text).find_map(|candidate| {
        let values: Vec<Value> = serde_json::from_str(candidate).ok()?;
        values.into_iter().map(scalar_text).collect()
    })
}

fn scalar_text(value: Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Null | Value::Array(_) | Value::Object(_) => None,
    }
}

/// Balanced `[...]` slices of `text`, in order of their opening bracket.
fn json_arrays(text: &str) -> impl Iterator<Item = &str> + '_ {
    let mut search_from = 0;
    std::iter::from_fn(move || {
        while let Some(offset) = text[search_from..].find('[') {
            let start = search_from + offset;
            search_from = start + 1;
            if let Some(candidate) = extract_json_array(&text[start..]) {
                return Some(candidate);
            }
        }
        None
    })
}

/// Given text starting with `[`, returns the slice up to the matching `]`,
/// skipping brackets inside string literals.
fn extract_json_array(text: &str) -> Option<&str> {
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escape_next = false;

    for (i, c) in text.char_indices() {
        if escape_next {
            escape_next = false;
            continue;
        }

        match c {
            '\\' if in_string => {
                escape_next = true;
            }
            '"' => {
                in_string = !in_string;
            }
            '[' if !in_string => {
                depth += 1;
            }
            ']' if !in_string => {
                depth = depth.saturating_sub(1);
                if depth == 0 {
                    return Some(&text[..i + 1]);
                }
            }
            _ => {}
        }
    }

    None
}

/// Line fallback: one item per non-blank line, bullets removed.
pub fn split_lines(text: &str) -> Vec<String> {
    text.lines()
        .map(strip_bullet)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect()
}

fn strip_bullet(line: &str) -> &str {
    line.trim_start_matches(|c: char| c == '-' || c == '*' || c == '•' || c.is_whitespace())
        .trim()
}
