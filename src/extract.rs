//! Staged extraction of file operations from free-form model output.
//!
//! Each stage is tried in order and the first one that yields JSON wins:
//! 1. the whole text is JSON;
//! 2. the first fenced block (```` ``` ```` or ```` ```json ````) that parses;
//! 3. the first balanced `[...]` or `{...}` span that parses, honoring strings and escapes.
//!
//! Nothing here is trusted. Whatever comes out is still validated and sandboxed by the engine.
use serde_json::Value;

use crate::types::FileOperation;

/// Stage 1: the whole (trimmed) text is a JSON document.
#[must_use]
pub fn parse_strict(text: &str) -> Option<Value> {
    serde_json::from_str(text.trim()).ok()
}

/// Stage 2: the first fenced code block whose body parses as JSON.
#[must_use]
pub fn parse_fenced(text: &str) -> Option<Value> {
    let mut rest = text;
    while let Some(open) = rest.find("```") {
        let after = &rest[open + 3..];
        // Skip the info string (`json`, `JSON`, ...) up to the end of the line
        let body_start = after.find('\n').map_or(after.len(), |i| i + 1);
        let body = &after[body_start..];
        let Some(close) = body.find("```") else {
            return None;
        };
        if let Some(v) = parse_strict(&body[..close]) {
            return Some(v);
        }
        rest = &body[close + 3..];
    }
    None
}

/// Stage 3: the first balanced `[...]`/`{...}` span that parses as JSON.
#[must_use]
pub fn parse_balanced(text: &str) -> Option<Value> {
    let bytes = text.as_bytes();
    let mut start = 0;
    while let Some(offset) = text[start..].find(|c: char| c == '[' || c == '{') {
        let open = start + offset;
        if let Some(end) = balanced_end(bytes, open) {
            if let Some(v) = parse_strict(&text[open..=end]) {
                return Some(v);
            }
        }
        start = open + 1;
    }
    None
}

// Index of the bracket closing the one at `open`, skipping over string literals.
fn balanced_end(bytes: &[u8], open: usize) -> Option<usize> {
    let mut stack: Vec<u8> = Vec::new();
    let mut in_string = false;
    let mut escaped = false;
    for (i, &b) in bytes.iter().enumerate().skip(open) {
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
            b'[' => stack.push(b']'),
            b'{' => stack.push(b'}'),
            b']' | b'}' => {
                if stack.pop() != Some(b) {
                    return None;
                }
                if stack.is_empty() {
                    return Some(i);
                }
            }
            _ => {}
        }
    }
    None
}

/// Pull a list of file operations out of model output.
///
/// Accepts a bare array of operations or an object carrying an `operations` (or `files`)
/// array. Returns `None` when no stage yields a usable list.
#[must_use]
pub fn extract_operations(text: &str) -> Option<Vec<FileOperation>> {
    let stages: [fn(&str) -> Option<Value>; 3] = [parse_strict, parse_fenced, parse_balanced];
    stages
        .into_iter()
        .filter_map(|stage| stage(text))
        .find_map(operations_from)
}

fn operations_from(v: Value) -> Option<Vec<FileOperation>> {
    let list = match v {
        Value::Array(_) => v,
        Value::Object(mut obj) => obj
            .remove("operations")
            .or_else(|| obj.remove("files"))?,
        _ => return None,
    };
    serde_json::from_value(list).ok()
}
