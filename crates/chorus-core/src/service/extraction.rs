//! Structured output extraction
//!
//! Models wrap JSON in prose, code fences, or commentary. Extraction takes
//! the first balanced `{...}` or `[...]` substring — string-literal and
//! escape aware — and parses it; validation against the expected shape
//! happens at the call site.

use crate::error::{ChorusError, ChorusResult};
use serde_json::Value;

/// Find the first balanced JSON object or array in free-form text.
pub fn extract_json_block(text: &str) -> Option<&str> {
    let start = text.find(['{', '['])?;
    let bytes = text.as_bytes();

    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for (offset, &byte) in bytes.iter().enumerate().skip(start) {
        if in_string {
            if escaped {
                escaped = false;
            } else if byte == b'\\' {
                escaped = true;
            } else if byte == b'"' {
                in_string = false;
            }
            continue;
        }
        match byte {
            b'"' => in_string = true,
            b'{' | b'[' => depth += 1,
            b'}' | b']' => {
                depth = depth.saturating_sub(1);
                if depth == 0 {
                    return Some(&text[start..=offset]);
                }
            }
            _ => {}
        }
    }
    None
}

/// Extract and parse the first JSON block from model output.
pub fn parse_json_block(text: &str) -> ChorusResult<Value> {
    let block = extract_json_block(text).ok_or_else(|| {
        ChorusError::json("no JSON object or array found in model output")
    })?;
    serde_json::from_str(block).map_err(|e| {
        ChorusError::json_with_context(
            format!("model output is not valid JSON: {e}"),
            "parsing extracted structured output",
        )
    })
}
