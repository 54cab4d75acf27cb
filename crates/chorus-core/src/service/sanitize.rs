//! Input sanitization for prompt assembly
//!
//! Free-text fields arrive from the outside world and get interpolated into
//! prompt templates; before that happens they lose the characters used for
//! structural confusion, excess blank lines, and anything beyond the field's
//! length bound. Sanitization is idempotent and never lengthens its input.

use once_cell::sync::Lazy;
use regex::Regex;

/// Length bound for prose fields (descriptions, instructions, content)
pub const MAX_PROSE_CHARS: usize = 500;
/// Length bound for individual list items
pub const MAX_ITEM_CHARS: usize = 100;
/// Maximum number of items kept from a caller-supplied list
pub const MAX_LIST_ITEMS: usize = 10;

/// Characters stripped from every field before prompt interpolation
const STRIPPED: &[char] = &['<', '>', '{', '}', '[', ']', '\\'];

static EXCESS_NEWLINES_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\n{3,}").expect("valid newline collapse regex"));

/// Sanitize a prose field to the default bound.
pub fn sanitize_prose(input: &str) -> String {
    sanitize_with_limit(input, MAX_PROSE_CHARS)
}

/// Sanitize a field to an explicit character bound.
pub fn sanitize_with_limit(input: &str, max_chars: usize) -> String {
    let stripped: String = input.chars().filter(|c| !STRIPPED.contains(c)).collect();
    let collapsed = EXCESS_NEWLINES_RE.replace_all(&stripped, "\n\n");
    let trimmed = collapsed.trim();
    truncate_chars(trimmed, max_chars).trim_end().to_string()
}

/// Sanitize a caller-supplied list: capped length, each item bounded,
/// empties dropped.
pub fn sanitize_list(items: &[String]) -> Vec<String> {
    items
        .iter()
        .take(MAX_LIST_ITEMS)
        .map(|item| sanitize_with_limit(item, MAX_ITEM_CHARS))
        .filter(|item| !item.is_empty())
        .collect()
}

/// Truncate on a char boundary, never inside a code point.
fn truncate_chars(input: &str, max_chars: usize) -> &str {
    match input.char_indices().nth(max_chars) {
        Some((offset, _)) => &input[..offset],
        None => input,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_structural_characters() {
        let sanitized = sanitize_prose("hi <b>{there}</b> [ok] back\\slash");
        assert!(!sanitized.contains(['<', '>', '{', '}', '[', ']', '\\']));
        assert_eq!(sanitized, "hi bthere/b ok backslash");
    }

    #[test]
    fn collapses_newline_runs_to_two() {
        assert_eq!(sanitize_prose("a\n\n\n\n\nb"), "a\n\nb");
        assert_eq!(sanitize_prose("a\n\nb"), "a\n\nb");
    }

    #[test]
    fn truncates_to_the_bound_on_char_boundaries() {
        let long = "é".repeat(MAX_PROSE_CHARS + 50);
        let sanitized = sanitize_prose(&long);
        assert_eq!(sanitized.chars().count(), MAX_PROSE_CHARS);
    }

    #[test]
    fn never_lengthens_input() {
        for input in ["", "plain", "  padded  ", "<{[\\]}>", "a\n\n\n\nb"] {
            assert!(sanitize_prose(input).chars().count() <= input.chars().count());
        }
    }

    #[test]
    fn sanitize_is_idempotent() {
        // trailing whitespace lands exactly on the truncation edge
        let edge_case = format!("{} tail", "x".repeat(MAX_PROSE_CHARS - 1));
        let repeated = "word ".repeat(200);
        let inputs = [
            "hello <world>",
            "a\n\n\n\nb",
            "  spaced out  ",
            edge_case.as_str(),
            repeated.as_str(),
        ];
        for input in inputs {
            let once = sanitize_prose(input);
            assert_eq!(sanitize_prose(&once), once, "not idempotent for {input:?}");
        }
    }

    #[test]
    fn lists_are_capped_and_items_bounded() {
        let items: Vec<String> = (0..20).map(|i| format!("item-{i}")).collect();
        let sanitized = sanitize_list(&items);
        assert_eq!(sanitized.len(), MAX_LIST_ITEMS);

        let long_item = vec!["y".repeat(500)];
        assert_eq!(sanitize_list(&long_item)[0].chars().count(), MAX_ITEM_CHARS);
    }

    #[test]
    fn empty_items_are_dropped() {
        let items = vec!["ok".to_string(), "<>".to_string(), "  ".to_string()];
        assert_eq!(sanitize_list(&items), vec!["ok".to_string()]);
    }
}
