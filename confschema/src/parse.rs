//! Tolerant configuration-document parsing and formatting.
//!
//! Hand-edited settings files drift from strict JSON: editors leave `//`
//! and `/* */` comments and trailing commas behind. [`parse_config`]
//! recovers a strict JSON object from such text in three escalating
//! attempts: parse as-is, parse with comments stripped, parse with
//! trailing commas removed as well. Both strip passes replace removed
//! text with spaces so positions reported by the final attempt still
//! point into the original document.

use log::debug;
use serde::Serialize;
use serde_json::ser::PrettyFormatter;
use serde_json::{Map, Serializer, Value};

use crate::error::ParseError;
use crate::value::ValueKind;

/// Parse configuration text into a JSON object map.
///
/// Accepts strict JSON as well as JSON with `//` line comments, `/* */`
/// block comments, and trailing commas before `}` or `]`. Comment markers
/// inside string literals are left alone. The top level must be an object;
/// a document that parses to an array or scalar is rejected.
///
/// # Errors
///
/// [`ParseError::Syntax`] when the text is not valid JSON even after
/// comment and trailing-comma removal, [`ParseError::NotAnObject`] when it
/// parses to something other than an object.
pub fn parse_config(text: &str) -> Result<Map<String, Value>, ParseError> {
    match serde_json::from_str(text) {
        Ok(value) => return into_object(value),
        Err(_) => debug!("strict parse failed, retrying without comments"),
    }

    let stripped = strip_comments(text);
    match serde_json::from_str(&stripped) {
        Ok(value) => return into_object(value),
        Err(_) => debug!("comment-stripped parse failed, retrying without trailing commas"),
    }

    let cleaned = strip_trailing_commas(&stripped);
    match serde_json::from_str(&cleaned) {
        Ok(value) => into_object(value),
        Err(err) => Err(ParseError::Syntax {
            position: offset_at(&cleaned, err.line(), err.column()),
            message: err.to_string(),
        }),
    }
}

fn into_object(value: Value) -> Result<Map<String, Value>, ParseError> {
    match value {
        Value::Object(map) => Ok(map),
        other => Err(ParseError::NotAnObject {
            found: ValueKind::of(&other).name(),
        }),
    }
}

/// Translate a 1-based line/column pair into a byte offset.
fn offset_at(text: &str, line: usize, column: usize) -> usize {
    let line_start: usize = text
        .split_inclusive('\n')
        .take(line.saturating_sub(1))
        .map(str::len)
        .sum();
    (line_start + column.saturating_sub(1)).min(text.len())
}

/// Replace `//` line comments and `/* */` block comments with spaces.
///
/// String literals are honored, so `"http://example.com"` survives.
/// Newlines inside block comments are kept in place; everything else is
/// blanked character by character, which keeps line numbers and in-line
/// positions stable for later parse attempts. An unterminated block
/// comment blanks the rest of the input.
pub fn strip_comments(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut chars = text.chars().peekable();
    let mut in_string = false;
    let mut escaped = false;

    while let Some(c) = chars.next() {
        if in_string {
            out.push(c);
            if escaped {
                escaped = false;
            } else if c == '\\' {
                escaped = true;
            } else if c == '"' {
                in_string = false;
            }
            continue;
        }
        match c {
            '"' => {
                in_string = true;
                out.push(c);
            }
            '/' if chars.peek() == Some(&'/') => {
                out.push(' ');
                while let Some(&next) = chars.peek() {
                    if next == '\n' {
                        break;
                    }
                    chars.next();
                    out.push(' ');
                }
            }
            '/' if chars.peek() == Some(&'*') => {
                chars.next();
                out.push_str("  ");
                while let Some(inner) = chars.next() {
                    if inner == '*' && chars.peek() == Some(&'/') {
                        chars.next();
                        out.push_str("  ");
                        break;
                    }
                    out.push(if inner == '\n' { '\n' } else { ' ' });
                }
            }
            _ => out.push(c),
        }
    }
    out
}

/// Replace trailing commas before `}` or `]` with spaces.
///
/// A comma is trailing when the next non-whitespace character closes an
/// object or array. Commas inside string literals are left alone.
pub fn strip_trailing_commas(text: &str) -> String {
    let chars: Vec<char> = text.chars().collect();
    let mut out = String::with_capacity(text.len());
    let mut in_string = false;
    let mut escaped = false;

    for (i, &c) in chars.iter().enumerate() {
        if in_string {
            out.push(c);
            if escaped {
                escaped = false;
            } else if c == '\\' {
                escaped = true;
            } else if c == '"' {
                in_string = false;
            }
            continue;
        }
        match c {
            '"' => {
                in_string = true;
                out.push(c);
            }
            ',' => {
                let next = chars[i + 1..].iter().find(|c| !c.is_whitespace());
                if matches!(next, Some('}') | Some(']')) {
                    out.push(' ');
                } else {
                    out.push(c);
                }
            }
            _ => out.push(c),
        }
    }
    out
}

/// Serialize a configuration value as pretty JSON with two-space indent.
///
/// The output is strict JSON and always round-trips through
/// [`parse_config`] when the value is an object.
pub fn format_config(value: &Value) -> String {
    format_config_indent(value, 2)
}

/// Serialize a configuration value as pretty JSON with a caller-chosen
/// indent width.
pub fn format_config_indent(value: &Value, indent: usize) -> String {
    let spaces = vec![b' '; indent];
    let mut out = Vec::new();
    {
        let formatter = PrettyFormatter::with_indent(&spaces);
        let mut serializer = Serializer::with_formatter(&mut out, formatter);
        // Serializing a plain JSON value into a Vec cannot fail.
        if value.serialize(&mut serializer).is_err() {
            return value.to_string();
        }
    }
    String::from_utf8(out).unwrap_or_else(|_| value.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_strict_json() {
        let map = parse_config(r#"{"a": 1, "b": [true, null]}"#).unwrap();
        assert_eq!(map["a"], json!(1));
        assert_eq!(map["b"], json!([true, null]));
    }

    #[test]
    fn test_parse_line_comments() {
        let text = r#"
        {
            // tab width in spaces
            "tabSize": 4
        }
        "#;
        let map = parse_config(text).unwrap();
        assert_eq!(map["tabSize"], json!(4));
    }

    #[test]
    fn test_parse_block_comments() {
        let text = "{\n  /* multi\n     line */ \"a\": 1\n}";
        let map = parse_config(text).unwrap();
        assert_eq!(map["a"], json!(1));
    }

    #[test]
    fn test_parse_trailing_commas() {
        let map = parse_config("{\"a\": [1, 2,], \"b\": 3,}").unwrap();
        assert_eq!(map["a"], json!([1, 2]));
        assert_eq!(map["b"], json!(3));
    }

    #[test]
    fn test_parse_comments_and_trailing_commas_together() {
        let text = r#"
        {
            "list": [
                1, // first
                2, /* second */
            ],
        }
        "#;
        let map = parse_config(text).unwrap();
        assert_eq!(map["list"], json!([1, 2]));
    }

    #[test]
    fn test_comment_markers_inside_strings_survive() {
        let map = parse_config(r#"{"url": "https://example.com", "glob": "**/*,"}"#).unwrap();
        assert_eq!(map["url"], json!("https://example.com"));
        assert_eq!(map["glob"], json!("**/*,"));
    }

    #[test]
    fn test_top_level_must_be_object() {
        assert_eq!(
            parse_config("[1, 2]"),
            Err(ParseError::NotAnObject { found: "array" })
        );
        assert_eq!(
            parse_config("42"),
            Err(ParseError::NotAnObject { found: "number" })
        );
    }

    #[test]
    fn test_syntax_error_reports_position() {
        let err = parse_config("{\"a\": }").unwrap_err();
        match err {
            ParseError::Syntax { position, .. } => assert_eq!(position, 6),
            other => panic!("expected syntax error, got {other:?}"),
        }

        // the reported position ignores stripped comments
        let err = parse_config("{ // note\n  \"a\": }").unwrap_err();
        match err {
            ParseError::Syntax { position, .. } => assert_eq!(position, 17),
            other => panic!("expected syntax error, got {other:?}"),
        }
    }

    #[test]
    fn test_unterminated_block_comment_fails() {
        assert!(matches!(
            parse_config("{\"a\": 1 /* open"),
            Err(ParseError::Syntax { .. })
        ));
    }

    #[test]
    fn test_strip_comments_preserves_layout() {
        let text = "{\"a\": 1, // note\n \"b\": 2}";
        let stripped = strip_comments(text);
        assert_eq!(stripped.len(), text.len());
        // "// note" is seven characters, blanked in place
        assert_eq!(stripped, "{\"a\": 1,        \n \"b\": 2}");
    }

    #[test]
    fn test_strip_trailing_commas_only() {
        assert_eq!(strip_trailing_commas("[1, 2, 3]"), "[1, 2, 3]");
        assert_eq!(strip_trailing_commas("[1, 2, ]"), "[1, 2  ]");
        assert_eq!(strip_trailing_commas("{\"a\": \"x,\"}"), "{\"a\": \"x,\"}");
    }

    #[test]
    fn test_format_round_trip() {
        let value = json!({"b": [1, 2], "a": {"nested": true}, "s": "x"});
        let text = format_config(&value);
        let reparsed = parse_config(&text).unwrap();
        assert_eq!(Value::Object(reparsed), value);
    }

    #[test]
    fn test_format_indent_width() {
        let value = json!({"a": 1});
        assert_eq!(format_config(&value), "{\n  \"a\": 1\n}");
        assert_eq!(format_config_indent(&value, 4), "{\n    \"a\": 1\n}");
        assert_eq!(format_config_indent(&value, 0), "{\n\"a\": 1\n}");
    }
}
