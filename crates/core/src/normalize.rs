//! Message normalization.
//!
//! Callers hand in a single line, a list of lines or nested lists that may
//! contain absent entries. [`normalize`] flattens that into an ordered list
//! of non-empty lines with markup characters escaped.

use serde::Deserialize;

/// Separator used when a notice's lines are stored as one text blob.
pub const LINE_SEPARATOR: &str = "<br />";

/// A raw message payload as supplied by a caller.
///
/// Deserializes from a JSON string, `null`, or (nested) arrays of those.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum RawMessage {
    Line(Option<String>),
    Many(Vec<RawMessage>),
}

impl From<&str> for RawMessage {
    fn from(line: &str) -> Self {
        RawMessage::Line(Some(line.to_string()))
    }
}

impl From<String> for RawMessage {
    fn from(line: String) -> Self {
        RawMessage::Line(Some(line))
    }
}

impl From<Option<String>> for RawMessage {
    fn from(line: Option<String>) -> Self {
        RawMessage::Line(line)
    }
}

impl From<Option<&str>> for RawMessage {
    fn from(line: Option<&str>) -> Self {
        RawMessage::Line(line.map(str::to_string))
    }
}

impl<T: Into<RawMessage>> From<Vec<T>> for RawMessage {
    fn from(items: Vec<T>) -> Self {
        RawMessage::Many(items.into_iter().map(Into::into).collect())
    }
}

/// Flatten, filter and escape a raw message.
///
/// Order is preserved. Absent and empty entries are dropped. The result may
/// be empty.
pub fn normalize(raw: impl Into<RawMessage>) -> Vec<String> {
    let mut lines = Vec::new();
    flatten_into(raw.into(), &mut lines);
    lines
}

fn flatten_into(raw: RawMessage, out: &mut Vec<String>) {
    match raw {
        RawMessage::Line(Some(line)) if !line.is_empty() => out.push(escape_markup(&line)),
        RawMessage::Line(_) => {}
        RawMessage::Many(items) => {
            for item in items {
                flatten_into(item, out);
            }
        }
    }
}

/// Replace `<` and `>` with their HTML entities. Nothing else is touched,
/// so escaping already-escaped text is a no-op.
pub fn escape_markup(line: &str) -> String {
    let mut escaped = String::with_capacity(line.len());
    for ch in line.chars() {
        match ch {
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            other => escaped.push(other),
        }
    }
    escaped
}

/// Join normalized lines into the stored notice text.
pub fn join_lines(lines: &[String]) -> String {
    lines.join(LINE_SEPARATOR)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_line() {
        assert_eq!(normalize("done"), vec!["done"]);
    }

    #[test]
    fn test_escapes_angle_brackets() {
        assert_eq!(
            normalize("<script>alert(1)</script>"),
            vec!["&lt;script&gt;alert(1)&lt;/script&gt;"]
        );
    }

    #[test]
    fn test_escaping_is_idempotent() {
        let once = normalize(vec!["a<b"]);
        assert_eq!(once, vec!["a&lt;b"]);
        let twice = normalize(once.clone());
        assert_eq!(twice, once);
    }

    #[test]
    fn test_other_characters_untouched() {
        assert_eq!(normalize("a & b \"c\" 'd'"), vec!["a & b \"c\" 'd'"]);
    }

    #[test]
    fn test_drops_absent_entries() {
        let raw = vec![Some("x"), None, Some("y")];
        assert_eq!(normalize(raw), vec!["x", "y"]);
    }

    #[test]
    fn test_drops_empty_entries() {
        assert_eq!(normalize(vec!["", "x", ""]), vec!["x"]);
    }

    #[test]
    fn test_flattens_nested_lists_in_order() {
        let raw = RawMessage::Many(vec![
            "a".into(),
            vec!["b", "c"].into(),
            RawMessage::Many(vec![RawMessage::Many(vec!["d".into()]), None::<String>.into()]),
            "e".into(),
        ]);
        assert_eq!(normalize(raw), vec!["a", "b", "c", "d", "e"]);
    }

    #[test]
    fn test_empty_result_is_legal() {
        assert!(normalize(Vec::<String>::new()).is_empty());
        assert!(normalize(None::<String>).is_empty());
    }

    #[test]
    fn test_deserializes_from_json() {
        let raw: RawMessage =
            serde_json::from_value(serde_json::json!(["one", null, ["two"]])).unwrap();
        assert_eq!(normalize(raw), vec!["one", "two"]);

        let raw: RawMessage = serde_json::from_value(serde_json::json!("solo")).unwrap();
        assert_eq!(normalize(raw), vec!["solo"]);
    }

    #[test]
    fn test_join_lines_uses_line_break() {
        let lines = vec!["first".to_string(), "second".to_string()];
        assert_eq!(join_lines(&lines), "first<br />second");
    }
}
