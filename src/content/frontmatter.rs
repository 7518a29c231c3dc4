//! Front-matter parsing and serialization

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde_yaml::{Mapping, Value};

/// Block delimiter opening and closing the metadata header
const DELIMITER: &str = "---";

/// Title written by an update when neither the request nor the file has one
const UNTITLED: &str = "Untitled";

/// Keys written first, in this order, ahead of any other stored key
const CANONICAL_KEYS: [&str; 5] = ["title", "date", "tags", "pinned", "summary"];

/// Render a YAML scalar as text; sequences and mappings have no text form
fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

/// Whether a stored value counts as "set" when an update falls back to it
fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0 && !f.is_nan()),
        Value::String(s) => !s.is_empty(),
        Value::Sequence(_) | Value::Mapping(_) => true,
        Value::Tagged(tagged) => is_truthy(&tagged.value),
    }
}

/// Front-matter metadata of a post
///
/// The header is kept as the parsed mapping, untouched, so rewriting a file
/// only changes the keys an update sets explicitly. The typed accessors
/// interpret values loosely on read.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FrontMatter {
    fields: Mapping,
}

impl FrontMatter {
    /// Metadata written for a freshly created post
    pub fn for_new_post(title: &str, date: NaiveDate, tags: Vec<String>, pinned: bool) -> Self {
        let mut fm = Self::default();
        fm.set("title", Value::String(title.to_string()));
        fm.set("date", Value::String(date.format("%Y-%m-%d").to_string()));
        fm.set_tags(tags);
        fm.set("pinned", Value::Bool(pinned));
        fm
    }

    /// Split `content` into metadata and body
    ///
    /// Never fails: a missing, unterminated or malformed block yields empty
    /// metadata and the whole input as body.
    pub fn parse(content: &str) -> (Self, &str) {
        let Some((header, body)) = split_block(content) else {
            return (FrontMatter::default(), content);
        };

        if header.trim().is_empty() {
            return (FrontMatter::default(), body);
        }

        match serde_yaml::from_str::<Value>(header) {
            Ok(Value::Mapping(fields)) => (Self { fields }, body),
            Ok(Value::Null) => (FrontMatter::default(), body),
            Ok(_) => {
                tracing::warn!("Front-matter is not a mapping, treating as content");
                (FrontMatter::default(), content)
            }
            Err(e) => {
                tracing::warn!("Failed to parse YAML front-matter, treating as content: {}", e);
                (FrontMatter::default(), content)
            }
        }
    }

    /// Raw stored value of `key`
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.fields.get(key)
    }

    pub fn title(&self) -> Option<String> {
        self.get("title").and_then(scalar_text)
    }

    pub fn date(&self) -> Option<String> {
        self.get("date").and_then(scalar_text)
    }

    pub fn summary(&self) -> Option<String> {
        self.get("summary").and_then(scalar_text)
    }

    /// Tags as a list; a single scalar counts as one tag
    pub fn tags(&self) -> Option<Vec<String>> {
        match self.get("tags")? {
            Value::Sequence(items) => Some(items.iter().filter_map(scalar_text).collect()),
            other => scalar_text(other).map(|tag| vec![tag]),
        }
    }

    /// Only boolean `true` or the string `"true"` pin a post
    pub fn pinned(&self) -> bool {
        match self.get("pinned") {
            Some(Value::Bool(b)) => *b,
            Some(Value::String(s)) => s == "true",
            _ => false,
        }
    }

    /// Overlay the fields supplied by an update; every other stored value is kept as is
    pub fn merge_update(
        &mut self,
        title: Option<&str>,
        tags: Option<Vec<String>>,
        pinned: Option<bool>,
    ) {
        match title.filter(|t| !t.is_empty()) {
            Some(title) => self.set("title", Value::String(title.to_string())),
            None if self.get("title").is_some_and(is_truthy) => {}
            None => self.set("title", Value::String(UNTITLED.to_string())),
        }

        if let Some(tags) = tags {
            self.set_tags(tags);
        }

        match pinned {
            Some(pinned) => self.set("pinned", Value::Bool(pinned)),
            None if self.get("pinned").is_some_and(is_truthy) => {}
            None => self.set("pinned", Value::Bool(false)),
        }
    }

    /// The `date` field normalized to `YYYY-MM-DD`, if it parses
    pub fn normalized_date(&self) -> Option<String> {
        self.date()
            .as_deref()
            .and_then(parse_date_string)
            .map(|d| d.format("%Y-%m-%d").to_string())
    }

    /// Header lines between the delimiters, each terminated by a newline
    pub fn to_yaml(&self) -> String {
        let mut out = String::new();

        for key in CANONICAL_KEYS {
            if let Some(value) = self.get(key) {
                out.push_str(&canonical_line(key, value));
            }
        }

        for (key, value) in &self.fields {
            if key.as_str().is_some_and(|k| CANONICAL_KEYS.contains(&k)) {
                continue;
            }
            out.push_str(&yaml_entry(key, value));
        }

        out
    }

    /// Full file text: delimited header followed by `body` verbatim
    pub fn render(&self, body: &str) -> String {
        format!("{DELIMITER}\n{}{DELIMITER}\n{}", self.to_yaml(), body)
    }

    fn set(&mut self, key: &str, value: Value) {
        self.fields.insert(Value::String(key.to_string()), value);
    }

    fn set_tags(&mut self, tags: Vec<String>) {
        let tags = tags.into_iter().map(Value::String).collect();
        self.set("tags", Value::Sequence(tags));
    }
}

/// A known key in the compact form new posts are written with; values of
/// any other shape fall back to plain YAML
fn canonical_line(key: &str, value: &Value) -> String {
    match value {
        Value::String(s) => format!("{}: {}\n", key, quote(s)),
        Value::Bool(b) => format!("{}: {}\n", key, b),
        Value::Sequence(items) if items.iter().all(Value::is_string) => {
            let tags: Vec<&str> = items.iter().filter_map(Value::as_str).collect();
            format!("{}: {}\n", key, serde_json::json!(tags))
        }
        _ => yaml_entry(&Value::String(key.to_string()), value),
    }
}

/// One `key: value` entry as block YAML
fn yaml_entry(key: &Value, value: &Value) -> String {
    let mut entry = Mapping::new();
    entry.insert(key.clone(), value.clone());
    match serde_yaml::to_string(&entry) {
        Ok(yaml) => yaml,
        Err(e) => {
            tracing::warn!("Dropping unserializable front-matter key {:?}: {}", key, e);
            String::new()
        }
    }
}

/// Double-quoted scalar; JSON string escaping is valid YAML
fn quote(s: &str) -> String {
    serde_json::Value::String(s.to_string()).to_string()
}

/// Split the leading delimited block off `content`
///
/// Returns the header text (without delimiters) and the body after the
/// closing delimiter line.
fn split_block(content: &str) -> Option<(&str, &str)> {
    let rest = content.strip_prefix(DELIMITER)?;
    let rest = strip_line_end(rest.trim_start_matches([' ', '\t']))?;

    let (header, after) = if rest.starts_with(DELIMITER) {
        ("", &rest[DELIMITER.len()..])
    } else {
        let pos = rest.find(&format!("\n{DELIMITER}"))?;
        (&rest[..pos + 1], &rest[pos + 1 + DELIMITER.len()..])
    };

    let after = after.trim_start_matches([' ', '\t']);
    if after.is_empty() {
        return Some((header, after));
    }
    strip_line_end(after).map(|body| (header, body))
}

fn strip_line_end(s: &str) -> Option<&str> {
    s.strip_prefix("\r\n").or_else(|| s.strip_prefix('\n'))
}

/// Parse a date string in various formats
fn parse_date_string(s: &str) -> Option<NaiveDate> {
    let s = s.trim();

    let datetime_formats = [
        "%Y-%m-%d %H:%M:%S",
        "%Y/%m/%d %H:%M:%S",
        "%Y-%m-%d %H:%M",
        "%Y/%m/%d %H:%M",
        "%Y-%m-%dT%H:%M:%S",
        "%Y-%m-%dT%H:%M:%S%.f",
    ];
    for fmt in datetime_formats {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(dt.date());
        }
    }

    for fmt in ["%Y-%m-%d", "%Y/%m/%d"] {
        if let Ok(d) = NaiveDate::parse_from_str(s, fmt) {
            return Some(d);
        }
    }

    // RFC 3339 / ISO 8601 with offset, reported as the UTC calendar date
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.naive_utc().date());
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;

    const CREATED: &str = "---\ntitle: \"Hello World\"\ndate: \"2025-11-28\"\ntags: [\"rust\",\"블로그\"]\npinned: false\n---\n\nThis is the content.\n";

    #[test]
    fn test_parse_yaml_frontmatter() {
        let (fm, body) = FrontMatter::parse(CREATED);
        assert_eq!(fm.title().as_deref(), Some("Hello World"));
        assert_eq!(fm.date().as_deref(), Some("2025-11-28"));
        assert_eq!(fm.tags(), Some(vec!["rust".to_string(), "블로그".to_string()]));
        assert!(!fm.pinned());
        assert_eq!(fm.summary(), None);
        assert_eq!(body, "\nThis is the content.\n");
    }

    #[test]
    fn test_roundtrip_is_byte_exact() {
        let (fm, body) = FrontMatter::parse(CREATED);
        assert_eq!(fm.render(body), CREATED);
    }

    #[test]
    fn test_for_new_post_matches_written_format() {
        let date = NaiveDate::from_ymd_opt(2025, 11, 28).unwrap();
        let fm = FrontMatter::for_new_post(
            "Hello World",
            date,
            vec!["rust".to_string(), "블로그".to_string()],
            false,
        );
        assert_eq!(fm.render("\nThis is the content.\n"), CREATED);
    }

    #[test]
    fn test_parse_block_list_and_single_string_tags() {
        let content = "---\ntitle: Block\ntags:\n  - a\n  - b\n---\nbody";
        let (fm, body) = FrontMatter::parse(content);
        assert_eq!(fm.tags(), Some(vec!["a".to_string(), "b".to_string()]));
        assert_eq!(body, "body");

        let (fm, _) = FrontMatter::parse("---\ntags: Notes\n---\n");
        assert_eq!(fm.tags(), Some(vec!["Notes".to_string()]));
    }

    #[test]
    fn test_pinned_strictness() {
        let pinned = |v: &str| FrontMatter::parse(&format!("---\npinned: {}\n---\n", v)).0.pinned();
        assert!(pinned("true"));
        assert!(pinned("\"true\""));
        assert!(!pinned("yes"));
        assert!(!pinned("1"));
        assert!(!pinned("false"));
    }

    #[test]
    fn test_missing_block_is_all_body() {
        let content = "# Just markdown\n\nNo metadata.";
        let (fm, body) = FrontMatter::parse(content);
        assert_eq!(fm, FrontMatter::default());
        assert_eq!(body, content);
    }

    #[test]
    fn test_unterminated_block_is_all_body() {
        let content = "---\ntitle: never closed\n\nbody";
        let (fm, body) = FrontMatter::parse(content);
        assert_eq!(fm, FrontMatter::default());
        assert_eq!(body, content);
    }

    #[test]
    fn test_malformed_yaml_degrades() {
        let content = "---\ntitle: [unclosed\n---\nbody";
        let (fm, body) = FrontMatter::parse(content);
        assert_eq!(fm, FrontMatter::default());
        assert_eq!(body, content);

        let (fm, body) = FrontMatter::parse("---\n- just\n- a list\n---\nbody");
        assert_eq!(fm, FrontMatter::default());
        assert!(body.starts_with("---\n"));
    }

    #[test]
    fn test_merge_update_preserves_unknown_keys() {
        let content = "---\ntitle: Old\nauthor: someone\ntags: [keep]\npinned: true\n---\nold body\n";
        let (mut fm, _) = FrontMatter::parse(content);
        fm.merge_update(None, None, None);

        assert_eq!(fm.title().as_deref(), Some("Old"));
        assert_eq!(fm.tags(), Some(vec!["keep".to_string()]));
        assert!(fm.pinned());
        assert_eq!(fm.get("author"), Some(&Value::String("someone".to_string())));

        let rendered = fm.render("new body\n");
        assert!(rendered.contains("author: someone\n"));
        assert!(rendered.ends_with("---\nnew body\n"));
    }

    #[test]
    fn test_merge_update_keeps_values_of_any_shape() {
        let content = "---\ntitle:\n  ko: 제목\nsummary:\n  ko: 요약\n  en: summary\npinned: yes\n---\nold\n";
        let (mut fm, _) = FrontMatter::parse(content);
        fm.merge_update(None, None, None);

        let rendered = fm.render("new\n");
        let (reparsed, body) = FrontMatter::parse(&rendered);
        assert_eq!(body, "new\n");
        assert_eq!(reparsed.get("title"), fm.get("title"));
        assert!(matches!(reparsed.get("title"), Some(Value::Mapping(_))));
        assert_eq!(
            reparsed.get("summary").and_then(|s| s.get("ko")),
            Some(&Value::String("요약".to_string()))
        );
        assert_eq!(reparsed.get("pinned"), Some(&Value::String("yes".to_string())));
        assert!(!reparsed.pinned());
        assert_eq!(reparsed.title(), None);
        assert_eq!(reparsed.summary(), None);
    }

    #[test]
    fn test_merge_update_overlays_supplied_fields() {
        let (mut fm, _) = FrontMatter::parse("---\ndate: 2024-01-15\n---\n");
        fm.merge_update(Some("New"), Some(vec!["t".to_string()]), Some(true));
        assert_eq!(fm.title().as_deref(), Some("New"));
        assert_eq!(fm.tags(), Some(vec!["t".to_string()]));
        assert!(fm.pinned());
        assert_eq!(fm.date().as_deref(), Some("2024-01-15"));

        let mut empty = FrontMatter::default();
        empty.merge_update(Some(""), None, None);
        assert_eq!(empty.title().as_deref(), Some(UNTITLED));
        assert_eq!(empty.get("pinned"), Some(&Value::Bool(false)));
        assert_eq!(empty.tags(), None);
    }

    #[test]
    fn test_normalized_date() {
        let fm = |d: &str| FrontMatter::parse(&format!("---\ndate: {}\n---\n", d)).0;
        assert_eq!(fm("2024-01-15").normalized_date().as_deref(), Some("2024-01-15"));
        assert_eq!(
            fm("2024-01-15 10:30:00").normalized_date().as_deref(),
            Some("2024-01-15")
        );
        assert_eq!(fm("2024/01/15").normalized_date().as_deref(), Some("2024-01-15"));
        assert_eq!(fm("not a date").normalized_date(), None);
    }
}
