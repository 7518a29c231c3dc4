//! Path codec: maps logical post addresses to files under the content root and back

use chrono::NaiveDate;
use lazy_static::lazy_static;
use percent_encoding::percent_decode_str;
use regex::Regex;
use std::path::{Component, Path, PathBuf};

use super::error::{ContentError, ContentResult};
use super::post::PostAddress;

lazy_static! {
    /// Anything that is not a letter, digit, underscore, whitespace or hyphen.
    /// `\w` is Unicode-aware, so Hangul and other scripts survive.
    static ref UNSAFE_TITLE_CHARS: Regex = Regex::new(r"[^\w\s-]").unwrap();
    static ref WHITESPACE_RUN: Regex = Regex::new(r"\s+").unwrap();
    static ref DATE_PREFIX: Regex = Regex::new(r"^([0-9]{4}-[0-9]{2}-[0-9]{2})-").unwrap();
}

/// Turn a human-entered title into the file-name part of a slug
///
/// # Examples
/// ```ignore
/// safe_title("Hello, World! 테스트") // -> "Hello-World-테스트"
/// ```
pub fn safe_title(title: &str) -> String {
    let stripped = UNSAFE_TITLE_CHARS.replace_all(title, "");
    WHITESPACE_RUN
        .replace_all(stripped.trim(), "-")
        .into_owned()
}

/// File name for a post created on `date` with the given title
pub fn post_file_name(date: NaiveDate, title: &str, extension: &str) -> String {
    format!(
        "{}-{}.{}",
        date.format("%Y-%m-%d"),
        safe_title(title),
        extension
    )
}

/// The `YYYY-MM-DD` prefix of a slug, if present
pub fn date_prefix(slug: &str) -> Option<&str> {
    DATE_PREFIX
        .captures(slug)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str())
}

/// Human-readable title derived from a slug: date prefix dropped, hyphens to spaces
pub fn humanize_slug(slug: &str) -> String {
    DATE_PREFIX.replace(slug, "").replace('-', " ")
}

/// Percent-decode a path component, keeping the raw input when it does not
/// decode to valid UTF-8 (already-decoded input passes through unchanged)
pub fn decode_component(raw: &str) -> String {
    match percent_decode_str(raw).decode_utf8() {
        Ok(decoded) => decoded.into_owned(),
        Err(_) => raw.to_string(),
    }
}

/// Reject segments that would escape the content root or smuggle a separator
fn check_segment(segment: &str, what: &str) -> ContentResult<()> {
    if segment == "." || segment == ".." {
        return Err(ContentError::validation(format!(
            "invalid {} segment: {:?}",
            what, segment
        )));
    }
    if segment.contains(['/', '\\', '\0']) {
        return Err(ContentError::validation(format!(
            "{} segment contains a path separator: {:?}",
            what, segment
        )));
    }
    Ok(())
}

/// Bidirectional mapping between [`PostAddress`] and paths below a content root
#[derive(Debug, Clone)]
pub struct PathCodec {
    root: PathBuf,
    extension: String,
}

impl PathCodec {
    pub fn new(root: impl Into<PathBuf>, extension: &str) -> Self {
        Self {
            root: root.into(),
            extension: extension.trim_start_matches('.').to_string(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn extension(&self) -> &str {
        &self.extension
    }

    /// Normalize a possibly URL-encoded category into its canonical `/`-joined form
    pub fn normalize_category(&self, category: &str) -> ContentResult<String> {
        let decoded = decode_component(category);
        let segments: Vec<&str> = decoded.split('/').filter(|s| !s.is_empty()).collect();
        for segment in &segments {
            check_segment(segment, "category")?;
        }
        Ok(segments.join("/"))
    }

    /// Directory holding the posts of `category`, using native separators
    pub fn category_dir(&self, category: &str) -> ContentResult<PathBuf> {
        let category = self.normalize_category(category)?;
        let mut dir = self.root.clone();
        for segment in category.split('/').filter(|s| !s.is_empty()) {
            dir.push(segment);
        }
        Ok(dir)
    }

    /// Physical path of the post at (`category`, `slug`); both may be URL-encoded
    pub fn encode(&self, category: &str, slug: &str) -> ContentResult<PathBuf> {
        let slug = decode_component(slug);
        if slug.is_empty() {
            return Err(ContentError::validation("slug must not be empty"));
        }
        check_segment(&slug, "slug")?;
        let dir = self.category_dir(category)?;
        Ok(dir.join(format!("{}.{}", slug, self.extension)))
    }

    /// Logical address of a content file below the root
    pub fn decode(&self, path: &Path) -> Option<PostAddress> {
        let mut segments = self.relative_segments(path)?;
        let file_name = segments.pop()?;
        let slug = file_name
            .strip_suffix(&format!(".{}", self.extension))
            .unwrap_or(&file_name)
            .to_string();
        Some(PostAddress::new(segments.join("/"), slug))
    }

    /// `/`-joined category of a directory below the root (empty for the root itself)
    pub fn decode_dir(&self, dir: &Path) -> Option<String> {
        self.relative_segments(dir).map(|segments| segments.join("/"))
    }

    /// Whether `path` carries the content-file extension
    pub fn is_content_file(&self, path: &Path) -> bool {
        path.extension()
            .and_then(|e| e.to_str())
            .map(|e| e == self.extension)
            .unwrap_or(false)
    }

    fn relative_segments(&self, path: &Path) -> Option<Vec<String>> {
        let relative = path.strip_prefix(&self.root).ok()?;
        relative
            .components()
            .map(|c| match c {
                Component::Normal(s) => Some(s.to_string_lossy().into_owned()),
                _ => None,
            })
            .collect()
    }
}
