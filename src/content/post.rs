//! Post models

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

/// Identity of a post: its category path plus the slug within that category
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PostAddress {
    /// `/`-joined folder segments relative to the content root, empty at the root
    pub category: String,
    /// File name without extension
    pub slug: String,
}

impl PostAddress {
    pub fn new(category: impl Into<String>, slug: impl Into<String>) -> Self {
        Self {
            category: category.into(),
            slug: slug.into(),
        }
    }

    /// Category segments, skipping the empty root category
    pub fn segments(&self) -> impl Iterator<Item = &str> {
        self.category.split('/').filter(|s| !s.is_empty())
    }
}

impl fmt::Display for PostAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.category.is_empty() {
            write!(f, "{}", self.slug)
        } else {
            write!(f, "{}/{}", self.category, self.slug)
        }
    }
}

/// Post metadata as listed by a content scan (no body)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PostMeta {
    /// Slug (file name without extension)
    pub slug: String,

    /// Title from front matter, or humanized from the file name
    pub title: String,

    /// `YYYY-MM-DD`, or empty when neither front matter nor file name carry a date
    pub date: String,

    /// Nested category path, `/`-joined
    pub category: String,

    /// Tags in insertion order, duplicates kept
    pub tags: Vec<String>,

    /// Short summary, empty by default
    pub summary: String,

    /// Pinned posts sort ahead of everything else
    pub pinned: bool,

    /// Full path of the source file
    #[serde(skip)]
    pub source: PathBuf,
}

impl PostMeta {
    pub fn address(&self) -> PostAddress {
        PostAddress::new(self.category.clone(), self.slug.clone())
    }

    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.iter().any(|t| t == tag)
    }

    /// Whether the post lives in `path` or one of its descendant categories
    pub fn in_category(&self, path: &str) -> bool {
        let path = path.trim_matches('/');
        self.category == path
            || (self
                .category
                .strip_prefix(path)
                .is_some_and(|rest| rest.starts_with('/')))
    }
}

/// A single post including its Markdown body
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Post {
    #[serde(flatten)]
    pub meta: PostMeta,

    /// Markdown body, excluding the front-matter block
    pub content: String,
}

/// Tag with its number of occurrences across all posts
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TagCount {
    pub tag: String,
    pub count: usize,
}
