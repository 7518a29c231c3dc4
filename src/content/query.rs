//! Views derived from a full content listing
//!
//! All functions take the already-sorted output of
//! [`ContentRepository::list_all`](super::ContentRepository::list_all) and
//! preserve its order.

use indexmap::IndexMap;

use super::post::{PostMeta, TagCount};

/// The first `n` posts
pub fn recent(posts: &[PostMeta], n: usize) -> Vec<PostMeta> {
    posts.iter().take(n).cloned().collect()
}

/// Posts in `path` or any of its descendant categories
pub fn by_category(posts: &[PostMeta], path: &str) -> Vec<PostMeta> {
    posts
        .iter()
        .filter(|p| p.in_category(path))
        .cloned()
        .collect()
}

/// Posts carrying exactly `tag`
pub fn by_tag(posts: &[PostMeta], tag: &str) -> Vec<PostMeta> {
    posts.iter().filter(|p| p.has_tag(tag)).cloned().collect()
}

/// Occurrences of every tag, keyed in first-seen order
pub fn tag_frequency(posts: &[PostMeta]) -> IndexMap<String, usize> {
    let mut tags: IndexMap<String, usize> = IndexMap::new();
    for post in posts {
        for tag in &post.tags {
            *tags.entry(tag.clone()).or_insert(0) += 1;
        }
    }
    tags
}

/// [`tag_frequency`] as a list, for serialization
pub fn tag_counts(posts: &[PostMeta]) -> Vec<TagCount> {
    tag_frequency(posts)
        .into_iter()
        .map(|(tag, count)| TagCount { tag, count })
        .collect()
}

/// Every ancestor path of a category, itself included: `a/b` yields `a`, `a/b`
pub fn category_ancestors(category: &str) -> Vec<String> {
    let mut ancestors = Vec::new();
    let mut current = String::new();
    for part in category.split('/').filter(|s| !s.is_empty()) {
        if !current.is_empty() {
            current.push('/');
        }
        current.push_str(part);
        ancestors.push(current.clone());
    }
    ancestors
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn post(slug: &str, category: &str, tags: &[&str]) -> PostMeta {
        PostMeta {
            slug: slug.to_string(),
            title: slug.to_string(),
            date: String::new(),
            category: category.to_string(),
            tags: tags.iter().map(|t| t.to_string()).collect(),
            summary: String::new(),
            pinned: false,
            source: PathBuf::new(),
        }
    }

    fn slugs(posts: Vec<PostMeta>) -> Vec<String> {
        posts.into_iter().map(|p| p.slug).collect()
    }

    fn sample() -> Vec<PostMeta> {
        vec![
            post("one", "x", &["rust", "ai"]),
            post("two", "x/y", &["ai"]),
            post("three", "xy", &["rust", "rust"]),
            post("four", "", &[]),
        ]
    }

    #[test]
    fn test_recent() {
        assert_eq!(slugs(recent(&sample(), 2)), vec!["one", "two"]);
        assert_eq!(recent(&sample(), 10).len(), 4);
        assert!(recent(&sample(), 0).is_empty());
    }

    #[test]
    fn test_by_category_includes_descendants_only() {
        assert_eq!(slugs(by_category(&sample(), "x")), vec!["one", "two"]);
        assert_eq!(slugs(by_category(&sample(), "x/y")), vec!["two"]);
        assert_eq!(slugs(by_category(&sample(), "xy")), vec!["three"]);
    }

    #[test]
    fn test_by_tag_exact_match() {
        assert_eq!(slugs(by_tag(&sample(), "rust")), vec!["one", "three"]);
        assert!(by_tag(&sample(), "Rust").is_empty());
    }

    #[test]
    fn test_tag_frequency_first_seen_order() {
        let freq = tag_frequency(&sample());
        let entries: Vec<_> = freq.iter().map(|(t, c)| (t.as_str(), *c)).collect();
        // duplicates within one post count twice
        assert_eq!(entries, vec![("rust", 3), ("ai", 2)]);

        let counts = tag_counts(&sample());
        assert_eq!(counts[0], TagCount { tag: "rust".to_string(), count: 3 });
    }

    #[test]
    fn test_category_ancestors() {
        assert_eq!(category_ancestors("a/b/c"), vec!["a", "a/b", "a/b/c"]);
        assert!(category_ancestors("").is_empty());
    }
}
