//! Content repository - the read/write surface over the folder-of-posts tree
//!
//! Every read re-scans the disk; nothing is cached between calls, so there is
//! no invalidation to get wrong after a create, update or delete. Files are
//! decoded lossily: a stray non-UTF-8 byte never hides a post.

use chrono::NaiveDate;
use indexmap::IndexSet;
use std::cmp::Ordering;
use std::fs::{self, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use super::error::{ContentError, ContentResult};
use super::frontmatter::FrontMatter;
use super::path::{date_prefix, humanize_slug, post_file_name, safe_title, PathCodec};
use super::post::{Post, PostAddress, PostMeta};
use super::query;

/// Input of a create
#[derive(Debug, Clone, Default)]
pub struct NewPost {
    pub title: String,
    pub content: String,
    pub category: String,
    pub tags: Vec<String>,
    pub pinned: bool,
}

/// Input of an update; `None` fields keep what the file already has
#[derive(Debug, Clone, Default)]
pub struct PostUpdate {
    pub category: String,
    pub slug: String,
    pub content: String,
    pub title: Option<String>,
    pub tags: Option<Vec<String>>,
    pub pinned: Option<bool>,
}

/// What a `/`-joined blog path points at
#[derive(Debug, Clone)]
pub enum Resolved {
    Post(Post),
    Category { name: String, posts: Vec<PostMeta> },
}

/// Folder-of-Markdown-files content store
#[derive(Debug, Clone)]
pub struct ContentRepository {
    codec: PathCodec,
}

impl ContentRepository {
    pub fn new(root: impl Into<PathBuf>, extension: &str) -> Self {
        Self {
            codec: PathCodec::new(root, extension),
        }
    }

    pub fn root(&self) -> &Path {
        self.codec.root()
    }

    pub fn codec(&self) -> &PathCodec {
        &self.codec
    }

    /// Metadata of every post under the root: pinned first, then newest first
    pub fn list_all(&self) -> ContentResult<Vec<PostMeta>> {
        let mut posts = Vec::new();

        for path in self.content_files()? {
            posts.push(self.read_meta(&path)?);
        }

        sort_index(&mut posts);
        tracing::debug!("Scanned {} posts under {:?}", posts.len(), self.root());
        Ok(posts)
    }

    /// Every category path: each directory below the root (empty ones included)
    /// plus every ancestor of every post's category, in scan order
    pub fn list_categories(&self) -> ContentResult<Vec<String>> {
        let mut categories = IndexSet::new();
        if !self.root().exists() {
            return Ok(Vec::new());
        }

        for entry in self.walk() {
            let entry = entry?;
            if entry.depth() > 0 && entry.file_type().is_dir() {
                if let Some(category) = self.codec.decode_dir(entry.path()) {
                    categories.insert(category);
                }
            }
        }

        for post in self.list_all()? {
            for ancestor in query::category_ancestors(&post.category) {
                categories.insert(ancestor);
            }
        }

        Ok(categories.into_iter().collect())
    }

    /// Whether `category` names an existing directory
    pub fn category_exists(&self, category: &str) -> ContentResult<bool> {
        Ok(self.codec.category_dir(category)?.is_dir())
    }

    /// A single post with its body
    pub fn get(&self, category: &str, slug: &str) -> ContentResult<Post> {
        let path = self.codec.encode(category, slug)?;
        if !path.is_file() {
            return Err(ContentError::not_found(category, slug));
        }

        let raw = read_text(&path)?;
        let (fm, body) = FrontMatter::parse(&raw);
        let address = self.address_of(&path)?;

        Ok(Post {
            meta: build_meta(&fm, address, path.clone()),
            content: body.to_string(),
        })
    }

    /// Write a new post dated `today`; an existing file at the derived path is a conflict
    pub fn create(&self, new: &NewPost, today: NaiveDate) -> ContentResult<PostAddress> {
        let title = new.title.trim();
        let category = new.category.trim();
        if title.is_empty() || category.is_empty() {
            return Err(ContentError::validation("Title and category are required"));
        }
        if safe_title(title).is_empty() {
            return Err(ContentError::validation(
                "Title must contain at least one letter, digit or hyphen",
            ));
        }

        let dir = self.codec.category_dir(category)?;
        let path = dir.join(post_file_name(today, title, self.codec.extension()));

        if !dir.exists() {
            fs::create_dir_all(&dir).map_err(|e| ContentError::io(&dir, e))?;
            tracing::debug!("Created category directory {:?}", dir);
        }

        let fm = FrontMatter::for_new_post(title, today, new.tags.clone(), new.pinned);
        let text = fm.render(&format!("\n{}\n", new.content));

        // create_new makes the existence check and the create one step
        let mut file = match OpenOptions::new().write(true).create_new(true).open(&path) {
            Ok(file) => file,
            Err(e) if e.kind() == io::ErrorKind::AlreadyExists => {
                return Err(ContentError::Conflict(path));
            }
            Err(e) => return Err(ContentError::io(&path, e)),
        };
        file.write_all(text.as_bytes())
            .map_err(|e| ContentError::io(&path, e))?;

        let address = self.address_of(&path)?;
        tracing::info!("Created post {}", address);
        Ok(address)
    }

    /// Rewrite an existing post: supplied fields overlay the stored metadata,
    /// the body is replaced entirely
    pub fn update(&self, update: &PostUpdate) -> ContentResult<()> {
        if update.category.is_empty() || update.slug.is_empty() || update.content.is_empty() {
            return Err(ContentError::validation(
                "Category, slug, and content are required",
            ));
        }

        let path = self.codec.encode(&update.category, &update.slug)?;
        if !path.is_file() {
            return Err(ContentError::not_found(&update.category, &update.slug));
        }

        let raw = read_text(&path)?;
        let (mut fm, _) = FrontMatter::parse(&raw);
        fm.merge_update(
            update.title.as_deref(),
            update.tags.clone(),
            update.pinned,
        );

        let mut body = update.content.clone();
        if !body.ends_with('\n') {
            body.push('\n');
        }
        fs::write(&path, fm.render(&body)).map_err(|e| ContentError::io(&path, e))?;

        tracing::info!("Updated post {:?}", path);
        Ok(())
    }

    /// Remove a post file
    pub fn delete(&self, category: &str, slug: &str) -> ContentResult<()> {
        if category.is_empty() || slug.is_empty() {
            return Err(ContentError::validation("Category and slug are required"));
        }

        let path = self.codec.encode(category, slug)?;
        if !path.is_file() {
            return Err(ContentError::not_found(category, slug));
        }

        fs::remove_file(&path).map_err(|e| ContentError::io(&path, e))?;
        tracing::info!("Deleted post {:?}", path);
        Ok(())
    }

    /// Resolve a `/`-joined blog path to a post, or failing that to a category
    pub fn resolve(&self, path: &str) -> ContentResult<Resolved> {
        let normalized = self.codec.normalize_category(path)?;
        let (category, slug) = match normalized.rsplit_once('/') {
            Some((category, slug)) => (category, slug),
            None => ("", normalized.as_str()),
        };
        if slug.is_empty() {
            return Err(ContentError::not_found(category, slug));
        }

        if self.codec.encode(category, slug)?.is_file() {
            return self.get(category, slug).map(Resolved::Post);
        }

        if self.category_exists(&normalized)? {
            let posts = query::by_category(&self.list_all()?, &normalized);
            return Ok(Resolved::Category {
                name: normalized,
                posts,
            });
        }

        Err(ContentError::not_found(category, slug))
    }

    fn walk(&self) -> impl Iterator<Item = ContentResult<walkdir::DirEntry>> + '_ {
        WalkDir::new(self.root())
            .follow_links(true)
            .sort_by_file_name()
            .into_iter()
            .map(|entry| {
                entry.map_err(|e| {
                    let path = e.path().unwrap_or(self.root()).to_path_buf();
                    ContentError::io(&path, e.into())
                })
            })
    }

    fn content_files(&self) -> ContentResult<Vec<PathBuf>> {
        if !self.root().exists() {
            return Ok(Vec::new());
        }

        let mut files = Vec::new();
        for entry in self.walk() {
            let entry = entry?;
            if entry.file_type().is_file() && self.codec.is_content_file(entry.path()) {
                files.push(entry.into_path());
            }
        }
        Ok(files)
    }

    fn read_meta(&self, path: &Path) -> ContentResult<PostMeta> {
        let raw = read_text(path)?;
        let (fm, _) = FrontMatter::parse(&raw);
        Ok(build_meta(&fm, self.address_of(path)?, path.to_path_buf()))
    }

    fn address_of(&self, path: &Path) -> ContentResult<PostAddress> {
        self.codec.decode(path).ok_or_else(|| {
            ContentError::validation(format!("{:?} is outside the content root", path))
        })
    }
}

/// Read a content file, replacing invalid UTF-8 sequences
fn read_text(path: &Path) -> ContentResult<String> {
    let bytes = fs::read(path).map_err(|e| ContentError::io(path, e))?;
    Ok(match String::from_utf8(bytes) {
        Ok(text) => text,
        Err(e) => {
            tracing::debug!("{:?} is not valid UTF-8, decoding lossily", path);
            String::from_utf8_lossy(e.as_bytes()).into_owned()
        }
    })
}

/// Apply the metadata fallbacks: date from the file name, title from the slug
fn build_meta(fm: &FrontMatter, address: PostAddress, source: PathBuf) -> PostMeta {
    let date = fm
        .normalized_date()
        .or_else(|| date_prefix(&address.slug).map(str::to_string))
        .unwrap_or_default();

    let title = fm
        .title()
        .filter(|t| !t.is_empty())
        .unwrap_or_else(|| humanize_slug(&address.slug));

    PostMeta {
        title,
        date,
        tags: fm.tags().unwrap_or_default(),
        summary: fm.summary().unwrap_or_default(),
        pinned: fm.pinned(),
        slug: address.slug,
        category: address.category,
        source,
    }
}

/// Pinned before unpinned, then descending by date; stable for ties
fn sort_index(posts: &mut [PostMeta]) {
    posts.sort_by(|a, b| match (a.pinned, b.pinned) {
        (true, false) => Ordering::Less,
        (false, true) => Ordering::Greater,
        _ => b.date.cmp(&a.date),
    });
}
