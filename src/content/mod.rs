//! Content module - posts on disk, their metadata and derived views

mod error;
mod frontmatter;
mod markdown;
pub mod path;
mod post;
pub mod query;
mod repository;

pub use error::{ContentError, ContentResult};
pub use frontmatter::FrontMatter;
pub use markdown::{
    reading_time_minutes, MarkdownRenderer, DEFAULT_THEME as DEFAULT_HIGHLIGHT_THEME,
};
pub use path::PathCodec;
pub use post::{Post, PostAddress, PostMeta, TagCount};
pub use repository::{ContentRepository, NewPost, PostUpdate, Resolved};
