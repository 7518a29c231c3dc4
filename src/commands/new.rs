//! Create a new post

use anyhow::Result;

use crate::content::{NewPost, PostAddress};
use crate::Board;

/// Create a post with an empty body in `category`
pub fn create_post(
    board: &Board,
    title: &str,
    category: &str,
    tags: Vec<String>,
    pinned: bool,
) -> Result<PostAddress> {
    let new = NewPost {
        title: title.to_string(),
        content: String::new(),
        category: category.to_string(),
        tags,
        pinned,
    };

    let address = board.repository().create(&new, board.config.today()?)?;
    println!("Created: {}", address);

    Ok(address)
}

/// Split a comma-separated tag list
pub fn parse_tags(tags: Option<&str>) -> Vec<String> {
    tags.map(|t| {
        t.split(',')
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .map(str::to_string)
            .collect()
    })
    .unwrap_or_default()
}
