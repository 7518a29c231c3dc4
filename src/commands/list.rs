//! List board content

use anyhow::Result;

use crate::content::query;
use crate::Board;

/// List board content by type
pub fn run(board: &Board, content_type: &str) -> Result<()> {
    let repo = board.repository();

    match content_type {
        "post" | "posts" => {
            let posts = repo.list_all()?;
            println!("Posts ({}):", posts.len());
            for post in posts {
                let pin = if post.pinned { "📌 " } else { "" };
                let date = if post.date.is_empty() {
                    "----------"
                } else {
                    post.date.as_str()
                };
                println!("  {}{} - {} [{}]", pin, date, post.title, post.address());
            }
        }
        "tag" | "tags" => {
            let mut tags = query::tag_counts(&repo.list_all()?);
            println!("Tags ({}):", tags.len());
            tags.sort_by(|a, b| b.count.cmp(&a.count));
            for tag in tags {
                println!("  {} ({})", tag.tag, tag.count);
            }
        }
        "category" | "categories" => {
            let posts = repo.list_all()?;
            let categories = repo.list_categories()?;
            println!("Categories ({}):", categories.len());
            for category in categories {
                let count = query::by_category(&posts, &category).len();
                println!("  {} ({})", category, count);
            }
        }
        _ => {
            anyhow::bail!(
                "Unknown type: {}. Available: post, tag, category",
                content_type
            );
        }
    }

    Ok(())
}
