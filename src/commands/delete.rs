//! Delete a post

use anyhow::Result;

use crate::Board;

/// Remove the post at `category`/`slug`
pub fn run(board: &Board, category: &str, slug: &str) -> Result<()> {
    board.repository().delete(category, slug)?;
    println!("Deleted: {}/{}", category, slug);
    Ok(())
}
