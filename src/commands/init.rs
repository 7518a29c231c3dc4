//! Initialize a new board

use anyhow::Result;
use std::fs;
use std::path::Path;

use crate::config::SiteConfig;
use crate::content::NewPost;
use crate::{Board, CONFIG_FILE};

/// Category holding the sample post
const SAMPLE_CATEGORY: &str = "일상";

const SAMPLE_BODY: &str = r#"Welcome to your board! Every post is a Markdown file under the content
directory, and every folder is a category.

## Quick Start

### Create a new post

```bash
$ milkyway new "My New Post" --category "일상" --tags "몰입"
```

### Run server

```bash
$ milkyway serve --watch
```
"#;

/// Initialize a new board in the given directory
pub fn init_site(target_dir: &Path) -> Result<()> {
    fs::create_dir_all(target_dir)?;

    let config_path = target_dir.join(CONFIG_FILE);
    if config_path.exists() {
        anyhow::bail!("{:?} already exists", config_path);
    }

    let config = SiteConfig::default();
    let config_content = format!(
        "# Milky Way Board configuration\n\n{}",
        serde_yaml::to_string(&config)?
    );
    fs::write(&config_path, config_content)?;

    let board = Board::with_config(target_dir.to_path_buf(), config);
    fs::create_dir_all(&board.content_dir)?;

    let sample = NewPost {
        title: "Hello World".to_string(),
        content: SAMPLE_BODY.to_string(),
        category: SAMPLE_CATEGORY.to_string(),
        tags: Vec::new(),
        pinned: false,
    };
    let address = board.repository().create(&sample, board.config.today()?)?;
    tracing::debug!("Created sample post {}", address);

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_init_site_creates_loadable_board() {
        let dir = TempDir::new().unwrap();
        init_site(dir.path()).unwrap();

        let board = Board::new(dir.path()).unwrap();
        assert_eq!(board.config.content_dir, "blog");

        let posts = board.repository().list_all().unwrap();
        assert_eq!(posts.len(), 1);
        assert_eq!(posts[0].title, "Hello World");
        assert_eq!(posts[0].category, SAMPLE_CATEGORY);

        assert!(init_site(dir.path()).is_err());
    }
}
