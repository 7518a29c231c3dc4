//! milkyway: a Markdown blog board
//!
//! Posts are Markdown files with YAML front matter, stored in nested category
//! folders under a content root. This crate maps that tree to a sorted,
//! taggable post index and serves it, along with create/update/delete
//! operations, over a small JSON API.

pub mod commands;
pub mod config;
pub mod content;
pub mod server;

use anyhow::Result;
use std::path::{Path, PathBuf};

use content::ContentRepository;

/// Name of the configuration file in the base directory
pub const CONFIG_FILE: &str = "_config.yml";

/// The board application
#[derive(Debug, Clone)]
pub struct Board {
    /// Site configuration
    pub config: config::SiteConfig,
    /// Base directory
    pub base_dir: PathBuf,
    /// Content root holding the category folders
    pub content_dir: PathBuf,
    /// Static build output served by the server fallback
    pub public_dir: PathBuf,
}

impl Board {
    /// Create a new board from a directory
    pub fn new<P: AsRef<Path>>(base_dir: P) -> Result<Self> {
        let base_dir = base_dir.as_ref().to_path_buf();
        let config_path = base_dir.join(CONFIG_FILE);

        let config = if config_path.exists() {
            config::SiteConfig::load(&config_path)?
        } else {
            config::SiteConfig::default()
        };

        Ok(Self::with_config(base_dir, config))
    }

    /// Create a board with an explicit configuration
    pub fn with_config(base_dir: PathBuf, config: config::SiteConfig) -> Self {
        let content_dir = base_dir.join(&config.content_dir);
        let public_dir = base_dir.join(&config.public_dir);
        Self {
            config,
            base_dir,
            content_dir,
            public_dir,
        }
    }

    /// Repository over the content root; cheap, holds no state beyond paths
    pub fn repository(&self) -> ContentRepository {
        ContentRepository::new(&self.content_dir, &self.config.extension)
    }
}
