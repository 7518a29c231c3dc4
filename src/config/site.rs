//! Site configuration (_config.yml)

use anyhow::{anyhow, Result};
use chrono::{Local, NaiveDate, Utc};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Tags offered by the editor before any post uses them
const DEFAULT_TAGS: [&str; 5] = ["에어드랍", "바이브코딩", "AI 최신 소식", "할인 이벤트", "몰입"];

/// Main site configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SiteConfig {
    // Site
    pub title: String,
    pub description: String,
    pub timezone: String,

    // Directory
    pub content_dir: String,
    pub public_dir: String,
    pub extension: String,

    // Listing
    pub recent_count: usize,
    pub default_tags: Vec<String>,

    // Rendering
    pub highlight_theme: String,

    // Server
    #[serde(default)]
    pub server: ServerConfig,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            title: "Milky Way Board".to_string(),
            description: "Markdown blog with calendar".to_string(),
            timezone: String::new(),

            content_dir: "blog".to_string(),
            public_dir: "public".to_string(),
            extension: "md".to_string(),

            recent_count: 5,
            default_tags: DEFAULT_TAGS.iter().map(|t| t.to_string()).collect(),

            highlight_theme: crate::content::DEFAULT_HIGHLIGHT_THEME.to_string(),

            server: ServerConfig::default(),
        }
    }
}

impl SiteConfig {
    /// Load configuration from a file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path.as_ref())?;
        let config: SiteConfig = serde_yaml::from_str(&content)?;
        Ok(config)
    }

    /// Today's date in the configured timezone, or the local one when unset
    pub fn today(&self) -> Result<NaiveDate> {
        if self.timezone.is_empty() {
            return Ok(Local::now().date_naive());
        }
        let tz: Tz = self
            .timezone
            .parse()
            .map_err(|e| anyhow!("Invalid timezone {:?}: {}", self.timezone, e))?;
        Ok(Utc::now().with_timezone(&tz).date_naive())
    }
}

/// HTTP server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub ip: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            ip: "localhost".to_string(),
            port: 3000,
        }
    }
}
