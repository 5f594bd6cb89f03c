//! bandsite: a small band website serving paginated markdown posts
//!
//! Posts live as markdown files in a directory. The server pages through them
//! newest first and the client feed accumulates pages as the reader scrolls.

pub mod client;
pub mod commands;
pub mod config;
pub mod content;
pub mod server;

use anyhow::Result;
use std::path::{Path, PathBuf};

use content::PostLoader;

/// A site rooted at a directory
#[derive(Debug, Clone)]
pub struct Site {
    /// Site configuration
    pub config: config::SiteConfig,
    /// Base directory
    pub base_dir: PathBuf,
    /// Default-language posts directory
    pub posts_dir: PathBuf,
    /// Static files directory
    pub public_dir: PathBuf,
}

impl Site {
    /// Create a new site from a directory
    pub fn new<P: AsRef<Path>>(base_dir: P) -> Result<Self> {
        let base_dir = base_dir.as_ref().to_path_buf();
        let config_path = base_dir.join("_config.yml");

        let config = if config_path.exists() {
            config::SiteConfig::load(&config_path)?
        } else {
            tracing::debug!("No _config.yml in {:?}, using defaults", base_dir);
            config::SiteConfig::default()
        };

        Ok(Self::with_config(base_dir, config))
    }

    /// Create a site with an explicit configuration
    pub fn with_config<P: AsRef<Path>>(base_dir: P, config: config::SiteConfig) -> Self {
        let base_dir = base_dir.as_ref().to_path_buf();
        let posts_dir = base_dir.join(&config.posts_dir);
        let public_dir = base_dir.join(&config.public_dir);

        Self {
            config,
            base_dir,
            posts_dir,
            public_dir,
        }
    }

    /// Loader over this site's posts
    pub fn loader(&self) -> PostLoader {
        PostLoader::new(&self.posts_dir)
    }
}
