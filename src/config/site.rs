//! Site configuration (_config.yml)

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::content::Language;

/// Main site configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SiteConfig {
    // Site
    pub title: String,
    pub author: String,
    pub language: String,

    // Directory
    pub posts_dir: String,
    pub public_dir: String,

    // Pagination
    pub per_page: u64,

    // Header links
    pub links: Vec<LinkConfig>,

    pub feed: FeedConfig,
    pub server: ServerConfig,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            title: "dädbändt".to_string(),
            author: "Joshua Fuego".to_string(),
            language: "en".to_string(),

            posts_dir: "posts".to_string(),
            public_dir: "public".to_string(),

            per_page: 3,

            links: Vec::new(),

            feed: FeedConfig::default(),
            server: ServerConfig::default(),
        }
    }
}

impl SiteConfig {
    /// Load configuration from a file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path.as_ref())?;
        let config: SiteConfig = serde_yaml::from_str(&content)?;
        config.validate()?;
        tracing::debug!("Loaded config from {:?}", path.as_ref());
        Ok(config)
    }

    /// Reject settings no page could be served with
    pub fn validate(&self) -> Result<()> {
        if self.per_page == 0 {
            anyhow::bail!("per_page must be at least 1");
        }
        Ok(())
    }

    /// Language used when a request or command names none
    pub fn default_language(&self) -> Language {
        Language::parse(&self.language)
    }
}

/// An external link shown in the page header
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LinkConfig {
    pub name: String,
    pub url: String,
}

/// Client feed configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FeedConfig {
    /// Distance from the bottom of the content that triggers the next page
    pub scroll_threshold: f64,
    /// Interval between readiness checks of the embed script, in milliseconds
    pub embed_poll_ms: u64,
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            scroll_threshold: 1000.0,
            embed_poll_ms: 1000,
        }
    }
}

/// Development server configuration
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
            port: 4000,
        }
    }
}
