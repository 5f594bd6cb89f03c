//! Initialize a new site

use anyhow::Result;
use std::fs;
use std::path::Path;

const CONFIG_TEMPLATE: &str = r#"# Site
title: dädbändt
author: Joshua Fuego
language: en

# Directory
posts_dir: posts
public_dir: public

# Pagination
per_page: 3

# Header links
links:
  - name: Instagram
    url: https://www.instagram.com/
  - name: YouTube
    url: https://www.youtube.com/

# Client feed
feed:
  scroll_threshold: 1000
  embed_poll_ms: 1000

# Server
server:
  ip: localhost
  port: 4000
"#;

const FIRST_POST_EN: &str = r#"---
title: Hello World
date: 2024-01-01
---

Welcome to the band's new home. Add posts as `posts/post-<number>.md`;
higher numbers are shown first.
"#;

const FIRST_POST_ES: &str = r#"---
title: Hola Mundo
date: 2024-01-01
---

Bienvenidos al nuevo hogar de la banda.
"#;

/// Initialize a new site in the given directory
pub fn init_site(target_dir: &Path) -> Result<()> {
    let posts_dir = target_dir.join("posts");

    fs::create_dir_all(posts_dir.join("es"))?;
    fs::create_dir_all(target_dir.join("public"))?;

    write_if_missing(&target_dir.join("_config.yml"), CONFIG_TEMPLATE)?;
    write_if_missing(&posts_dir.join("post-1.md"), FIRST_POST_EN)?;
    write_if_missing(&posts_dir.join("es").join("post-1.md"), FIRST_POST_ES)?;

    Ok(())
}

/// Write a file unless something is already there
fn write_if_missing(path: &Path, content: &str) -> Result<()> {
    if path.exists() {
        tracing::info!("Skipping existing {:?}", path);
        return Ok(());
    }
    fs::write(path, content)?;
    tracing::debug!("Created {:?}", path);
    Ok(())
}
