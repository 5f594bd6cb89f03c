//! Read posts page by page the way the browser feed does

use anyhow::Result;
use std::sync::Arc;

use crate::client::{HeadlessHost, LoadOutcome, PostFeed, PostSource};
use crate::config::FeedConfig;
use crate::content::{Language, Post};

/// Load up to `pages` pages from `source` and print the accumulated titles.
/// `origin` names the source in the output.
pub async fn run<S: PostSource>(
    source: S,
    origin: &str,
    language: Language,
    limit: u64,
    pages: u64,
    config: &FeedConfig,
) -> Result<()> {
    let host = Arc::new(HeadlessHost::new());
    let feed = PostFeed::new(source, language, limit, config).with_script_host(host.clone());

    let mut outcome = feed.mount().await;
    let mut loaded = 1;
    while loaded < pages && matches!(outcome, LoadOutcome::Loaded { .. }) {
        outcome = feed.load_more().await;
        loaded += 1;
    }
    if outcome == LoadOutcome::Failed {
        anyhow::bail!("Failed to load posts from {}", origin);
    }

    let posts = feed.posts();
    println!("Loaded {} posts from {}:", posts.len(), origin);
    for raw in posts {
        let post = Post::parse(raw);
        let marker = if post.has_instagram() { " [instagram]" } else { "" };
        println!("  {}{}", post.title(), marker);
    }
    if feed.has_more() {
        println!("More posts available (next page {}).", feed.next_page());
    }
    if feed.has_embed() {
        tracing::debug!("Embed scripts: {:?}", host.scripts());
    }

    feed.unmount();
    Ok(())
}
