//! List one page of posts

use anyhow::Result;

use crate::content::{ListingRequest, Post};
use crate::Site;

/// Print a page of posts and the listing totals
pub fn run(site: &Site, request: &ListingRequest) -> Result<()> {
    let page = site.loader().list(request)?;

    println!(
        "Posts ({}), page {} [{}]:",
        page.total,
        request.page,
        request.language.code()
    );
    for raw in page.posts {
        let post = Post::parse(raw);
        let date = post
            .metadata
            .parse_date()
            .map(|d| d.format("%Y-%m-%d").to_string())
            .or_else(|| post.metadata.date.clone())
            .unwrap_or_else(|| "----------".to_string());
        println!("  {} - {}", date, post.title());
    }
    if page.has_more {
        println!("More posts on page {}.", request.page + 1);
    }

    Ok(())
}
