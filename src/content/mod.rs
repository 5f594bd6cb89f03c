//! Content module - post files, listing, and rendering

mod frontmatter;
pub mod listing;
pub mod loader;
mod markdown;
mod post;
pub mod render;

pub use frontmatter::{ImageField, PostMetadata};
pub use listing::{Language, ListingError, ListingRequest, ListingResponse};
pub use loader::PostLoader;
pub use markdown::MarkdownRenderer;
pub(crate) use markdown::escape_attr;
pub use post::Post;
pub use render::ArticleRenderer;
