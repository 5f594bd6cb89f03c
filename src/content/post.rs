//! Post model

use serde::Serialize;

use super::PostMetadata;

/// A blog post parsed from its raw file content
#[derive(Debug, Clone, Serialize)]
pub struct Post {
    /// Front-matter metadata
    pub metadata: PostMetadata,

    /// Markdown body after the front-matter block
    pub body: String,

    /// Raw file content as served by the listing endpoint
    pub raw: String,
}

impl Post {
    /// Parse a post from raw file content
    pub fn parse(raw: impl Into<String>) -> Self {
        let raw = raw.into();
        let (metadata, body) = PostMetadata::parse(&raw);
        let body = body.to_string();
        Self {
            metadata,
            body,
            raw,
        }
    }

    /// Post title
    pub fn title(&self) -> &str {
        &self.metadata.title
    }

    /// Whether the post embeds an Instagram post
    pub fn has_instagram(&self) -> bool {
        self.metadata.has_instagram()
    }
}
