//! Front-matter parsing

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

/// The `image` field: a single media reference or an ordered list of them
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ImageField {
    Single(String),
    Multiple(Vec<String>),
}

impl ImageField {
    /// All image references in order
    pub fn as_slice(&self) -> &[String] {
        match self {
            ImageField::Single(src) => std::slice::from_ref(src),
            ImageField::Multiple(srcs) => srcs,
        }
    }
}

/// Front-matter data from a post
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PostMetadata {
    pub title: String,
    pub date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<ImageField>,
    /// YouTube video identifier
    #[serde(skip_serializing_if = "Option::is_none")]
    pub youtube: Option<String>,
    /// Instagram permalink identifier (the part after `/p/`)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub instagram: Option<String>,
}

impl PostMetadata {
    /// Parse front-matter from content string
    /// Returns (metadata, body)
    pub fn parse(content: &str) -> (Self, &str) {
        let trimmed = content.trim_start();

        let Some(rest) = trimmed.strip_prefix("---") else {
            return (Self::default(), content);
        };
        let rest = rest.trim_start_matches(['\n', '\r']);

        // A closing delimiter right after the opening one means an empty block
        let (yaml, body) = if let Some(body) = rest.strip_prefix("---") {
            ("", body)
        } else if let Some(end_pos) = rest.find("\n---") {
            (&rest[..end_pos], &rest[end_pos + 4..])
        } else {
            return (Self::default(), content);
        };
        let body = body.trim_start_matches(['\n', '\r']);

        if yaml.trim().is_empty() {
            return (Self::default(), body);
        }

        match serde_yaml::from_str::<PostMetadata>(yaml) {
            Ok(metadata) => (metadata, body),
            Err(e) => {
                tracing::warn!(
                    "Failed to parse YAML front-matter, treating as content: {}",
                    e
                );
                (Self::default(), content)
            }
        }
    }

    /// Whether the post embeds an Instagram post
    pub fn has_instagram(&self) -> bool {
        self.instagram.as_deref().is_some_and(|id| !id.is_empty())
    }

    /// Image references, empty when the post has none
    pub fn images(&self) -> &[String] {
        self.image.as_ref().map(ImageField::as_slice).unwrap_or(&[])
    }

    /// Parse the date string into a calendar date
    pub fn parse_date(&self) -> Option<NaiveDate> {
        self.date.as_deref().and_then(parse_date_string)
    }
}

/// Parse a date string in various formats
fn parse_date_string(s: &str) -> Option<NaiveDate> {
    let s = s.trim();

    for fmt in ["%Y-%m-%d", "%Y/%m/%d", "%d/%m/%Y", "%B %d, %Y", "%b %d, %Y"] {
        if let Ok(d) = NaiveDate::parse_from_str(s, fmt) {
            return Some(d);
        }
    }

    for fmt in ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M"] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(dt.date());
        }
    }

    DateTime::parse_from_rfc3339(s).ok().map(|dt| dt.date_naive())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_full_frontmatter() {
        let content = r#"---
title: New Single Out
date: 2024-03-01
image: /images/cover.jpg
youtube: dQw4w9WgXcQ
instagram: C4abcdEfGh
---

Listen everywhere.
"#;

        let (meta, body) = PostMetadata::parse(content);
        assert_eq!(meta.title, "New Single Out");
        assert_eq!(meta.date.as_deref(), Some("2024-03-01"));
        assert_eq!(
            meta.image,
            Some(ImageField::Single("/images/cover.jpg".to_string()))
        );
        assert_eq!(meta.youtube.as_deref(), Some("dQw4w9WgXcQ"));
        assert!(meta.has_instagram());
        assert!(body.starts_with("Listen everywhere."));
    }

    #[test]
    fn test_parse_image_list() {
        let content = "---\ntitle: Tour\nimage:\n  - /a.jpg\n  - /b.jpg\n---\nbody";
        let (meta, body) = PostMetadata::parse(content);
        assert_eq!(
            meta.image,
            Some(ImageField::Multiple(vec![
                "/a.jpg".to_string(),
                "/b.jpg".to_string()
            ]))
        );
        assert_eq!(meta.images().len(), 2);
        assert_eq!(body, "body");
    }

    #[test]
    fn test_optional_fields_absent() {
        let (meta, _) = PostMetadata::parse("---\ntitle: Just words\n---\nHello");
        assert_eq!(meta.title, "Just words");
        assert!(meta.image.is_none());
        assert!(meta.images().is_empty());
        assert!(meta.youtube.is_none());
        assert!(!meta.has_instagram());
    }

    #[test]
    fn test_no_frontmatter() {
        let content = "# Heading\n\nNo metadata here.";
        let (meta, body) = PostMetadata::parse(content);
        assert_eq!(meta, PostMetadata::default());
        assert_eq!(body, content);
    }

    #[test]
    fn test_unclosed_frontmatter_is_content() {
        let content = "---\ntitle: Broken\n\nNo closing delimiter";
        let (meta, body) = PostMetadata::parse(content);
        assert!(meta.title.is_empty());
        assert_eq!(body, content);
    }

    #[test]
    fn test_malformed_yaml_is_content() {
        let content = "---\ntitle: [unterminated\n---\nBody";
        let (meta, body) = PostMetadata::parse(content);
        assert!(meta.title.is_empty());
        assert_eq!(body, content);
    }

    #[test]
    fn test_parse_date() {
        let meta = PostMetadata {
            date: Some("2024-01-15".to_string()),
            ..Default::default()
        };
        assert_eq!(meta.parse_date(), NaiveDate::from_ymd_opt(2024, 1, 15));

        let meta = PostMetadata {
            date: Some("March 13, 2023".to_string()),
            ..Default::default()
        };
        assert_eq!(meta.parse_date(), NaiveDate::from_ymd_opt(2023, 3, 13));

        let meta = PostMetadata {
            date: Some("someday".to_string()),
            ..Default::default()
        };
        assert_eq!(meta.parse_date(), None);
    }
}
