//! Post loader - lists and pages posts from the posts directory

use lazy_static::lazy_static;
use regex::Regex;
use std::cmp::Reverse;
use std::ffi::OsString;
use std::fs;
use std::path::{Path, PathBuf};

use super::listing::{ListingError, ListingRequest, ListingResponse};
use super::Language;

lazy_static! {
    static ref POST_ID: Regex = Regex::new(r"\d+").unwrap();
}

/// Loads pages of posts from a posts directory
#[derive(Debug, Clone)]
pub struct PostLoader {
    posts_dir: PathBuf,
}

impl PostLoader {
    /// Create a new loader rooted at the default-language posts directory
    pub fn new<P: AsRef<Path>>(posts_dir: P) -> Self {
        Self {
            posts_dir: posts_dir.as_ref().to_path_buf(),
        }
    }

    /// Directory holding the posts of a language
    pub fn language_dir(&self, language: Language) -> PathBuf {
        match language.subdir() {
            Some(subdir) => self.posts_dir.join(subdir),
            None => self.posts_dir.clone(),
        }
    }

    /// List one page of posts, newest first
    pub fn list(&self, request: &ListingRequest) -> Result<ListingResponse, ListingError> {
        let dir = self.language_dir(request.language);
        let filenames = sorted_filenames(&dir)?;
        let total = filenames.len();

        let window = request.window();
        let mut posts = Vec::new();
        for filename in &filenames[window.range(total)] {
            let path = dir.join(filename);
            let content = fs::read_to_string(&path)
                .map_err(|source| ListingError::Read { path, source })?;
            posts.push(content);
        }

        tracing::debug!(
            "Listed page {} of {:?} ({} of {} posts)",
            request.page,
            dir,
            posts.len(),
            total
        );

        Ok(ListingResponse {
            posts,
            total,
            has_more: window.has_more(total),
        })
    }
}

/// Markdown file names in `dir`, sorted by post id descending
///
/// Names that are not valid UTF-8 are kept; their id and order come from
/// the lossy form of the name.
pub fn sorted_filenames(dir: &Path) -> Result<Vec<OsString>, ListingError> {
    let directory_error = |source| ListingError::Directory {
        path: dir.to_path_buf(),
        source,
    };

    let mut entries: Vec<(String, OsString)> = Vec::new();
    for entry in fs::read_dir(dir).map_err(directory_error)? {
        let entry = entry.map_err(directory_error)?;
        let file_name = entry.file_name();
        let name = file_name.to_string_lossy().into_owned();
        if is_markdown_file(&name) {
            entries.push((name, file_name));
        }
    }

    // Name order first so equal ids keep a platform-independent order
    entries.sort();
    entries.sort_by_key(|(name, _)| Reverse(post_id(name)));

    Ok(entries.into_iter().map(|(_, file_name)| file_name).collect())
}

/// Numeric post id: the first run of digits in the file name, or 0
pub fn post_id(filename: &str) -> u64 {
    POST_ID
        .find(filename)
        .map(|m| m.as_str().parse().unwrap_or(u64::MAX))
        .unwrap_or(0)
}

/// Check if a file name is a markdown post
fn is_markdown_file(name: &str) -> bool {
    name.ends_with(".md")
}
