//! Listing requests, responses and the pagination window

use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use thiserror::Error;

lazy_static! {
    static ref LEADING_INTEGER: Regex = Regex::new(r"^([+-]?)([0-9]+)").unwrap();
}

/// Default page number when none (or one without digits) is given
pub const DEFAULT_PAGE: u64 = 1;
/// Default page size when none (or one without digits) is given
pub const DEFAULT_LIMIT: u64 = 3;

/// Errors from a listing call
#[derive(Debug, Error)]
pub enum ListingError {
    #[error("page must be at least 1, got {0}")]
    InvalidPage(i64),

    #[error("limit must be at least 1, got {0}")]
    InvalidLimit(i64),

    #[error("failed to read posts directory {path:?}: {source}")]
    Directory {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to read post {path:?}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl ListingError {
    /// Whether the error was caused by the request rather than the server
    pub fn is_client_error(&self) -> bool {
        matches!(self, Self::InvalidPage(_) | Self::InvalidLimit(_))
    }
}

/// Post language, selecting which directory posts are listed from
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    #[default]
    En,
    Es,
}

impl Language {
    /// Parse a language selector; anything unrecognised is the default language
    pub fn parse(code: &str) -> Self {
        match code {
            "es" => Language::Es,
            _ => Language::En,
        }
    }

    /// Language code used on the wire
    pub fn code(&self) -> &'static str {
        match self {
            Language::En => "en",
            Language::Es => "es",
        }
    }

    /// Subdirectory of the posts directory holding this language's posts
    pub fn subdir(&self) -> Option<&'static str> {
        match self {
            Language::En => None,
            Language::Es => Some("es"),
        }
    }
}

/// One page request against the listing service
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ListingRequest {
    pub language: Language,
    /// 1-based page number
    pub page: u64,
    /// Page size
    pub limit: u64,
}

impl Default for ListingRequest {
    fn default() -> Self {
        Self {
            language: Language::En,
            page: DEFAULT_PAGE,
            limit: DEFAULT_LIMIT,
        }
    }
}

impl ListingRequest {
    pub fn new(language: Language, page: u64, limit: u64) -> Self {
        Self {
            language,
            page,
            limit,
        }
    }

    /// Build a request from raw query values.
    ///
    /// `page`/`limit` are read from their leading integer, so `"2abc"` is 2
    /// and `"5.5"` is 5. Values without leading digits fall back to the
    /// defaults, values below 1 are rejected and values past `u64::MAX`
    /// saturate.
    pub fn from_query(
        page: Option<&str>,
        limit: Option<&str>,
        lang: Option<&str>,
    ) -> Result<Self, ListingError> {
        let language = lang.map(Language::parse).unwrap_or_default();

        let page = match parse_number(page) {
            None => DEFAULT_PAGE,
            Some(QueryNumber::Positive(n)) => n,
            Some(QueryNumber::NotPositive(n)) => return Err(ListingError::InvalidPage(n)),
        };
        let limit = match parse_number(limit) {
            None => DEFAULT_LIMIT,
            Some(QueryNumber::Positive(n)) => n,
            Some(QueryNumber::NotPositive(n)) => return Err(ListingError::InvalidLimit(n)),
        };

        Ok(Self::new(language, page, limit))
    }

    /// Half-open window of the sorted post list covered by this request
    pub fn window(&self) -> PageWindow {
        PageWindow::new(self.page, self.limit)
    }
}

/// Leading integer of a query value, saturated to the type it lands in
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum QueryNumber {
    Positive(u64),
    NotPositive(i64),
}

fn parse_number(value: Option<&str>) -> Option<QueryNumber> {
    let caps = LEADING_INTEGER.captures(value?.trim())?;
    // Only ASCII digits matched, so parsing fails on overflow alone
    let magnitude = caps[2].parse::<u64>().unwrap_or(u64::MAX);

    if magnitude == 0 {
        Some(QueryNumber::NotPositive(0))
    } else if &caps[1] == "-" {
        let n = i64::try_from(magnitude).map_or(i64::MIN, |m| -m);
        Some(QueryNumber::NotPositive(n))
    } else {
        Some(QueryNumber::Positive(magnitude))
    }
}

/// Half-open index range `[start, end)` of one page
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageWindow {
    pub start: u64,
    pub end: u64,
}

impl PageWindow {
    /// Window for a 1-based page of `limit` items
    pub fn new(page: u64, limit: u64) -> Self {
        let start = page.saturating_sub(1).saturating_mul(limit);
        let end = start.saturating_add(limit);
        Self { start, end }
    }

    /// Index range of the window clamped to a list of `total` items
    pub fn range(&self, total: usize) -> std::ops::Range<usize> {
        let total = total as u64;
        let start = self.start.min(total);
        let end = self.end.min(total);
        start as usize..end as usize
    }

    /// Whether items remain after this window
    pub fn has_more(&self, total: usize) -> bool {
        self.end < total as u64
    }
}

/// One page of posts, as returned by the listing endpoint
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListingResponse {
    /// Raw content of each post on the page, newest first
    pub posts: Vec<String>,
    /// Number of posts across all pages
    pub total: usize,
    /// Whether pages remain after this one
    pub has_more: bool,
}
