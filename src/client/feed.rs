//! Post feed: accumulates pages from a [`PostSource`] as the reader scrolls

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use super::embed::{EmbedGuard, ScriptHost};
use super::source::PostSource;
use crate::config::FeedConfig;
use crate::content::render::INSTAGRAM_EMBED_SCRIPT;
use crate::content::{Language, ListingRequest, PostMetadata};

/// Why a load request did not fetch anything
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// Another fetch is still in flight
    InFlight,
    /// The last page has already been loaded
    Exhausted,
    /// The viewport is not close enough to the bottom
    NotNearBottom,
}

/// Result of one load request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadOutcome {
    Loaded { count: usize },
    Skipped(SkipReason),
    Failed,
}

/// Viewport geometry at the time of a scroll event
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScrollPosition {
    /// Height of the visible viewport
    pub inner_height: f64,
    /// Distance scrolled from the top
    pub scroll_top: f64,
    /// Height of the rendered content
    pub offset_height: f64,
}

impl ScrollPosition {
    /// Whether the bottom of the viewport is within `threshold` of the content's end
    pub fn near_bottom(&self, threshold: f64) -> bool {
        self.inner_height + self.scroll_top >= self.offset_height - threshold
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    Idle,
    Fetching,
}

struct FeedState {
    posts: Vec<String>,
    next_page: u64,
    has_more: bool,
    phase: Phase,
    embed: Option<EmbedGuard>,
}

/// Clears the fetching phase when dropped
struct InFlight<'a> {
    state: &'a Mutex<FeedState>,
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        lock(self.state).phase = Phase::Idle;
    }
}

fn lock(state: &Mutex<FeedState>) -> MutexGuard<'_, FeedState> {
    state.lock().unwrap_or_else(PoisonError::into_inner)
}

/// An append-only, paginated view of the posts behind a [`PostSource`].
///
/// At most one fetch is in flight at a time, whatever triggered it, so pages
/// are appended in increasing page order.
pub struct PostFeed<S> {
    source: S,
    language: Language,
    limit: u64,
    scroll_threshold: f64,
    embed_poll: Duration,
    script_host: Option<Arc<dyn ScriptHost>>,
    state: Mutex<FeedState>,
}

impl<S: PostSource> PostFeed<S> {
    pub fn new(source: S, language: Language, limit: u64, config: &FeedConfig) -> Self {
        Self {
            source,
            language,
            limit,
            scroll_threshold: config.scroll_threshold,
            embed_poll: Duration::from_millis(config.embed_poll_ms),
            script_host: None,
            state: Mutex::new(FeedState {
                posts: Vec::new(),
                next_page: 1,
                has_more: true,
                phase: Phase::Idle,
                embed: None,
            }),
        }
    }

    /// Load the Instagram embed script into `host` once a post needs it
    pub fn with_script_host(mut self, host: Arc<dyn ScriptHost>) -> Self {
        self.script_host = Some(host);
        self
    }

    /// Initial load when the feed is first shown
    pub async fn mount(&self) -> LoadOutcome {
        self.load_more().await
    }

    /// Release the embed script
    pub fn unmount(&self) {
        let embed = lock(&self.state).embed.take();
        drop(embed);
    }

    /// Scroll event; loads the next page when close to the bottom
    pub async fn on_scroll(&self, position: ScrollPosition) -> LoadOutcome {
        if !position.near_bottom(self.scroll_threshold) {
            return LoadOutcome::Skipped(SkipReason::NotNearBottom);
        }
        self.load_more().await
    }

    /// Fetch and append the next page, unless a fetch is in flight or
    /// there are no pages left
    pub async fn load_more(&self) -> LoadOutcome {
        let (page, _in_flight) = {
            let mut state = lock(&self.state);
            if state.phase == Phase::Fetching {
                return LoadOutcome::Skipped(SkipReason::InFlight);
            }
            if !state.has_more {
                return LoadOutcome::Skipped(SkipReason::Exhausted);
            }
            state.phase = Phase::Fetching;
            (state.next_page, InFlight { state: &self.state })
        };

        let request = ListingRequest::new(self.language, page, self.limit);
        match self.source.fetch_page(&request).await {
            Ok(response) => {
                let count = response.posts.len();
                let mut state = lock(&self.state);
                let needs_embed = response
                    .posts
                    .iter()
                    .any(|raw| PostMetadata::parse(raw).0.has_instagram());
                state.posts.extend(response.posts);
                state.has_more = response.has_more;
                state.next_page += 1;
                if needs_embed {
                    self.ensure_embed(&mut state);
                }
                tracing::debug!(
                    "Loaded page {} ({} posts, {} total)",
                    page,
                    count,
                    state.posts.len()
                );
                LoadOutcome::Loaded { count }
            }
            Err(e) => {
                tracing::error!("Error loading posts: {:#}", e);
                LoadOutcome::Failed
            }
        }
    }

    fn ensure_embed(&self, state: &mut FeedState) {
        if state.embed.is_some() {
            return;
        }
        if let Some(host) = &self.script_host {
            state.embed = Some(EmbedGuard::acquire(
                Arc::clone(host),
                INSTAGRAM_EMBED_SCRIPT,
                self.embed_poll,
            ));
        }
    }

    /// Raw content of every post loaded so far, in load order
    pub fn posts(&self) -> Vec<String> {
        lock(&self.state).posts.clone()
    }

    pub fn len(&self) -> usize {
        lock(&self.state).posts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn has_more(&self) -> bool {
        lock(&self.state).has_more
    }

    /// Page number the next fetch will request
    pub fn next_page(&self) -> u64 {
        lock(&self.state).next_page
    }

    pub fn is_fetching(&self) -> bool {
        lock(&self.state).phase == Phase::Fetching
    }

    /// Whether the embed script is currently loaded
    pub fn has_embed(&self) -> bool {
        lock(&self.state).embed.is_some()
    }
}
