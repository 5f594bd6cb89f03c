//! Client side of the listing endpoint: a feed that grows as the reader scrolls

pub mod embed;
mod feed;
mod source;

pub use embed::{EmbedGuard, HeadlessHost, ScriptHost};
pub use feed::{LoadOutcome, PostFeed, ScrollPosition, SkipReason};
pub use source::{HttpPostSource, LocalPostSource, PostSource};
