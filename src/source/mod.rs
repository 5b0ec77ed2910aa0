//! Feed source abstraction layer.
//!
//! This module defines the [`FeedSource`] trait and the common [`FeedItem`]
//! type.  Concrete source implementations live in sub-modules (currently only
//! [`rss`]).
//!
//! ## For contributors — adding a new source
//!
//! 1. Create a new file in this directory (e.g. `atom.rs`).
//! 2. Define a struct (e.g. `AtomSource`) and implement [`FeedSource`] for it.
//! 3. Add `mod atom;` below and re-export your struct in the `pub use` block.
//! 4. Construct it in `main.rs` where the configured feeds are turned into
//!    sources.

mod feed_item;
mod rss;

pub use feed_item::{Enclosure, FeedItem};
pub use rss::RssSource;

use anyhow::Result;

/// Trait that every feed source must implement.
///
/// [`fetch()`](FeedSource::fetch) is called once at startup on a blocking
/// worker thread, so implementations may do blocking I/O but must be
/// [`Send`] and [`Sync`].
pub trait FeedSource: Send + Sync {
    /// The configured feed name. Becomes the directory name under
    /// `/podcasts/`.
    fn name(&self) -> &str;

    /// Fetch the feed and return its items in listing order.
    ///
    /// Errors are scoped to this feed: the caller logs them and leaves the
    /// feed out of the namespace.
    fn fetch(&self) -> Result<Vec<FeedItem>>;
}
