//! RSS feed source implementation.
//!
//! Podcasts publish RSS 2.0 with one `<enclosure>` per item, which maps
//! directly onto [`FeedItem`]. Use this file as a template when adding
//! support for Atom or JSON Feed.

use std::time::Duration;

use anyhow::{Context, Result};
use chrono::{DateTime, FixedOffset};

use super::{Enclosure, FeedItem, FeedSource};

const FETCH_TIMEOUT: Duration = Duration::from_secs(30);

/// An RSS feed data source.
///
/// Fetches and parses an RSS 2.0 feed over HTTP using the [`rss`] crate.
pub struct RssSource {
    /// The feed URL.
    pub url: String,
    /// The configured feed name.
    pub name: String,
}

impl RssSource {
    /// Create a new RSS source.
    ///
    /// # Arguments
    ///
    /// * `url` — full URL of the RSS feed.
    /// * `name` — configured feed name; becomes the directory name.
    pub fn new(url: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            name: name.into(),
        }
    }

    /// Parse an already-fetched [`rss::Channel`] into [`FeedItem`]s.
    ///
    /// This is a pure function (no I/O) so that tests can exercise the
    /// parsing logic without hitting the network. Listing order is kept.
    pub fn parse_channel(channel: &rss::Channel) -> Vec<FeedItem> {
        channel
            .items()
            .iter()
            .map(|item| FeedItem {
                published: item.pub_date().and_then(parse_date),
                enclosures: item
                    .enclosure()
                    .map(|e| Enclosure {
                        url: e.url().to_string(),
                        media_type: e.mime_type().to_string(),
                    })
                    .into_iter()
                    .collect(),
            })
            .collect()
    }
}

/// RSS mandates RFC 2822, but plenty of feeds in the wild emit RFC 3339.
fn parse_date(raw: &str) -> Option<DateTime<FixedOffset>> {
    let raw = raw.trim();
    DateTime::parse_from_rfc2822(raw)
        .or_else(|_| DateTime::parse_from_rfc3339(raw))
        .ok()
}

impl FeedSource for RssSource {
    fn name(&self) -> &str {
        &self.name
    }

    fn fetch(&self) -> Result<Vec<FeedItem>> {
        let client = reqwest::blocking::Client::builder()
            .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
            .timeout(FETCH_TIMEOUT)
            .build()?;
        let body = client
            .get(&self.url)
            .send()
            .and_then(|r| r.error_for_status())
            .with_context(|| format!("requesting {}", self.url))?
            .bytes()?;
        let channel = rss::Channel::read_from(body.as_ref())
            .with_context(|| format!("parsing feed from {}", self.url))?;
        Ok(Self::parse_channel(&channel))
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
