//! The data types every feed source produces.
//!
//! A source converts its native format into [`FeedItem`]s so the namespace
//! builder never needs to know which feed format an episode came from.

use chrono::{DateTime, FixedOffset};

/// A remote media resource attached to a feed item.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct Enclosure {
    /// Absolute URL of the media file at its origin.
    pub url: String,
    /// Declared MIME type, e.g. `audio/mpeg`. May be empty.
    pub media_type: String,
}

/// A single feed entry, normalised from any data source.
///
/// Items are kept in the order the feed lists them; episode numbering depends
/// on that order, so sources must not re-sort.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct FeedItem {
    /// Publication timestamp, with the offset it was published under.
    ///
    /// The offset is preserved so that the calendar date used in file names
    /// is the one written in the feed, not the UTC date.
    pub published: Option<DateTime<FixedOffset>>,

    /// Attached media. Only the first enclosure is ever served.
    pub enclosures: Vec<Enclosure>,
}

impl FeedItem {
    /// The enclosure that backs this item's virtual file, if any.
    pub fn primary_enclosure(&self) -> Option<&Enclosure> {
        self.enclosures.first()
    }
}
