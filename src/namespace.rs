//! Projection of fetched feeds onto a virtual directory tree.
//!
//! ```text
//! /podcasts/
//! └── {feed name}/
//!     ├── 2024-01-02_episode2.mp3
//!     └── 2024-01-01_episode1.mp3
//! ```
//!
//! Episode numbers count up from the end of the feed's item list: with the
//! usual newest-first listing the oldest episode is `episode1` and the newest
//! is `episode{N}`. Names are a pure function of the item's position, the
//! feed length, the publish date and the enclosure URL, so clients can rely
//! on them staying put across restarts.

use std::collections::HashSet;

use anyhow::Result;
use chrono::{DateTime, FixedOffset};
use tracing::{debug, info, warn};

use crate::fetch::FetchedFeed;

/// Root of the episode namespace.
pub const ROOT: &str = "/podcasts";

/// Used when the enclosure URL has no extension in its final path segment.
const FALLBACK_EXTENSION: &str = "bin";

/// Everything needed to serve one virtual episode file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EpisodeDescriptor {
    /// Decoded virtual path, e.g. `/podcasts/Tech/2024-01-01_episode1.mp3`.
    pub virtual_path: String,
    pub remote_url: String,
    /// Media type declared by the feed. May be empty.
    pub media_type: String,
}

/// The directory tree and file entries produced from one startup fetch.
#[derive(Debug, Default)]
pub struct Namespace {
    /// Directory paths, root first, then one per successfully fetched feed.
    pub directories: Vec<String>,
    pub entries: Vec<EpisodeDescriptor>,
}

/// The node store the namespace is registered into.
pub trait NodeStore {
    async fn create_directory(&self, path: &str) -> Result<()>;

    /// Create an empty file. Its real content only exists upstream.
    async fn create_placeholder_file(&self, path: &str) -> Result<()>;
}

pub fn feed_dir(feed_name: &str) -> String {
    format!("{ROOT}/{feed_name}")
}

/// File name for the item at `position` (0-based) of a feed with `total`
/// items.
pub fn episode_file_name(
    position: usize,
    total: usize,
    published: &DateTime<FixedOffset>,
    enclosure_url: &str,
) -> String {
    let extension = match enclosure_url.rsplit_once('.') {
        Some((_, ext)) if !ext.is_empty() && !ext.contains('/') => ext,
        _ => FALLBACK_EXTENSION,
    };
    format!(
        "{}_episode{}.{}",
        published.format("%Y-%m-%d"),
        total - position,
        extension
    )
}

/// Returns `path` if unused, otherwise the first free `stem-N.ext` with
/// `N >= 2`. The chosen path is marked as taken.
fn claim_path(path: String, taken: &mut HashSet<String>) -> String {
    if taken.insert(path.clone()) {
        return path;
    }

    let (stem, ext) = match path.rsplit_once('.') {
        Some((stem, ext)) if !ext.contains('/') => (stem, Some(ext)),
        _ => (path.as_str(), None),
    };
    let mut n = 2;
    loop {
        let candidate = match ext {
            Some(ext) => format!("{stem}-{n}.{ext}"),
            None => format!("{stem}-{n}"),
        };
        if taken.insert(candidate.clone()) {
            warn!(path = %path, renamed = %candidate, "virtual path collision");
            return candidate;
        }
        n += 1;
    }
}

/// Build the namespace from startup fetch results.
///
/// Feeds are matched by their tagged name; a failed feed contributes nothing
/// and cannot affect any other feed's names.
pub fn build(fetched: &[FetchedFeed]) -> Namespace {
    let mut namespace = Namespace {
        directories: vec![ROOT.to_string()],
        entries: Vec::new(),
    };
    let mut taken = HashSet::new();

    for feed in fetched {
        let items = match &feed.outcome {
            Ok(items) => items,
            Err(_) => {
                debug!(feed = %feed.name, "feed not fetched, leaving it out");
                continue;
            }
        };

        let dir = feed_dir(&feed.name);
        if !namespace.directories.contains(&dir) {
            namespace.directories.push(dir.clone());
        }

        let total = items.len();
        for (position, item) in items.iter().enumerate() {
            let Some(enclosure) = item.primary_enclosure() else {
                warn!(feed = %feed.name, position, "item has no enclosure, skipping");
                continue;
            };
            let Some(published) = item.published else {
                warn!(feed = %feed.name, position, url = %enclosure.url, "item has no publish date, skipping");
                continue;
            };

            let file_name = episode_file_name(position, total, &published, &enclosure.url);
            let virtual_path = claim_path(format!("{dir}/{file_name}"), &mut taken);
            debug!(path = %virtual_path, url = %enclosure.url, "mapped episode");

            namespace.entries.push(EpisodeDescriptor {
                virtual_path,
                remote_url: enclosure.url.clone(),
                media_type: enclosure.media_type.clone(),
            });
        }
    }

    info!(
        feeds = namespace.directories.len() - 1,
        episodes = namespace.entries.len(),
        "built namespace"
    );
    namespace
}

impl Namespace {
    /// Create every directory and placeholder file in `store`.
    ///
    /// A node that fails to register is logged and skipped; its descriptor
    /// stays resolvable, so streaming still works for it.
    pub async fn register<S: NodeStore>(&self, store: &S) {
        for dir in &self.directories {
            if let Err(e) = store.create_directory(dir).await {
                warn!(path = %dir, error = %format!("{e:#}"), "failed to create directory");
            }
        }
        for entry in &self.entries {
            if let Err(e) = store.create_placeholder_file(&entry.virtual_path).await {
                warn!(path = %entry.virtual_path, error = %format!("{e:#}"), "failed to create placeholder");
            }
        }
    }
}
