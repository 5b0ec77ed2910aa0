//! One-shot feed fetching at startup.
//!
//! Every configured source is fetched on its own blocking worker, all at
//! once. Results come back tagged with the feed name and in configuration
//! order, so a failure in the middle of the list can never shift later feeds
//! onto the wrong data.
//!
//! There is no refresh: the namespace is built from this single pass.

use std::sync::Arc;

use anyhow::{anyhow, Result};
use tracing::{debug, info, warn};

use crate::source::{FeedItem, FeedSource};

/// The outcome of fetching one configured feed.
#[derive(Debug)]
pub struct FetchedFeed {
    /// The configured feed name this result belongs to.
    pub name: String,
    pub outcome: Result<Vec<FeedItem>>,
}

impl FetchedFeed {
    pub fn ok(name: impl Into<String>, items: Vec<FeedItem>) -> Self {
        Self {
            name: name.into(),
            outcome: Ok(items),
        }
    }

    pub fn failed(name: impl Into<String>, cause: anyhow::Error) -> Self {
        Self {
            name: name.into(),
            outcome: Err(cause),
        }
    }
}

/// Fetch all sources concurrently.
///
/// Never fails as a whole: each feed's error is logged and carried in its
/// own [`FetchedFeed`].
pub async fn fetch_all(sources: Vec<Arc<dyn FeedSource>>) -> Vec<FetchedFeed> {
    let handles: Vec<_> = sources
        .into_iter()
        .map(|src| {
            let name = src.name().to_string();
            debug!(feed = %name, "fetching feed");
            (name, tokio::task::spawn_blocking(move || src.fetch()))
        })
        .collect();

    let mut fetched = Vec::with_capacity(handles.len());
    for (name, handle) in handles {
        let outcome = match handle.await {
            Ok(result) => result,
            Err(join_err) => Err(anyhow!("fetch task aborted: {join_err}")),
        };
        fetched.push(match outcome {
            Ok(items) => {
                debug!(feed = %name, items = items.len(), "fetched feed");
                FetchedFeed::ok(name, items)
            }
            Err(e) => {
                warn!(feed = %name, error = %format!("{e:#}"), "failed to fetch feed");
                FetchedFeed::failed(name, e)
            }
        });
    }

    let loaded = fetched.iter().filter(|f| f.outcome.is_ok()).count();
    info!(feeds = loaded, configured = fetched.len(), "loaded podcast feeds");
    fetched
}
