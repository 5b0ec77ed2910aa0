//! podcast-dav — podcast feeds as a WebDAV share.
//!
//! ## Architecture overview
//!
//! ```text
//!  config ──► fetch.rs ──► namespace.rs ──┬──► dav.rs      (directories + empty files)
//!            (once, at     (virtual tree) └──► resolver.rs (path → remote episode)
//!             startup)
//!
//!  request ──► router.rs ──┬── GET episode ──► proxy.rs ──► origin (live relay)
//!                          ├── GET unknown ──► 404
//!                          └── anything else ──► dav.rs
//! ```
//!
//! * **`config`** — YAML configuration: feeds, listen address, stream limit.
//! * **`source/`** — the `FeedSource` trait and the RSS implementation.
//! * **`fetch`** — fetches every configured feed once, results tagged by name.
//! * **`namespace`** — turns fetched feeds into directories and episode files.
//! * **`resolver`** — immutable lookup from virtual path to remote episode.
//! * **`proxy`** — streams episode bytes from the origin to the client.
//! * **`dav`** — the WebDAV engine over an in-memory filesystem.
//! * **`router`** — decides per request between proxy, 404 and WebDAV.
//! * **`main`** — parses args, sets up logging and wires everything together.

mod config;
mod dav;
mod fetch;
mod namespace;
mod proxy;
mod resolver;
mod router;
mod source;
#[cfg(test)]
mod test_support;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tokio::net::TcpListener;
use tracing::{debug, info, warn};
use tracing_subscriber::{fmt, EnvFilter};

use config::Config;
use dav::DavEngine;
use proxy::StreamingProxy;
use resolver::EpisodeResolver;
use router::AppState;
use source::{FeedSource, RssSource};

/// Serve podcast feeds as a WebDAV share.
#[derive(Parser, Debug)]
#[command(name = "podcast-dav", version)]
struct Args {
    /// The main config file containing the feeds
    #[arg(long, default_value = config::DEFAULT_CONFIG_FILE)]
    config: PathBuf,

    /// Enables more debug information
    #[arg(long)]
    verbose: bool,
}

fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "failed to listen for ctrl-c");
        std::future::pending::<()>().await;
    }
    info!("shutting down");
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(args.verbose);

    // -- configuration (fatal on error) ----------------------------------------
    let config = Config::load(&args.config)
        .with_context(|| format!("loading {}", args.config.display()))?;
    debug!(config = ?config, file = %args.config.display(), "parsed configuration file");

    // -- fetch feeds once and project them -------------------------------------
    let sources: Vec<Arc<dyn FeedSource>> = config
        .feeds
        .iter()
        .map(|feed| Arc::new(RssSource::new(&feed.url, &feed.name)) as Arc<dyn FeedSource>)
        .collect();
    let fetched = fetch::fetch_all(sources).await;
    let tree = namespace::build(&fetched);

    let dav = DavEngine::in_memory();
    tree.register(&dav).await;

    let state = Arc::new(AppState {
        resolver: EpisodeResolver::new(tree.entries),
        proxy: StreamingProxy::with_default_client(config.max_streams)
            .context("building upstream HTTP client")?,
        dav,
    });

    if state.resolver.is_empty() {
        warn!("no episodes to serve, check the configured feeds");
    }

    // -- serve -----------------------------------------------------------------
    let listener = TcpListener::bind(config.listen)
        .await
        .with_context(|| format!("binding {}", config.listen))?;
    info!(
        app = %config.app_name,
        addr = %config.listen,
        episodes = state.resolver.len(),
        max_streams = config.max_streams,
        "WebDAV server listening"
    );

    axum::serve(listener, router::build_router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn args_default_to_conventional_config() {
        let args = Args::try_parse_from(["podcast-dav"]).unwrap();
        assert_eq!(args.config, PathBuf::from("podcast2rygel.yaml"));
        assert!(!args.verbose);
    }

    #[test]
    fn args_accept_config_and_verbose() {
        let args =
            Args::try_parse_from(["podcast-dav", "--config", "/etc/feeds.yaml", "--verbose"]).unwrap();
        assert_eq!(args.config, PathBuf::from("/etc/feeds.yaml"));
        assert!(args.verbose);
    }

    #[test]
    fn args_reject_unknown_flags() {
        assert!(Args::try_parse_from(["podcast-dav", "--port", "9000"]).is_err());
    }
}
