//! Per-request dispatch between the streaming proxy and the WebDAV engine.

use std::sync::Arc;

use axum::extract::{Request, State};
use axum::http::{Method, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Router;
use percent_encoding::percent_decode_str;
use tower_http::trace::TraceLayer;
use tracing::debug;

use crate::dav::DavEngine;
use crate::namespace::{EpisodeDescriptor, ROOT};
use crate::proxy::StreamingProxy;
use crate::resolver::EpisodeResolver;

/// Shared application state
pub struct AppState {
    pub resolver: EpisodeResolver,
    pub proxy: StreamingProxy,
    pub dav: DavEngine,
}

/// What to do with one inbound request.
#[derive(Debug, PartialEq, Eq)]
pub enum Route<'a> {
    /// Relay this episode live from its origin.
    Stream(&'a EpisodeDescriptor),
    /// Looks like an episode file but is not one. Answered with 404.
    Missing,
    /// Hand the request to the WebDAV engine untouched.
    Delegate,
}

/// Decide how to answer `method` on the decoded `path`. No I/O.
pub fn classify<'a>(method: &Method, path: &str, resolver: &'a EpisodeResolver) -> Route<'a> {
    if method != Method::GET {
        return Route::Delegate;
    }
    if let Some(episode) = resolver.lookup(path) {
        return Route::Stream(episode);
    }
    if is_episode_shaped(path) {
        Route::Missing
    } else {
        Route::Delegate
    }
}

/// `/podcasts/{feed}/{file}` with both segments non-empty.
fn is_episode_shaped(path: &str) -> bool {
    let Some(rest) = path.strip_prefix(ROOT).and_then(|r| r.strip_prefix('/')) else {
        return false;
    };
    matches!(
        rest.split_once('/'),
        Some((feed, file)) if !feed.is_empty() && !file.is_empty() && !file.contains('/')
    )
}

// ─── Route builder ───────────────────────────────────────────────

pub fn build_router(state: Arc<AppState>) -> Router {
    Router::new()
        .fallback(dispatch)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn dispatch(State(state): State<Arc<AppState>>, req: Request) -> Response {
    let method = req.method().clone();
    let path = percent_decode_str(req.uri().path())
        .decode_utf8_lossy()
        .into_owned();

    match classify(&method, &path, &state.resolver) {
        Route::Stream(episode) => state.proxy.handle(episode).await,
        Route::Missing => {
            debug!(path = %path, "no episode at this path");
            StatusCode::NOT_FOUND.into_response()
        }
        Route::Delegate => state.dav.serve(req).await,
    }
}
