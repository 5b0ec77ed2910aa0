//! Live relay of episode bytes from their origin to the client.
//!
//! Every intercepted read opens a fresh upstream request and forwards the
//! body chunk by chunk as it arrives. Nothing is buffered beyond the chunk in
//! flight and nothing is cached, so a repeat read costs a repeat fetch.
//!
//! Upstream fan-out is bounded by a semaphore. The permit travels inside the
//! response body, so a slot stays taken exactly as long as bytes are being
//! relayed. When the client goes away hyper drops the body, which drops the
//! upstream stream and closes that connection too.

use std::sync::Arc;
use std::time::Duration;

use axum::body::Body;
use axum::http::{header, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use futures::{StreamExt, TryStreamExt};
use thiserror::Error;
use tokio::sync::Semaphore;
use tracing::{debug, warn};

use crate::namespace::EpisodeDescriptor;

const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Error)]
pub enum ProxyError {
    #[error("request to {url} failed: {source}")]
    Upstream {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("{url} answered {status}")]
    Status {
        url: String,
        status: StatusCode,
    },

    #[error("stream limiter is closed")]
    LimiterClosed,
}

impl IntoResponse for ProxyError {
    fn into_response(self) -> Response {
        match self {
            ProxyError::Upstream { .. } | ProxyError::Status { .. } => {
                StatusCode::BAD_GATEWAY.into_response()
            }
            ProxyError::LimiterClosed => StatusCode::SERVICE_UNAVAILABLE.into_response(),
        }
    }
}

pub struct StreamingProxy {
    client: reqwest::Client,
    limiter: Arc<Semaphore>,
}

impl StreamingProxy {
    pub fn new(client: reqwest::Client, max_streams: usize) -> Self {
        Self {
            client,
            limiter: Arc::new(Semaphore::new(max_streams)),
        }
    }

    /// A proxy with an HTTP client suited to long-running media downloads:
    /// bounded connect time, no overall timeout.
    pub fn with_default_client(max_streams: usize) -> reqwest::Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
            .connect_timeout(CONNECT_TIMEOUT)
            .build()?;
        Ok(Self::new(client, max_streams))
    }

    /// Answer a read of `episode` with its live upstream body.
    ///
    /// Failures before the first byte become `502 Bad Gateway` with no body.
    /// A failure after streaming started surfaces as a body error, which
    /// aborts the client connection.
    pub async fn handle(&self, episode: &EpisodeDescriptor) -> Response {
        match self.relay(episode).await {
            Ok(response) => response,
            Err(e) => {
                warn!(path = %episode.virtual_path, error = %e, "upstream fetch failed");
                e.into_response()
            }
        }
    }

    async fn relay(&self, episode: &EpisodeDescriptor) -> Result<Response, ProxyError> {
        let permit = Arc::clone(&self.limiter)
            .acquire_owned()
            .await
            .map_err(|_| ProxyError::LimiterClosed)?;

        let url = &episode.remote_url;
        debug!(path = %episode.virtual_path, url = %url, "streaming episode");
        let upstream = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|source| ProxyError::Upstream {
                url: url.clone(),
                source,
            })?;

        let status = upstream.status();
        if !status.is_success() {
            return Err(ProxyError::Status {
                url: url.clone(),
                status,
            });
        }

        let content_type = upstream
            .headers()
            .get(header::CONTENT_TYPE)
            .cloned()
            .or_else(|| {
                HeaderValue::from_str(&episode.media_type)
                    .ok()
                    .filter(|v| !v.is_empty())
            });
        let content_length = upstream.content_length();

        let path = episode.virtual_path.clone();
        let chunks = upstream
            .bytes_stream()
            .map_err(move |e| {
                warn!(path = %path, error = %e, "upstream broke off mid-stream");
                e
            })
            .map(move |chunk| {
                // Tie the slot to the body's lifetime.
                let _slot = &permit;
                chunk
            });

        let mut response = Response::new(Body::from_stream(chunks));
        let headers = response.headers_mut();
        if let Some(content_type) = content_type {
            headers.insert(header::CONTENT_TYPE, content_type);
        }
        if let Some(len) = content_length {
            headers.insert(header::CONTENT_LENGTH, HeaderValue::from(len));
        }
        Ok(response)
    }
}
