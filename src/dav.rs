//! The WebDAV protocol engine.
//!
//! Listing, property queries, locking and reads of anything that is not a
//! live episode are all answered by [`dav_server`] over an in-memory
//! filesystem. The namespace is registered into that filesystem through the
//! protocol itself (`MKCOL` and empty `PUT`), so the engine stays a black box.

use anyhow::{bail, Result};
use axum::body::Body;
use axum::http::{Method, Request};
use axum::response::Response;
use dav_server::memfs::MemFs;
use dav_server::memls::MemLs;
use dav_server::DavHandler;
use percent_encoding::{utf8_percent_encode, AsciiSet, CONTROLS};

use crate::namespace::NodeStore;

/// Characters escaped inside a single path segment.
const SEGMENT: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'#')
    .add(b'%')
    .add(b'/')
    .add(b'<')
    .add(b'>')
    .add(b'?')
    .add(b'[')
    .add(b'\\')
    .add(b']')
    .add(b'^')
    .add(b'`')
    .add(b'{')
    .add(b'|')
    .add(b'}');

/// Percent-encode a decoded absolute path, segment by segment.
pub fn encode_path(path: &str) -> String {
    path.split('/')
        .map(|segment| utf8_percent_encode(segment, SEGMENT).to_string())
        .collect::<Vec<_>>()
        .join("/")
}

#[derive(Clone)]
pub struct DavEngine {
    handler: DavHandler,
}

impl DavEngine {
    pub fn in_memory() -> Self {
        let handler = DavHandler::builder()
            .filesystem(MemFs::new())
            .locksystem(MemLs::new())
            .build_handler();
        Self { handler }
    }

    /// Answer any WebDAV request.
    pub async fn serve(&self, req: Request<Body>) -> Response {
        self.handler.handle(req).await.map(Body::new)
    }

    async fn issue(&self, method: Method, path: &str) -> Result<()> {
        let req = Request::builder()
            .method(method.clone())
            .uri(encode_path(path))
            .body(Body::empty())?;
        let status = self.serve(req).await.status();
        if !status.is_success() {
            bail!("{method} {path} answered {status}");
        }
        Ok(())
    }
}

impl NodeStore for DavEngine {
    async fn create_directory(&self, path: &str) -> Result<()> {
        self.issue(Method::from_bytes(b"MKCOL")?, path).await
    }

    async fn create_placeholder_file(&self, path: &str) -> Result<()> {
        self.issue(Method::PUT, path).await
    }
}
