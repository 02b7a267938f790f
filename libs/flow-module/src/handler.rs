//! HTTP delegation into the nested engine.

use std::sync::Arc;

use axum::Router;
use axum::extract::Request;
use axum::http::{StatusCode, Uri, uri::PathAndQuery};
use axum::response::{IntoResponse, Response};
use tower::ServiceExt;

use crate::engine::Engine;

/// Builds the module router: engine API at the root, `/{id}/...` delegated to
/// the engine's component handler with the full logical path restored.
///
/// Delegation is the fallback, so the engine's own routes win and may use any
/// pattern. A fallback set by the engine itself is replaced.
pub(crate) fn component_router<E: Engine>(engine: Arc<E>, path_prefix: &str) -> Router {
    let delegate = Delegate {
        engine: Arc::clone(&engine),
        path_prefix: Arc::from(path_prefix),
    };

    engine.api_router().fallback(move |req: Request| {
        let d = delegate.clone();
        async move { d.forward(req).await }
    })
}

/// True for `/{id}/` followed by anything, with a non-empty `id`.
fn is_component_path(path: &str) -> bool {
    path.strip_prefix('/')
        .and_then(|p| p.split_once('/'))
        .is_some_and(|(id, _)| !id.is_empty())
}

struct Delegate<E> {
    engine: Arc<E>,
    path_prefix: Arc<str>,
}

impl<E> Clone for Delegate<E> {
    fn clone(&self) -> Self {
        Self {
            engine: Arc::clone(&self.engine),
            path_prefix: Arc::clone(&self.path_prefix),
        }
    }
}

impl<E: Engine> Delegate<E> {
    async fn forward(self, mut req: Request) -> Response {
        // Nested handlers are mount-agnostic and expect the full path, not the
        // remainder left after this router's own prefix was stripped.
        if !is_component_path(req.uri().path()) {
            return StatusCode::NOT_FOUND.into_response();
        }
        // The remainder is cleaned on its own so `..` cannot climb into the prefix.
        let remainder = clean_path(req.uri().path());
        let full_path = join_path(&self.path_prefix, &remainder);
        match rewrite_path(req.uri(), &full_path) {
            Ok(uri) => *req.uri_mut() = uri,
            Err(e) => {
                tracing::warn!(path = %full_path, error = %e, "cannot rebuild request path");
                return StatusCode::BAD_REQUEST.into_response();
            }
        }

        tracing::trace!(path = %full_path, "forwarding request to nested component handler");
        self.engine
            .component_handler()
            .oneshot(req)
            .await
            .unwrap_or_else(|never| match never {})
    }
}

fn rewrite_path(uri: &Uri, path: &str) -> Result<Uri, http::Error> {
    let path_and_query = match uri.query() {
        Some(q) => format!("{path}?{q}"),
        None => path.to_owned(),
    };
    let mut parts = uri.clone().into_parts();
    parts.path_and_query = Some(PathAndQuery::try_from(path_and_query)?);
    Ok(Uri::from_parts(parts)?)
}

/// Joins URL path elements and cleans the result lexically.
///
/// Empty elements are ignored, repeated slashes collapse, `.` and `..` are
/// resolved and trailing slashes are removed. A rooted result never climbs
/// above `/`. Joining only empty elements yields an empty string.
///
/// ```
/// use flow_module::join_path;
///
/// assert_eq!(join_path("/api/v0/component/outer/", "/child/foo"), "/api/v0/component/outer/child/foo");
/// assert_eq!(join_path("", "/child/"), "/child");
/// ```
#[must_use]
pub fn join_path(prefix: &str, path: &str) -> String {
    let joined = [prefix, path]
        .iter()
        .filter(|p| !p.is_empty())
        .copied()
        .collect::<Vec<_>>()
        .join("/");
    if joined.is_empty() {
        return joined;
    }
    clean_path(&joined)
}

fn clean_path(path: &str) -> String {
    let rooted = path.starts_with('/');
    let mut segments: Vec<&str> = Vec::new();

    for segment in path.split('/') {
        match segment {
            "" | "." => {}
            ".." => match segments.last() {
                Some(&last) if last != ".." => {
                    segments.pop();
                }
                _ if !rooted => segments.push(".."),
                _ => {}
            },
            s => segments.push(s),
        }
    }

    let body = segments.join("/");
    match (rooted, body.is_empty()) {
        (true, _) => format!("/{body}"),
        (false, true) => ".".to_owned(),
        (false, false) => body,
    }
}
