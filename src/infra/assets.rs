//! Embedded frontend bundle serving.
//!
//! The production build embeds the compiled frontend under `static/` and
//! serves it from memory. Unknown paths fall back to `index.html` so
//! client-side routing keeps working after a hard refresh.

use axum::{
    body::Body,
    http::{HeaderValue, StatusCode, header},
    response::{IntoResponse, Response},
};
use bytes::Bytes;
use include_dir::{Dir, include_dir};
use mime_guess::Mime;

static FRONTEND_ASSETS: Dir<'_> = include_dir!("$CARGO_MANIFEST_DIR/static");

const INDEX_HTML: &str = "index.html";

/// Serve an embedded asset by request path, falling back to `index.html`
/// for anything that does not resolve to a bundled file.
pub fn serve(path: &str) -> Response {
    let candidate = path.trim_start_matches('/');

    if candidate.contains("..") {
        // No directory traversal, even though the bundle is read-only.
        return StatusCode::NOT_FOUND.into_response();
    }

    if let Some(asset) = resolve(candidate) {
        return asset.into_response();
    }

    match resolve(INDEX_HTML) {
        Some(index) => index.into_response(),
        None => StatusCode::NOT_FOUND.into_response(),
    }
}

struct Asset {
    contents: &'static [u8],
    mime: Mime,
}

fn resolve(candidate: &str) -> Option<Asset> {
    if candidate.is_empty() || candidate.ends_with('/') {
        return None;
    }
    let file = FRONTEND_ASSETS.get_file(candidate)?;
    Some(Asset {
        contents: file.contents(),
        mime: mime_guess::from_path(candidate).first_or_octet_stream(),
    })
}

impl IntoResponse for Asset {
    fn into_response(self) -> Response {
        let len = self.contents.len();
        let mut response = Response::new(Body::from(Bytes::from_static(self.contents)));
        *response.status_mut() = StatusCode::OK;

        let headers = response.headers_mut();
        if let Ok(value) = HeaderValue::from_str(self.mime.as_ref()) {
            headers.insert(header::CONTENT_TYPE, value);
        }
        if let Ok(value) = HeaderValue::from_str(&len.to_string()) {
            headers.insert(header::CONTENT_LENGTH, value);
        }
        response
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn traversal_is_rejected() {
        let response = serve("/../Cargo.toml");
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn unknown_path_falls_back_to_index() {
        let response = serve("/profile/somebody");
        assert_eq!(response.status(), StatusCode::OK);
        let content_type = response
            .headers()
            .get(header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default()
            .to_string();
        assert!(content_type.starts_with("text/html"));
    }
}
