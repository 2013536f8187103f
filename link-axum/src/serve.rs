//! Public side: `/` and every stored path.

use axum::{
    body::Body,
    extract::State,
    http::{header, HeaderMap, HeaderValue, StatusCode, Uri},
    response::{IntoResponse, Redirect, Response},
};
use link_blob::{is_gofile_page, BlobError, BlobResult};
use link_core::Link;
use tracing::{debug, warn};

use crate::{LinkAxumError, LinkAxumState};

/// Attachment hosts whose files are streamed back instead of redirected to.
pub const PROXIED_PREFIXES: [&str; 3] = [
    "https://hc-cdn.hel1.your-objectstorage.com/",
    "https://files.catbox.moe",
    "https://litter.catbox.moe",
];

const HOP_BY_HOP: [&str; 8] = [
    "connection",
    "keep-alive",
    "proxy-authenticate",
    "proxy-authorization",
    "te",
    "trailer",
    "transfer-encoding",
    "upgrade",
];

/// `GET /`
pub async fn root(State(state): State<LinkAxumState>) -> Response {
    match state.redirect_url() {
        Some(url) => Redirect::permanent(url).into_response(),
        None => Redirect::to("/dash").into_response(),
    }
}

/// Fallback for every path outside `/api`.
pub async fn serve_link(
    State(state): State<LinkAxumState>,
    uri: Uri,
    headers: HeaderMap,
) -> Result<Response, LinkAxumError> {
    let raw = uri.path().trim_start_matches('/');
    let Ok(path) = urlencoding::decode(raw) else {
        return Ok(not_found());
    };

    let Some(link) = state.store().get(&path).await? else {
        debug!(path = %path, "no link for path");
        return Ok(not_found());
    };

    let disposition = link.disposition();
    let response = match link {
        Link::Redirect { url, .. } => redirect(StatusCode::FOUND, &url),
        Link::InlineFile {
            content_type,
            filename,
            content,
            ..
        } => {
            let mut response = Response::new(Body::from(content));
            set_file_headers(response.headers_mut(), &content_type, disposition, &filename);
            response
        }
        Link::AttachmentFile {
            url,
            content_type,
            filename,
            ..
        } => {
            let fetched = if is_gofile_page(&url) {
                Some(state.gofile().fetch(&url, forwardable(&headers)).await)
            } else if PROXIED_PREFIXES.iter().any(|prefix| url.starts_with(prefix)) {
                Some(proxy(&state, &url, &headers).await)
            } else {
                None
            };

            match fetched {
                Some(Ok(upstream)) if serves_content(upstream.status()) => {
                    let mut response = stream_back(upstream);
                    set_file_headers(response.headers_mut(), &content_type, disposition, &filename);
                    response
                }
                Some(Ok(upstream)) => {
                    warn!(url = %url, status = %upstream.status(), "upstream refused the file, redirecting instead");
                    redirect(StatusCode::TEMPORARY_REDIRECT, &url)
                }
                Some(Err(e)) => {
                    warn!(url = %url, error = %e, "upstream fetch failed, redirecting instead");
                    redirect(StatusCode::TEMPORARY_REDIRECT, &url)
                }
                None => redirect(StatusCode::TEMPORARY_REDIRECT, &url),
            }
        }
    };
    Ok(response)
}

fn not_found() -> Response {
    (StatusCode::NOT_FOUND, "Not Found").into_response()
}

fn redirect(status: StatusCode, url: &str) -> Response {
    match HeaderValue::from_str(url) {
        Ok(location) => (status, [(header::LOCATION, location)]).into_response(),
        Err(_) => (StatusCode::INTERNAL_SERVER_ERROR, "Invalid redirect target").into_response(),
    }
}

fn set_file_headers(
    headers: &mut HeaderMap,
    content_type: &str,
    disposition: Option<&str>,
    filename: &str,
) {
    if let Ok(value) = HeaderValue::from_str(content_type) {
        headers.insert(header::CONTENT_TYPE, value);
    }
    let disposition = format!(
        "{}; filename=\"{}\"",
        disposition.unwrap_or("inline"),
        filename.replace('"', "%22")
    );
    if let Ok(value) = HeaderValue::from_str(&disposition) {
        headers.insert(header::CONTENT_DISPOSITION, value);
    }
}

/// Caller headers minus `Host` and hop-by-hop fields.
fn forwardable(headers: &HeaderMap) -> HeaderMap {
    headers
        .iter()
        .filter(|(name, _)| *name != header::HOST && !HOP_BY_HOP.contains(&name.as_str()))
        .map(|(name, value)| (name.clone(), value.clone()))
        .collect()
}

async fn proxy(state: &LinkAxumState, url: &str, headers: &HeaderMap) -> BlobResult<reqwest::Response> {
    let mut forwarded = forwardable(headers);
    let agent = HeaderValue::from_str(&state.upload_config().user_agent)
        .map_err(|_| BlobError::invalid("user agent is not a valid header value"))?;
    forwarded.insert(header::USER_AGENT, agent);

    Ok(state.client().http().get(url).headers(forwarded).send().await?)
}

/// Replies worth relaying under the link's own file headers.
fn serves_content(status: reqwest::StatusCode) -> bool {
    status.is_success() || status == reqwest::StatusCode::NOT_MODIFIED
}

/// Upstream status, headers (minus hop-by-hop) and a streamed body.
fn stream_back(upstream: reqwest::Response) -> Response {
    let status = StatusCode::from_u16(upstream.status().as_u16()).unwrap_or(StatusCode::BAD_GATEWAY);
    let headers: HeaderMap = upstream
        .headers()
        .iter()
        .filter(|(name, _)| !HOP_BY_HOP.contains(&name.as_str()))
        .map(|(name, value)| (name.clone(), value.clone()))
        .collect();

    let mut response = Response::new(Body::from_stream(upstream.bytes_stream()));
    *response.status_mut() = status;
    *response.headers_mut() = headers;
    response
}
