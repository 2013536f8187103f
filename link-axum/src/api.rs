//! Admin API under `/api`.

use std::collections::HashMap;
use std::io;

use axum::{
    body::Body,
    extract::{rejection::JsonRejection, Query, State},
    http::{HeaderMap, StatusCode},
    response::IntoResponse,
    Json,
};
use futures::TryStreamExt;
use http_body_util::LengthLimitError;
use link_blob::{ByteSource, ByteStream};
use link_core::{FileLocation, Link, LinkError};
use serde_json::json;
use tracing::info;

use crate::params::{content_length, CreateLink, UploadParams};
use crate::{LinkAxumError, LinkAxumState};

const CREATED: &str = "Link created successfully";
const DELETED: &str = "Link deleted successfully";

fn map_json_rejection(rejection: JsonRejection) -> LinkAxumError {
    LinkError::bad_request("Failed to parse the request body as JSON")
        .with_errors(json!({"_schema": [rejection.to_string()]}))
        .into()
}

/// `GET /api/links`
pub async fn list_links(State(state): State<LinkAxumState>) -> Result<Json<Vec<Link>>, LinkAxumError> {
    Ok(Json(state.store().list().await?))
}

/// `POST /api/links`
pub async fn create_link(
    State(state): State<LinkAxumState>,
    data: Result<Json<CreateLink>, JsonRejection>,
) -> Result<impl IntoResponse, LinkAxumError> {
    let Json(data) = data.map_err(map_json_rejection)?;
    let link = data.into_link()?;

    info!(path = link.path(), kind = link.kind(), "creating link");
    state.store().insert(link).await?;
    Ok((StatusCode::CREATED, CREATED))
}

/// `DELETE /api/links?path=...`
pub async fn delete_link(
    State(state): State<LinkAxumState>,
    Query(query): Query<HashMap<String, String>>,
) -> Result<impl IntoResponse, LinkAxumError> {
    let path = query
        .get("path")
        .filter(|p| !p.is_empty())
        .ok_or_else(|| LinkError::bad_request("Path parameter is required"))?;

    state.store().delete(path).await?;
    info!(path = %path, "deleted link");
    Ok((StatusCode::OK, DELETED))
}

/// `POST /api/links/upload?path&content-type&filename&location[&download=true]`
///
/// Inline files are buffered up to the configured limit. Every other
/// location streams the body straight through to the host, so the request
/// must declare its length.
pub async fn upload_link(
    State(state): State<LinkAxumState>,
    Query(query): Query<HashMap<String, String>>,
    headers: HeaderMap,
    body: Body,
) -> Result<impl IntoResponse, LinkAxumError> {
    let params = UploadParams::from_query(&query)?;
    let declared = content_length(&headers);

    let link = match params.location {
        FileLocation::Inline => {
            let limit = state.upload_config().inline_max_bytes;
            if declared.is_some_and(|len| len > limit) {
                return Err(too_large(limit).into());
            }
            let content = axum::body::to_bytes(body, usize::try_from(limit).unwrap_or(usize::MAX))
                .await
                .map_err(|e| read_error(e, limit))?;
            params.inline_link(content)
        }
        location => {
            let length = declared
                .ok_or_else(|| LinkError::length_required("Content-Length header is required"))?;
            let target = state.target(location).ok_or_else(|| {
                LinkError::not_implemented(format!("No upload target for {location}"))
            })?;

            let stream: ByteStream = Box::pin(body.into_data_stream().map_err(io::Error::other));
            info!(location = %location, length, filename = %params.filename, "uploading file");
            let url = target.upload(ByteSource::stream(stream, length), &params.filename).await?;
            info!(location = %location, url = %url, "upload finished");
            params.attachment_link(url)
        }
    };

    info!(path = link.path(), kind = link.kind(), "creating link");
    state.store().insert(link).await?;
    Ok((StatusCode::CREATED, CREATED))
}

/// Unknown routes under `/api`.
pub async fn not_found() -> impl IntoResponse {
    (StatusCode::NOT_FOUND, "Not Found")
}

fn too_large(limit: u64) -> LinkError {
    LinkError::payload_too_large(format!("Inline files are limited to {limit} bytes"))
}

fn read_error(e: axum::Error, limit: u64) -> LinkError {
    let inner = e.into_inner();
    if inner.downcast_ref::<LengthLimitError>().is_some() {
        too_large(limit)
    } else {
        LinkError::bad_request(format!("Failed to read request body: {inner}"))
    }
}
