use std::collections::HashMap;
use std::str::FromStr;

use axum::http::{header, HeaderMap};
use link_core::{FileLocation, Link, LinkError};
use serde::Deserialize;

/// Query string of `POST /api/links/upload`. The body is the raw file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadParams {
    pub path: String,
    pub content_type: String,
    pub filename: String,
    pub location: FileLocation,
    pub download: bool,
}

impl UploadParams {
    pub fn from_query(query: &HashMap<String, String>) -> Result<Self, LinkError> {
        let field = |name: &str| {
            query
                .get(name)
                .filter(|v| !v.is_empty())
                .cloned()
                .ok_or_else(|| LinkError::bad_request(format!("Missing required field: {name}")))
        };

        let path = field("path")?;
        let content_type = field("content-type")?;
        let filename = field("filename")?;
        let location = FileLocation::from_str(&field("location")?)?;
        let download = query.get("download").map(String::as_str) == Some("true");

        Ok(Self {
            path,
            content_type,
            filename,
            location,
            download,
        })
    }

    pub fn inline_link(self, content: bytes::Bytes) -> Link {
        Link::InlineFile {
            path: self.path,
            content_type: self.content_type,
            filename: self.filename,
            download: self.download,
            content,
        }
    }

    pub fn attachment_link(self, url: String) -> Link {
        Link::AttachmentFile {
            path: self.path,
            url,
            content_type: self.content_type,
            filename: self.filename,
            download: self.download,
        }
    }
}

/// Body of `POST /api/links`.
#[derive(Debug, Deserialize)]
pub struct CreateLink {
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub path: Option<String>,
    pub url: Option<String>,
}

impl CreateLink {
    pub fn into_link(self) -> Result<Link, LinkError> {
        match self.kind.as_deref() {
            Some("redirect") => {}
            Some(_) => return Err(LinkError::bad_request("Unsupported link type")),
            None => return Err(LinkError::bad_request("Missing required fields")),
        }
        match (self.path, self.url) {
            (Some(path), Some(url)) if !path.is_empty() && !url.is_empty() => {
                Ok(Link::redirect(path, url))
            }
            _ => Err(LinkError::bad_request("Missing required fields")),
        }
    }
}

/// Declared request body length, if present and numeric.
pub fn content_length(headers: &HeaderMap) -> Option<u64> {
    headers
        .get(header::CONTENT_LENGTH)?
        .to_str()
        .ok()?
        .trim()
        .parse()
        .ok()
}
