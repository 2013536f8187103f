//! Link records.

use std::fmt;
use std::str::FromStr;

use bytes::Bytes;
use serde::{Deserialize, Serialize};

use crate::errors::LinkError;

/// A stored short-path mapping.
///
/// Serialized with a `type` tag (`redirect`, `inline_file`,
/// `attachment_file`). Inline file content never appears in the
/// serialized form, so listings stay small.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case", rename_all_fields = "camelCase")]
pub enum Link {
    Redirect {
        path: String,
        url: String,
    },
    InlineFile {
        path: String,
        content_type: String,
        filename: String,
        download: bool,
        #[serde(skip)]
        content: Bytes,
    },
    AttachmentFile {
        path: String,
        url: String,
        content_type: String,
        filename: String,
        download: bool,
    },
}

impl Link {
    pub fn redirect(path: impl Into<String>, url: impl Into<String>) -> Self {
        Link::Redirect {
            path: path.into(),
            url: url.into(),
        }
    }

    pub fn path(&self) -> &str {
        match self {
            Link::Redirect { path, .. }
            | Link::InlineFile { path, .. }
            | Link::AttachmentFile { path, .. } => path,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Link::Redirect { .. } => "redirect",
            Link::InlineFile { .. } => "inline_file",
            Link::AttachmentFile { .. } => "attachment_file",
        }
    }

    /// `Content-Disposition` type for file links, `None` for redirects.
    pub fn disposition(&self) -> Option<&'static str> {
        match self {
            Link::Redirect { .. } => None,
            Link::InlineFile { download, .. } | Link::AttachmentFile { download, .. } => {
                Some(if *download { "attachment" } else { "inline" })
            }
        }
    }

    /// Copy without inline content.
    pub fn without_content(&self) -> Self {
        match self {
            Link::InlineFile {
                path,
                content_type,
                filename,
                download,
                ..
            } => Link::InlineFile {
                path: path.clone(),
                content_type: content_type.clone(),
                filename: filename.clone(),
                download: *download,
                content: Bytes::new(),
            },
            other => other.clone(),
        }
    }
}

/// Where an uploaded file ends up.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FileLocation {
    Inline,
    Gofile,
    HcCdn,
    Catbox,
    Litterbox,
}

impl FileLocation {
    pub fn as_str(&self) -> &'static str {
        match self {
            FileLocation::Inline => "inline",
            FileLocation::Gofile => "gofile",
            FileLocation::HcCdn => "hc-cdn",
            FileLocation::Catbox => "catbox",
            FileLocation::Litterbox => "litterbox",
        }
    }
}

impl fmt::Display for FileLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FileLocation {
    type Err = LinkError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "inline" => Ok(FileLocation::Inline),
            "gofile" => Ok(FileLocation::Gofile),
            "hc-cdn" => Ok(FileLocation::HcCdn),
            "catbox" => Ok(FileLocation::Catbox),
            "litterbox" => Ok(FileLocation::Litterbox),
            _ => Err(LinkError::bad_request("Unsupported file location")),
        }
    }
}
