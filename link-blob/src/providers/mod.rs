//! Third-party file hosts.
//!
//! Each host is an [`UploadTarget`]: hand it a file source and a name, get
//! back the public URL. Bodies are always streamed with an exact
//! `Content-Length`.

mod catbox;
mod gofile;
mod hc_cdn;

pub use catbox::{Catbox, Litterbox, CATBOX_API, LITTERBOX_API};
pub use gofile::{is_gofile_page, Gofile, GofileDownloader, GOFILE_UPLOAD_API};
pub use hc_cdn::{HcCdn, HC_CDN_API};

use async_trait::async_trait;
use reqwest::header::{AUTHORIZATION, CONTENT_LENGTH, CONTENT_TYPE};
use tracing::{debug, info};

use crate::{BlobError, BlobResult, ByteSource, UploadBody, UploadConfig};

/// A host that accepts a file and answers with a public URL.
#[async_trait]
pub trait UploadTarget: Send + Sync {
    /// Short host name for logs and errors.
    fn name(&self) -> &'static str;

    /// Upload `file` as `filename` and return its URL.
    async fn upload(&self, file: ByteSource, filename: &str) -> BlobResult<String>;
}

/// Shared HTTP client and upload settings for every provider.
#[derive(Debug, Clone)]
pub struct UploadClient {
    http: reqwest::Client,
    config: UploadConfig,
}

impl UploadClient {
    pub fn new(config: UploadConfig) -> BlobResult<Self> {
        let http = reqwest::Client::builder()
            .user_agent(config.user_agent.clone())
            .build()?;
        Ok(Self { http, config })
    }

    /// Reuse an existing client.
    pub fn with_client(http: reqwest::Client, config: UploadConfig) -> Self {
        Self { http, config }
    }

    pub fn http(&self) -> &reqwest::Client {
        &self.http
    }

    pub fn config(&self) -> &UploadConfig {
        &self.config
    }

    /// POST `body` to `url` and return the response if its status is 2xx.
    pub(crate) async fn post(
        &self,
        provider: &'static str,
        url: &str,
        body: UploadBody,
        bearer: Option<&str>,
    ) -> BlobResult<reqwest::Response> {
        let content_length = body.content_length();
        info!(provider, url, content_length, "uploading file");

        let mut request = self
            .http
            .post(url)
            .header(CONTENT_TYPE, body.content_type())
            .header(CONTENT_LENGTH, content_length);
        if let Some(token) = bearer {
            request = request.header(AUTHORIZATION, format!("Bearer {token}"));
        }

        let response = request.body(body.into_reqwest_body()).send().await?;
        ensure_success(provider, response).await
    }
}

/// Turn a non-2xx reply into [`BlobError::Upstream`], keeping its text when
/// readable.
pub(crate) async fn ensure_success(
    provider: &'static str,
    response: reqwest::Response,
) -> BlobResult<reqwest::Response> {
    let status = response.status();
    if status.is_success() {
        debug!(provider, status = status.as_u16(), "upstream accepted request");
        return Ok(response);
    }

    let reason = status.canonical_reason().unwrap_or("");
    let message = match response.text().await {
        Ok(text) if !text.trim().is_empty() => format!("{reason} - {}", text.trim()),
        _ => reason.to_string(),
    };
    Err(BlobError::upstream(provider, status.as_u16(), message))
}
