use async_trait::async_trait;

use super::{UploadClient, UploadTarget};
use crate::{BlobError, BlobResult, ByteSource, MultipartForm};

pub const CATBOX_API: &str = "https://catbox.moe/user/api.php";
pub const LITTERBOX_API: &str = "https://litterbox.catbox.moe/resources/internals/api.php";

const CATBOX_FILES: &str = "https://files.catbox.moe/";
const LITTERBOX_FILES: &str = "https://litter.catbox.moe/";

/// Permanent uploads to catbox.moe.
#[derive(Debug, Clone)]
pub struct Catbox {
    client: UploadClient,
    endpoint: String,
}

impl Catbox {
    pub fn new(client: UploadClient) -> Self {
        Self {
            client,
            endpoint: CATBOX_API.to_string(),
        }
    }

    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }
}

#[async_trait]
impl UploadTarget for Catbox {
    fn name(&self) -> &'static str {
        "catbox"
    }

    async fn upload(&self, file: ByteSource, filename: &str) -> BlobResult<String> {
        let body = MultipartForm::new()
            .with_channel_capacity(self.client.config().channel_capacity)
            .text("reqtype", "fileupload")
            .file("fileToUpload", filename, file);

        let response = self.client.post(self.name(), &self.endpoint, body, None).await?;
        parse_link_reply(self.name(), &response.text().await?, CATBOX_FILES)
    }
}

/// Temporary uploads to litterbox.catbox.moe.
#[derive(Debug, Clone)]
pub struct Litterbox {
    client: UploadClient,
    endpoint: String,
    ttl: String,
}

impl Litterbox {
    pub fn new(client: UploadClient) -> Self {
        let ttl = client.config().litterbox_ttl.clone();
        Self {
            client,
            endpoint: LITTERBOX_API.to_string(),
            ttl,
        }
    }

    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    pub fn with_ttl(mut self, ttl: impl Into<String>) -> Self {
        self.ttl = ttl.into();
        self
    }
}

#[async_trait]
impl UploadTarget for Litterbox {
    fn name(&self) -> &'static str {
        "litterbox"
    }

    async fn upload(&self, file: ByteSource, filename: &str) -> BlobResult<String> {
        let body = MultipartForm::new()
            .with_channel_capacity(self.client.config().channel_capacity)
            .text("reqtype", "fileupload")
            .text("time", self.ttl.as_str())
            .file("fileToUpload", filename, file);

        let response = self.client.post(self.name(), &self.endpoint, body, None).await?;
        parse_link_reply(self.name(), &response.text().await?, LITTERBOX_FILES)
    }
}

/// Both hosts answer with the bare file URL as plain text.
fn parse_link_reply(provider: &'static str, reply: &str, expected_prefix: &str) -> BlobResult<String> {
    let link = reply.trim();
    if !link.starts_with(expected_prefix) {
        return Err(BlobError::invalid_response(
            provider,
            format!("expected a link under {expected_prefix}"),
        ));
    }
    Ok(link.to_string())
}
