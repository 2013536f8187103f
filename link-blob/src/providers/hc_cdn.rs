use async_trait::async_trait;
use serde::Deserialize;

use super::{UploadClient, UploadTarget};
use crate::data_url::{data_url_json_with, OCTET_STREAM};
use crate::{BlobError, BlobResult, ByteSource};

pub const HC_CDN_API: &str = "https://cdn.hackclub.com/api/v3/new";

/// Hack Club CDN: takes a JSON array of data URLs.
#[derive(Debug, Clone)]
pub struct HcCdn {
    client: UploadClient,
    endpoint: String,
    token: String,
}

impl HcCdn {
    pub fn new(client: UploadClient) -> Self {
        let token = client.config().hc_cdn_token.clone();
        Self {
            client,
            endpoint: HC_CDN_API.to_string(),
            token,
        }
    }

    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }
}

#[derive(Debug, Deserialize)]
struct HcCdnReply {
    files: Vec<HcCdnFile>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct HcCdnFile {
    deployed_url: String,
}

#[async_trait]
impl UploadTarget for HcCdn {
    fn name(&self) -> &'static str {
        "hc-cdn"
    }

    /// The filename is not sent; the CDN names deployed files itself.
    async fn upload(&self, file: ByteSource, _filename: &str) -> BlobResult<String> {
        let body = data_url_json_with(file, OCTET_STREAM, self.client.config().channel_capacity);

        let response = self
            .client
            .post(self.name(), &self.endpoint, body, Some(&self.token))
            .await?;
        parse_reply(self.name(), &response.bytes().await?)
    }
}

fn parse_reply(provider: &'static str, reply: &[u8]) -> BlobResult<String> {
    let reply: HcCdnReply = serde_json::from_slice(reply)
        .map_err(|e| BlobError::invalid_response(provider, e.to_string()))?;
    reply
        .files
        .into_iter()
        .next()
        .map(|file| file.deployed_url)
        .ok_or_else(|| BlobError::invalid_response(provider, "no deployed files"))
}
