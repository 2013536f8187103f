use std::sync::OnceLock;

use async_trait::async_trait;
use regex::Regex;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, COOKIE};
use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, info};

use super::{ensure_success, UploadClient, UploadTarget};
use crate::{BlobError, BlobResult, ByteSource, MultipartForm};

pub const GOFILE_UPLOAD_API: &str = "https://upload.gofile.io/uploadFile";

const GOFILE_PAGE_PREFIX: &str = "https://gofile.io/d/";
const ACCOUNTS_API: &str = "https://api.gofile.io/accounts";
const CONTENTS_API: &str = "https://api.gofile.io/contents";
const GLOBAL_SCRIPT: &str = "https://gofile.io/dist/js/global.js";

const PROVIDER: &str = "gofile";

/// True for gofile.io share pages, which need [`GofileDownloader`] to
/// resolve into file bytes.
pub fn is_gofile_page(url: &str) -> bool {
    url.starts_with(GOFILE_PAGE_PREFIX)
}

#[derive(Debug, Deserialize)]
struct Envelope<T> {
    data: T,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct UploadData {
    download_page: String,
}

#[derive(Debug, Deserialize)]
struct AccountData {
    token: String,
}

#[derive(Debug, Clone)]
pub struct Gofile {
    client: UploadClient,
    endpoint: String,
}

impl Gofile {
    pub fn new(client: UploadClient) -> Self {
        Self {
            client,
            endpoint: GOFILE_UPLOAD_API.to_string(),
        }
    }

    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }
}

#[async_trait]
impl UploadTarget for Gofile {
    fn name(&self) -> &'static str {
        PROVIDER
    }

    async fn upload(&self, file: ByteSource, filename: &str) -> BlobResult<String> {
        let body = MultipartForm::new()
            .with_channel_capacity(self.client.config().channel_capacity)
            .file("file", filename, file);

        let response = self.client.post(PROVIDER, &self.endpoint, body, None).await?;
        parse_upload_reply(&response.bytes().await?)
    }
}

fn parse_upload_reply(reply: &[u8]) -> BlobResult<String> {
    let reply: Envelope<UploadData> = serde_json::from_slice(reply)
        .map_err(|_| BlobError::invalid_response(PROVIDER, "missing downloadPage"))?;
    Ok(reply.data.download_page)
}

fn parse_account_reply(reply: &[u8]) -> BlobResult<String> {
    let reply: Envelope<AccountData> = serde_json::from_slice(reply)
        .map_err(|_| BlobError::invalid_response(PROVIDER, "missing token"))?;
    Ok(reply.data.token)
}

/// The site publishes a web token inside its global script as
/// `appdata.wt = "<token>"`.
fn extract_web_token(script: &str) -> BlobResult<String> {
    static PATTERN: OnceLock<Result<Regex, regex::Error>> = OnceLock::new();
    let pattern = PATTERN
        .get_or_init(|| Regex::new(r#"appdata\.wt = "([^\n"]+)""#))
        .as_ref()
        .map_err(|e| BlobError::invalid(e.to_string()))?;

    pattern
        .captures(script)
        .and_then(|caps| caps.get(1))
        .map(|token| token.as_str().to_string())
        .ok_or_else(|| BlobError::invalid_response(PROVIDER, "web token not found in script"))
}

/// `data.children` is an object keyed by file id; take the first entry's
/// direct link.
fn parse_contents_reply(reply: &[u8]) -> BlobResult<String> {
    let reply: Value = serde_json::from_slice(reply)?;
    let children = reply
        .pointer("/data/children")
        .and_then(Value::as_object)
        .filter(|children| !children.is_empty())
        .ok_or_else(|| BlobError::invalid_response(PROVIDER, "no files in contents"))?;

    children
        .values()
        .next()
        .and_then(|child| child.get("link"))
        .and_then(Value::as_str)
        .map(str::to_string)
        .ok_or_else(|| BlobError::invalid_response(PROVIDER, "no file link in contents"))
}

/// Resolves a gofile.io share page into the file's bytes.
///
/// A guest account token plus the site's web token unlock the folder
/// listing; listing the folder with that account token also authorizes it
/// to fetch the direct link.
#[derive(Debug, Clone)]
pub struct GofileDownloader {
    client: UploadClient,
    accounts_url: String,
    contents_url: String,
    script_url: String,
}

impl GofileDownloader {
    pub fn new(client: UploadClient) -> Self {
        Self {
            client,
            accounts_url: ACCOUNTS_API.to_string(),
            contents_url: CONTENTS_API.to_string(),
            script_url: GLOBAL_SCRIPT.to_string(),
        }
    }

    /// Point every API call at another host, e.g. a local test server.
    pub fn with_api_base(mut self, base: &str) -> Self {
        let base = base.trim_end_matches('/');
        self.accounts_url = format!("{base}/accounts");
        self.contents_url = format!("{base}/contents");
        self.script_url = format!("{base}/dist/js/global.js");
        self
    }

    /// Fetch the first file in the folder behind `page_url`, sending
    /// `headers` along with the download request.
    pub async fn fetch(&self, page_url: &str, headers: HeaderMap) -> BlobResult<reqwest::Response> {
        let folder = page_url.trim_start_matches(GOFILE_PAGE_PREFIX);
        let http = self.client.http();

        let accounts = http.post(&self.accounts_url).send().await?;
        let accounts = ensure_success(PROVIDER, accounts).await?;
        let token = parse_account_reply(&accounts.bytes().await?)?;

        let script = ensure_success(PROVIDER, http.get(&self.script_url).send().await?).await?;
        let web_token = extract_web_token(&script.text().await?)?;
        debug!(folder, "resolved gofile tokens");

        let contents = http
            .get(format!("{}/{folder}", self.contents_url))
            .query(&[("wt", web_token.as_str())])
            .header(AUTHORIZATION, format!("Bearer {token}"))
            .send()
            .await?;
        let contents = ensure_success(PROVIDER, contents).await?;
        let link = parse_contents_reply(&contents.bytes().await?)?;

        let mut headers = headers;
        let cookie = HeaderValue::from_str(&format!("accountToken={token}"))
            .map_err(|_| BlobError::invalid_response(PROVIDER, "token is not a valid header value"))?;
        headers.insert(COOKIE, cookie);

        info!(folder, "downloading gofile file");
        Ok(http.get(link).headers(headers).send().await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recognizes_share_pages() {
        assert!(is_gofile_page("https://gofile.io/d/AbC123"));
        assert!(!is_gofile_page("https://files.catbox.moe/x.png"));
        assert!(!is_gofile_page("http://gofile.io/d/AbC123"));
    }

    #[test]
    fn upload_reply_yields_download_page() {
        let reply = br#"{"status":"ok","data":{"downloadPage":"https://gofile.io/d/Xy12","code":"Xy12"}}"#;
        assert_eq!(parse_upload_reply(reply).unwrap(), "https://gofile.io/d/Xy12");
    }

    #[test]
    fn upload_reply_without_page_is_invalid() {
        let err = parse_upload_reply(br#"{"status":"error-rateLimit","data":{}}"#).unwrap_err();
        assert!(err.to_string().contains("downloadPage"));
    }

    #[test]
    fn account_token_is_read() {
        let reply = br#"{"status":"ok","data":{"id":"1","token":"tok123"}}"#;
        assert_eq!(parse_account_reply(reply).unwrap(), "tok123");
    }

    #[test]
    fn web_token_is_scraped_from_script() {
        let script = "var appdata = {};\nappdata.wt = \"4fd6sg89d7s6\";\nappdata.other = 1;";
        assert_eq!(extract_web_token(script).unwrap(), "4fd6sg89d7s6");
        assert!(extract_web_token("appdata.nothing = 1").is_err());
    }

    #[test]
    fn contents_reply_yields_first_link() {
        let reply = br#"{"status":"ok","data":{"children":{"f1":{"name":"a.txt","link":"https://store1.gofile.io/download/web/f1/a.txt"}}}}"#;
        assert_eq!(
            parse_contents_reply(reply).unwrap(),
            "https://store1.gofile.io/download/web/f1/a.txt"
        );
    }

    #[test]
    fn empty_contents_are_invalid() {
        let err = parse_contents_reply(br#"{"data":{"children":{}}}"#).unwrap_err();
        assert!(matches!(err, BlobError::InvalidResponse { .. }));
    }
}
