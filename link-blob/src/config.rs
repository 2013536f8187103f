/// Default `User-Agent` sent to third-party hosts
pub const DEFAULT_USER_AGENT: &str = concat!("link-blob/", env!("CARGO_PKG_VERSION"));

/// Configuration for the upload pipeline
#[derive(Debug, Clone)]
pub struct UploadConfig {
    /// Chunks buffered between a combiner's producer task and its reader.
    /// Bounds memory per upload; a full channel suspends the producer.
    pub channel_capacity: usize,

    /// `User-Agent` header for uploads and proxied downloads
    pub user_agent: String,

    /// Upper bound for bodies that are stored inline instead of streamed
    pub inline_max_bytes: u64,

    /// Retention requested from Litterbox (`1h`, `12h`, `24h` or `72h`)
    pub litterbox_ttl: String,

    /// Bearer token for the Hack Club CDN
    pub hc_cdn_token: String,
}

impl Default for UploadConfig {
    fn default() -> Self {
        Self {
            channel_capacity: 16,
            user_agent: DEFAULT_USER_AGENT.to_string(),
            inline_max_bytes: 25 * 1024 * 1024, // 25MB
            litterbox_ttl: "72h".to_string(),
            hc_cdn_token: "beans".to_string(),
        }
    }
}

impl UploadConfig {
    /// Create a new config with defaults
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the combiner channel capacity (clamped to at least one chunk)
    pub fn with_channel_capacity(mut self, chunks: usize) -> Self {
        self.channel_capacity = chunks.max(1);
        self
    }

    pub fn with_user_agent<S: Into<String>>(mut self, user_agent: S) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    pub fn with_inline_max_bytes(mut self, bytes: u64) -> Self {
        self.inline_max_bytes = bytes;
        self
    }

    pub fn with_litterbox_ttl<S: Into<String>>(mut self, ttl: S) -> Self {
        self.litterbox_ttl = ttl.into();
        self
    }

    pub fn with_hc_cdn_token<S: Into<String>>(mut self, token: S) -> Self {
        self.hc_cdn_token = token.into();
        self
    }
}
