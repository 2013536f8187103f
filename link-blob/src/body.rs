use crate::{ByteStream, CombinedPayload};

/// A ready-to-send request body: stream, exact length and `Content-Type`.
#[derive(Debug)]
pub struct UploadBody {
    payload: CombinedPayload,
    content_type: String,
}

impl UploadBody {
    pub fn new(payload: CombinedPayload, content_type: impl Into<String>) -> Self {
        Self {
            payload,
            content_type: content_type.into(),
        }
    }

    /// Value for the `Content-Length` header.
    pub fn content_length(&self) -> u64 {
        self.payload.total_length()
    }

    /// Value for the `Content-Type` header.
    pub fn content_type(&self) -> &str {
        &self.content_type
    }

    pub fn into_stream(self) -> ByteStream {
        self.payload.into_stream()
    }

    /// `(body stream, content length, content type)`
    pub fn into_parts(self) -> (ByteStream, u64, String) {
        let (stream, length) = self.payload.into_parts();
        (stream, length, self.content_type)
    }

    pub fn into_reqwest_body(self) -> reqwest::Body {
        self.payload.into_reqwest_body()
    }
}
