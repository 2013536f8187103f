use bytes::Bytes;
use futures_core::Stream;
use std::fmt;
use std::pin::Pin;

use crate::{BlobError, BlobResult};

/// Stream of bytes flowing through the upload pipeline
pub type ByteStream = Pin<Box<dyn Stream<Item = Result<Bytes, std::io::Error>> + Send>>;

/// One input to [`crate::combine`]: bytes already in memory, or a
/// single-use stream that promises to yield exactly `length` bytes.
pub enum ByteSource {
    Literal(Bytes),
    Stream { stream: ByteStream, length: u64 },
}

impl ByteSource {
    /// Wrap a stream with its declared byte count.
    pub fn stream(stream: ByteStream, length: u64) -> Self {
        Self::Stream { stream, length }
    }

    /// Wrap a stream whose length may be unknown.
    ///
    /// A missing length is a caller contract violation and is rejected
    /// before anything is read.
    pub fn try_stream(stream: ByteStream, length: Option<u64>) -> BlobResult<Self> {
        let length = length.ok_or_else(BlobError::missing_length)?;
        Ok(Self::Stream { stream, length })
    }

    /// Number of bytes this source contributes.
    pub fn len(&self) -> u64 {
        match self {
            Self::Literal(bytes) => bytes.len() as u64,
            Self::Stream { length, .. } => *length,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// View any source as a stream plus its length.
    pub fn into_stream(self) -> (ByteStream, u64) {
        match self {
            Self::Literal(bytes) => {
                let length = bytes.len() as u64;
                let stream: ByteStream = if bytes.is_empty() {
                    Box::pin(futures_util::stream::empty())
                } else {
                    Box::pin(futures_util::stream::once(async move { Ok(bytes) }))
                };
                (stream, length)
            }
            Self::Stream { stream, length } => (stream, length),
        }
    }
}

impl fmt::Debug for ByteSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Literal(bytes) => f.debug_tuple("Literal").field(&bytes.len()).finish(),
            Self::Stream { length, .. } => f.debug_struct("Stream").field("length", length).finish(),
        }
    }
}

impl From<Bytes> for ByteSource {
    fn from(bytes: Bytes) -> Self {
        Self::Literal(bytes)
    }
}

impl From<Vec<u8>> for ByteSource {
    fn from(bytes: Vec<u8>) -> Self {
        Self::Literal(Bytes::from(bytes))
    }
}

impl From<String> for ByteSource {
    fn from(text: String) -> Self {
        Self::Literal(Bytes::from(text))
    }
}

impl From<&'static str> for ByteSource {
    fn from(text: &'static str) -> Self {
        Self::Literal(Bytes::from_static(text.as_bytes()))
    }
}

impl From<&'static [u8]> for ByteSource {
    fn from(bytes: &'static [u8]) -> Self {
        Self::Literal(Bytes::from_static(bytes))
    }
}
