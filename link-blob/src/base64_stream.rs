//! Streaming base64 (standard alphabet, padded).
//!
//! Output is identical to encoding the whole input at once, whatever the
//! input chunking. Padding only ever appears in the final chunk.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use bytes::Bytes;
use futures_util::StreamExt;

use crate::ByteStream;

/// Exact encoded size of `raw_len` input bytes: `4 * ceil(raw_len / 3)`.
pub fn encoded_len(raw_len: u64) -> u64 {
    raw_len.div_ceil(3) * 4
}

/// Incremental encoder for one logical byte sequence.
///
/// Holds at most two leftover bytes between chunks, since a chunk boundary
/// can split a 3-byte group. [`Base64Encoder::finish`] consumes the encoder,
/// so one instance can never span two streams.
#[derive(Debug, Default)]
pub struct Base64Encoder {
    pending: [u8; 3],
    pending_len: usize,
}

impl Base64Encoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bytes carried over to the next chunk (0..=2).
    pub fn leftover(&self) -> &[u8] {
        &self.pending[..self.pending_len]
    }

    /// Encode every complete 3-byte group available after `chunk`.
    ///
    /// Returns `None` when no complete group is available yet.
    pub fn push(&mut self, chunk: &[u8]) -> Option<Bytes> {
        let mut input = chunk;
        let mut out = String::with_capacity((self.pending_len + chunk.len()) / 3 * 4);

        if self.pending_len > 0 {
            let take = (3 - self.pending_len).min(input.len());
            self.pending[self.pending_len..self.pending_len + take].copy_from_slice(&input[..take]);
            self.pending_len += take;
            input = &input[take..];

            if self.pending_len < 3 {
                return None;
            }
            STANDARD.encode_string(self.pending, &mut out);
            self.pending_len = 0;
        }

        let aligned = input.len() - input.len() % 3;
        STANDARD.encode_string(&input[..aligned], &mut out);

        let rest = &input[aligned..];
        self.pending[..rest.len()].copy_from_slice(rest);
        self.pending_len = rest.len();

        if out.is_empty() {
            None
        } else {
            Some(Bytes::from(out))
        }
    }

    /// Encode the leftover, padded, as the final group.
    pub fn finish(self) -> Option<Bytes> {
        if self.pending_len == 0 {
            return None;
        }
        Some(Bytes::from(STANDARD.encode(self.leftover())))
    }
}

/// Wrap `input` so every chunk it yields comes out base64-encoded.
///
/// An input error is passed through and ends the output; no final group is
/// emitted after it.
pub fn encode_stream(mut input: ByteStream) -> ByteStream {
    Box::pin(async_stream::stream! {
        let mut encoder = Base64Encoder::new();

        while let Some(chunk) = input.next().await {
            match chunk {
                Ok(chunk) => {
                    if let Some(encoded) = encoder.push(&chunk) {
                        yield Ok(encoded);
                    }
                }
                Err(err) => {
                    yield Err(err);
                    return;
                }
            }
        }

        if let Some(encoded) = encoder.finish() {
            yield Ok(encoded);
        }
    })
}
