//! Fixed-length stream combination.
//!
//! [`combine`] splices an ordered list of [`ByteSource`]s into one byte
//! stream whose total length is known before the first byte exists, so the
//! outbound request can carry an exact `Content-Length` instead of chunked
//! transfer encoding.

use std::io;

use bytes::Bytes;
use futures_util::StreamExt;
use tokio::sync::mpsc;
use tokio_stream::wrappers::ReceiverStream;
use tracing::debug;

use crate::{ByteSource, ByteStream};

/// Chunks buffered between the producer task and the reader by default
pub const DEFAULT_CHANNEL_CAPACITY: usize = 16;

type Chunk = io::Result<Bytes>;

/// The output of [`combine`]: a single-use byte stream plus its exact length.
pub struct CombinedPayload {
    receiver: ReceiverStream<Chunk>,
    total_length: u64,
}

impl CombinedPayload {
    /// Sum of the declared lengths of every source.
    pub fn total_length(&self) -> u64 {
        self.total_length
    }

    pub fn into_stream(self) -> ByteStream {
        Box::pin(self.receiver)
    }

    pub fn into_parts(self) -> (ByteStream, u64) {
        let total_length = self.total_length;
        (self.into_stream(), total_length)
    }

    /// Streaming request body for the outbound client.
    ///
    /// The caller still sets `Content-Length` from [`Self::total_length`];
    /// without it the client falls back to chunked encoding.
    pub fn into_reqwest_body(self) -> reqwest::Body {
        reqwest::Body::wrap_stream(self.receiver)
    }
}

impl std::fmt::Debug for CombinedPayload {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CombinedPayload")
            .field("total_length", &self.total_length)
            .finish_non_exhaustive()
    }
}

/// Combine `sources` with the default channel capacity.
///
/// # Panics
///
/// Must be called from within a Tokio runtime; production starts on a
/// spawned task immediately.
pub fn combine(sources: Vec<ByteSource>) -> CombinedPayload {
    combine_with_capacity(sources, DEFAULT_CHANNEL_CAPACITY)
}

/// Combine `sources` into one stream, buffering at most `capacity` chunks.
///
/// Sources are written strictly in order. A stream source that fails, ends
/// early or overruns its declared length aborts the output with an error
/// instead of ending it cleanly. Dropping the returned stream stops the
/// producer and releases every unread source.
pub fn combine_with_capacity(sources: Vec<ByteSource>, capacity: usize) -> CombinedPayload {
    let total_length = sources.iter().map(ByteSource::len).sum();
    let (tx, rx) = mpsc::channel(capacity.max(1));

    debug!(sources = sources.len(), total_length, "starting combined stream");
    tokio::spawn(produce(sources, tx));

    CombinedPayload {
        receiver: ReceiverStream::new(rx),
        total_length,
    }
}

async fn produce(sources: Vec<ByteSource>, tx: mpsc::Sender<Chunk>) {
    for (index, source) in sources.into_iter().enumerate() {
        let finished = match source {
            ByteSource::Literal(bytes) if bytes.is_empty() => true,
            ByteSource::Literal(bytes) => tx.send(Ok(bytes)).await.is_ok(),
            ByteSource::Stream { stream, length } => forward(stream, length, &tx).await,
        };

        if !finished {
            debug!(source = index, "combined stream aborted");
            return;
        }
    }

    debug!("combined stream complete");
    // dropping `tx` ends the reader's stream
}

/// Forward one stream source chunk by chunk. Returns `false` when production
/// must stop (reader gone or an error was delivered).
async fn forward(stream: ByteStream, length: u64, tx: &mpsc::Sender<Chunk>) -> bool {
    let mut stream = checked_length(stream, length);

    loop {
        let next = tokio::select! {
            biased;
            _ = tx.closed() => return false,
            next = stream.next() => next,
        };

        match next {
            Some(Ok(chunk)) => {
                if tx.send(Ok(chunk)).await.is_err() {
                    return false;
                }
            }
            Some(Err(err)) => {
                let _ = tx.send(Err(err)).await;
                return false;
            }
            None => return true,
        }
    }
}

/// Hold `stream` to exactly `length` bytes.
///
/// Ending early yields an `UnexpectedEof` error item; a chunk that would
/// cross `length` is replaced by an `InvalidData` error. Either way the
/// stream ends right after the error. Empty chunks are dropped.
pub fn checked_length(mut stream: ByteStream, length: u64) -> ByteStream {
    Box::pin(async_stream::stream! {
        let mut seen: u64 = 0;

        while let Some(chunk) = stream.next().await {
            match chunk {
                Ok(chunk) => {
                    seen += chunk.len() as u64;
                    if seen > length {
                        yield Err(io::Error::new(
                            io::ErrorKind::InvalidData,
                            format!("stream source produced more than its declared {length} bytes"),
                        ));
                        return;
                    }
                    if !chunk.is_empty() {
                        yield Ok(chunk);
                    }
                }
                Err(err) => {
                    yield Err(err);
                    return;
                }
            }
        }

        if seen < length {
            yield Err(io::Error::new(
                io::ErrorKind::UnexpectedEof,
                format!("stream source ended after {seen} of {length} declared bytes"),
            ));
        }
    })
}
