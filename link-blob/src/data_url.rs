//! Base64 data-URL JSON bodies: `["data:<mime>;base64,<payload>"]`.

use crate::base64_stream::{encode_stream, encoded_len};
use crate::combine::{checked_length, combine_with_capacity, DEFAULT_CHANNEL_CAPACITY};
use crate::{ByteSource, UploadBody};

pub const OCTET_STREAM: &str = "application/octet-stream";

/// Build the JSON body for `file` with the `application/octet-stream` type.
pub fn data_url_json(file: ByteSource) -> UploadBody {
    data_url_json_with(file, OCTET_STREAM, DEFAULT_CHANNEL_CAPACITY)
}

/// Build the JSON body for `file` with an explicit media type.
///
/// The encoded segment is declared as `4 * ceil(raw / 3)` bytes, the exact
/// size of the base64 text, not the raw file length. Several raw lengths
/// share one encoded length, so the raw stream is held to its own declared
/// length before encoding.
pub fn data_url_json_with(file: ByteSource, mime: &str, channel_capacity: usize) -> UploadBody {
    let (raw, raw_length) = file.into_stream();
    let encoded = ByteSource::stream(
        encode_stream(checked_length(raw, raw_length)),
        encoded_len(raw_length),
    );

    let prefix = format!("[\"data:{mime};base64,");
    let payload = combine_with_capacity(
        vec![prefix.into(), encoded, "\"]".into()],
        channel_capacity,
    );
    UploadBody::new(payload, "application/json")
}
