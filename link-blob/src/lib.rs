//! # link-blob: streaming upload bodies for third-party file hosts
//!
//! `link-blob` builds HTTP request bodies for files whose size is known but
//! whose bytes are still arriving, and sends them to public file hosts
//! without ever holding the whole file in memory.
//!
//! ## Key Features
//!
//! - **Fixed-length combination**: splice literal framing and streamed files into one body with an exact total length
//! - **Streaming base64**: encode chunk by chunk, carrying at most two bytes between chunks
//! - **Multipart framing**: hand-built `multipart/form-data` prefix and suffix around a single file
//! - **Data-URL JSON**: `["data:<mime>;base64,..."]` bodies with a precomputed length
//! - **File hosts**: catbox, litterbox, gofile and the Hack Club CDN behind one [`UploadTarget`] trait
//!
//! ## Quick Start
//!
//! ```rust
//! use link_blob::prelude::*;
//!
//! # #[tokio::main]
//! # async fn main() -> BlobResult<()> {
//! let body = combine(vec![
//!     ByteSource::from("--b\r\n"),
//!     ByteSource::from("hello"),
//!     ByteSource::from("\r\n--b--\r\n"),
//! ]);
//! assert_eq!(body.total_length(), 19);
//! # Ok(())
//! # }
//! ```
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────┐
//! │  UploadTarget   │  ← catbox / litterbox / gofile / hc-cdn
//! ├─────────────────┤
//! │   UploadBody    │  ← multipart or data-URL framing
//! ├─────────────────┤
//! │ CombinedPayload │  ← fixed-length splice of literals and streams
//! └─────────────────┘
//! ```

pub mod base64_stream;
mod body;
pub mod combine;
mod config;
pub mod data_url;
mod error;
pub mod multipart;
pub mod providers;
mod types;

pub use base64_stream::{encode_stream, encoded_len, Base64Encoder};
pub use body::UploadBody;
pub use combine::{combine, combine_with_capacity, CombinedPayload, DEFAULT_CHANNEL_CAPACITY};
pub use config::{UploadConfig, DEFAULT_USER_AGENT};
pub use data_url::{data_url_json, data_url_json_with};
pub use error::{BlobError, BlobResult};
pub use multipart::{normalize_crlf, Boundary, MultipartForm};
pub use providers::{
    is_gofile_page, Catbox, Gofile, GofileDownloader, HcCdn, Litterbox, UploadClient, UploadTarget,
};
pub use types::{ByteSource, ByteStream};

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::{
        combine, BlobError, BlobResult, ByteSource, ByteStream, MultipartForm, UploadBody,
        UploadClient, UploadConfig, UploadTarget,
    };
}
