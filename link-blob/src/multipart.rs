//! `multipart/form-data` framing around a single streamed file.
//!
//! The framing (boundary lines and part headers) is built as two literal
//! strings, and the file payload is spliced between them with
//! [`crate::combine`], so the file itself is never buffered.

use rand::Rng;
use std::fmt;

use crate::combine::{combine_with_capacity, DEFAULT_CHANNEL_CAPACITY};
use crate::{ByteSource, UploadBody};

const BOUNDARY_DASHES: usize = 20;
const BOUNDARY_DIGITS: usize = 20;

/// A per-request multipart boundary token.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Boundary(String);

impl Boundary {
    /// Twenty dashes followed by twenty random decimal digits.
    pub fn generate() -> Self {
        let mut rng = rand::thread_rng();
        let mut token = "-".repeat(BOUNDARY_DASHES);
        token.extend((0..BOUNDARY_DIGITS).map(|_| char::from(b'0' + rng.gen_range(0..10u8))));
        Self(token)
    }

    /// Use a caller-chosen token.
    pub fn from_string(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for Boundary {
    fn default() -> Self {
        Self::generate()
    }
}

impl fmt::Display for Boundary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Builder for a form with plain text fields and one trailing file field.
///
/// ```rust
/// # #[tokio::main]
/// # async fn main() {
/// use link_blob::{ByteSource, MultipartForm};
///
/// let body = MultipartForm::new()
///     .text("reqtype", "fileupload")
///     .file("fileToUpload", "notes.txt", ByteSource::from("hello"));
///
/// assert!(body.content_type().starts_with("multipart/form-data; boundary="));
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct MultipartForm {
    boundary: Boundary,
    fields: Vec<(String, String)>,
    channel_capacity: usize,
}

impl Default for MultipartForm {
    fn default() -> Self {
        Self {
            boundary: Boundary::generate(),
            fields: Vec::new(),
            channel_capacity: DEFAULT_CHANNEL_CAPACITY,
        }
    }
}

impl MultipartForm {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_boundary(mut self, boundary: Boundary) -> Self {
        self.boundary = boundary;
        self
    }

    pub fn with_channel_capacity(mut self, chunks: usize) -> Self {
        self.channel_capacity = chunks;
        self
    }

    /// Append a plain text field. Fields are written in insertion order,
    /// before the file.
    pub fn text(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.fields.push((name.into(), value.into()));
        self
    }

    pub fn boundary(&self) -> &Boundary {
        &self.boundary
    }

    /// `multipart/form-data; boundary=<token>`
    pub fn content_type(&self) -> String {
        format!("multipart/form-data; boundary={}", self.boundary)
    }

    /// Everything before the file bytes, CRLF-normalized.
    pub fn prefix(&self, file_field: &str, filename: &str) -> String {
        let boundary = &self.boundary;
        let mut text = String::new();

        for (name, value) in &self.fields {
            text.push_str(&format!(
                "--{boundary}\nContent-Disposition: form-data; name=\"{}\"\n\n{value}\n",
                escape_quoted(name)
            ));
        }
        text.push_str(&format!(
            "--{boundary}\nContent-Disposition: form-data; name=\"{}\"; filename=\"{}\"\nContent-Type: application/octet-stream\n\n",
            escape_quoted(file_field),
            escape_quoted(filename)
        ));

        normalize_crlf(&text)
    }

    /// Everything after the file bytes.
    pub fn suffix(&self) -> String {
        format!("\r\n--{}--\r\n", self.boundary)
    }

    /// Frame `file` as the form's file field and return the finished body.
    pub fn file(self, file_field: &str, filename: &str, file: ByteSource) -> UploadBody {
        let prefix = self.prefix(file_field, filename);
        let suffix = self.suffix();
        let content_type = self.content_type();

        let payload = combine_with_capacity(
            vec![prefix.into(), file, suffix.into()],
            self.channel_capacity,
        );
        UploadBody::new(payload, content_type)
    }
}

/// Rewrite every line break (`\n` or `\r\n`) as `\r\n`.
pub fn normalize_crlf(text: &str) -> String {
    let mut out = String::with_capacity(text.len() + text.len() / 16);
    let mut chars = text.chars().peekable();
    while let Some(c) = chars.next() {
        match c {
            '\r' if chars.peek() == Some(&'\n') => {}
            '\n' => out.push_str("\r\n"),
            other => out.push(other),
        }
    }
    out
}

/// Percent-encode the characters that would break a quoted header parameter.
fn escape_quoted(value: &str) -> String {
    value
        .replace('"', "%22")
        .replace('\r', "%0D")
        .replace('\n', "%0A")
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures_util::StreamExt;

    async fn collect(body: UploadBody) -> (Vec<u8>, u64, String) {
        let (mut stream, length, content_type) = body.into_parts();
        let mut out = Vec::new();
        while let Some(chunk) = stream.next().await {
            out.extend_from_slice(&chunk.unwrap());
        }
        (out, length, content_type)
    }

    #[tokio::test]
    async fn wire_format_is_byte_exact() {
        let body = MultipartForm::new()
            .with_boundary(Boundary::from_string("XyZ"))
            .text("reqtype", "fileupload")
            .file("fileToUpload", "test.txt", ByteSource::from("hello"));

        let (bytes, length, content_type) = collect(body).await;
        let expected = "--XyZ\r\n\
            Content-Disposition: form-data; name=\"reqtype\"\r\n\
            \r\n\
            fileupload\r\n\
            --XyZ\r\n\
            Content-Disposition: form-data; name=\"fileToUpload\"; filename=\"test.txt\"\r\n\
            Content-Type: application/octet-stream\r\n\
            \r\n\
            hello\r\n\
            --XyZ--\r\n";

        assert_eq!(String::from_utf8(bytes).unwrap(), expected);
        assert_eq!(length, expected.len() as u64);
        assert_eq!(content_type, "multipart/form-data; boundary=XyZ");
    }

    #[tokio::test]
    async fn file_only_form_has_a_single_part() {
        let body = MultipartForm::new()
            .with_boundary(Boundary::from_string("b"))
            .file("file", "a.bin", ByteSource::from(vec![0u8, 1, 2]));

        let (bytes, length, _) = collect(body).await;
        let mut expected = b"--b\r\nContent-Disposition: form-data; name=\"file\"; filename=\"a.bin\"\r\nContent-Type: application/octet-stream\r\n\r\n".to_vec();
        expected.extend_from_slice(&[0, 1, 2]);
        expected.extend_from_slice(b"\r\n--b--\r\n");
        assert_eq!(bytes, expected);
        assert_eq!(length, expected.len() as u64);
    }

    #[test]
    fn field_values_are_crlf_normalized() {
        let form = MultipartForm::new()
            .with_boundary(Boundary::from_string("b"))
            .text("note", "line one\nline two\r\nline three");
        let prefix = form.prefix("file", "f");
        assert!(prefix.contains("line one\r\nline two\r\nline three\r\n"));
        assert!(!prefix.replace("\r\n", "").contains('\n'));
    }

    #[test]
    fn quotes_in_filenames_cannot_break_the_header() {
        let form = MultipartForm::new().with_boundary(Boundary::from_string("b"));
        let prefix = form.prefix("file", "evil\"\r\nX-Injected: 1.txt");
        assert!(prefix.contains("filename=\"evil%22%0D%0AX-Injected: 1.txt\""));
    }

    #[test]
    fn generated_boundaries_are_long_and_distinct() {
        let a = Boundary::generate();
        let b = Boundary::generate();
        assert_eq!(a.as_str().len(), BOUNDARY_DASHES + BOUNDARY_DIGITS);
        assert!(a.as_str().starts_with(&"-".repeat(BOUNDARY_DASHES)));
        assert!(a.as_str()[BOUNDARY_DASHES..].chars().all(|c| c.is_ascii_digit()));
        assert_ne!(a, b);
    }

    #[test]
    fn boundary_does_not_appear_in_sample_payloads() {
        let samples: Vec<Vec<u8>> = vec![
            b"hello world".to_vec(),
            "-".repeat(4096).into_bytes(),
            (0..=255u8).cycle().take(64 * 1024).collect(),
            b"--------------------1234567890\r\n".repeat(100),
        ];

        for _ in 0..32 {
            let boundary = Boundary::generate();
            let needle = boundary.as_str().as_bytes();
            for sample in &samples {
                assert!(!sample.windows(needle.len()).any(|w| w == needle));
            }
        }
    }
}
