//! # Errors
//!
//! Structured, Feathers-style errors for the link redirector.
//! Core goals:
//! - consistent status codes + class names
//! - can be carried through anyhow::Error (handlers and stores return `anyhow::Result`)
//! - transport-agnostic (the HTTP crate decides how to serialize)

use std::fmt;

use anyhow::Error as AnyError;

/// A convenience result type for link APIs.
pub type LinkResult<T> = std::result::Result<T, AnyError>;

/// Error class names + status codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    BadRequest,      // 400
    Conflict,        // 409
    LengthRequired,  // 411
    PayloadTooLarge, // 413
    GeneralError,    // 500
    NotImplemented,  // 501
    BadGateway,      // 502
}

impl ErrorKind {
    pub fn status_code(&self) -> u16 {
        match self {
            ErrorKind::BadRequest => 400,
            ErrorKind::Conflict => 409,
            ErrorKind::LengthRequired => 411,
            ErrorKind::PayloadTooLarge => 413,
            ErrorKind::GeneralError => 500,
            ErrorKind::NotImplemented => 501,
            ErrorKind::BadGateway => 502,
        }
    }

    /// Error `name` (e.g. "Conflict")
    pub fn name(&self) -> &'static str {
        match self {
            ErrorKind::BadRequest => "BadRequest",
            ErrorKind::Conflict => "Conflict",
            ErrorKind::LengthRequired => "LengthRequired",
            ErrorKind::PayloadTooLarge => "PayloadTooLarge",
            ErrorKind::GeneralError => "GeneralError",
            ErrorKind::NotImplemented => "NotImplemented",
            ErrorKind::BadGateway => "BadGateway",
        }
    }

    /// Error `className` (kebab-cased)
    pub fn class_name(&self) -> &'static str {
        match self {
            ErrorKind::BadRequest => "bad-request",
            ErrorKind::Conflict => "conflict",
            ErrorKind::LengthRequired => "length-required",
            ErrorKind::PayloadTooLarge => "payload-too-large",
            ErrorKind::GeneralError => "general-error",
            ErrorKind::NotImplemented => "not-implemented",
            ErrorKind::BadGateway => "bad-gateway",
        }
    }
}

/// A structured error that can live inside `anyhow::Error`.
///
/// Fields on the wire:
/// - name
/// - message
/// - code (HTTP status)
/// - className
/// - errors (optional)
#[derive(Debug)]
pub struct LinkError {
    pub kind: ErrorKind,
    pub message: String,
    pub errors: Option<serde_json::Value>,
    pub source: Option<AnyError>,
}

impl LinkError {
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            errors: None,
            source: None,
        }
    }

    pub fn with_errors(mut self, errors: serde_json::Value) -> Self {
        self.errors = Some(errors);
        self
    }

    pub fn with_source(mut self, source: AnyError) -> Self {
        self.source = Some(source);
        self
    }

    pub fn code(&self) -> u16 {
        self.kind.status_code()
    }

    pub fn name(&self) -> &'static str {
        self.kind.name()
    }

    pub fn class_name(&self) -> &'static str {
        self.kind.class_name()
    }

    /// Convert into `anyhow::Error`.
    pub fn into_anyhow(self) -> AnyError {
        AnyError::new(self)
    }

    /// Turn any error into a LinkError:
    /// - if it's already a LinkError, keep it (lossless)
    /// - otherwise wrap as GeneralError
    pub fn normalize(err: AnyError) -> LinkError {
        match err.downcast::<LinkError>() {
            Ok(link) => link,
            Err(other) => {
                LinkError::new(ErrorKind::GeneralError, other.to_string()).with_source(other)
            }
        }
    }

    /// A copy suitable for returning to clients: the inner `source` is dropped.
    pub fn sanitize_for_client(&self) -> LinkError {
        LinkError {
            kind: self.kind,
            message: self.message.clone(),
            errors: self.errors.clone(),
            source: None,
        }
    }

    /// Wire payload.
    pub fn to_json(&self) -> serde_json::Value {
        use serde_json::json;

        let mut base = json!({
            "name": self.name(),
            "message": self.message,
            "code": self.code(),
            "className": self.class_name(),
        });

        if let Some(e) = &self.errors {
            base["errors"] = e.clone();
        }
        base
    }

    // ---- Constructors ----

    pub fn bad_request(msg: impl Into<String>) -> Self {
        Self::new(ErrorKind::BadRequest, msg)
    }
    pub fn conflict(msg: impl Into<String>) -> Self {
        Self::new(ErrorKind::Conflict, msg)
    }
    pub fn length_required(msg: impl Into<String>) -> Self {
        Self::new(ErrorKind::LengthRequired, msg)
    }
    pub fn payload_too_large(msg: impl Into<String>) -> Self {
        Self::new(ErrorKind::PayloadTooLarge, msg)
    }
    pub fn general_error(msg: impl Into<String>) -> Self {
        Self::new(ErrorKind::GeneralError, msg)
    }
    pub fn not_implemented(msg: impl Into<String>) -> Self {
        Self::new(ErrorKind::NotImplemented, msg)
    }
    pub fn bad_gateway(msg: impl Into<String>) -> Self {
        Self::new(ErrorKind::BadGateway, msg)
    }
}

impl fmt::Display for LinkError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({}): {}", self.name(), self.code(), self.message)
    }
}

impl std::error::Error for LinkError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.source
            .as_ref()
            .map(|e| e.as_ref() as &(dyn std::error::Error + 'static))
    }
}
