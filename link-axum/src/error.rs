use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use link_blob::BlobError;
use link_core::errors::LinkError;
use tracing::error;

#[derive(Debug)]
pub struct LinkAxumError(pub anyhow::Error);

impl From<anyhow::Error> for LinkAxumError {
    fn from(e: anyhow::Error) -> Self {
        Self(e)
    }
}

impl From<LinkError> for LinkAxumError {
    fn from(e: LinkError) -> Self {
        Self(e.into_anyhow())
    }
}

impl From<BlobError> for LinkAxumError {
    fn from(e: BlobError) -> Self {
        Self(blob_error_to_link(e).into_anyhow())
    }
}

/// Upload failures keep their cause as the source; only the message reaches
/// the client.
pub fn blob_error_to_link(e: BlobError) -> LinkError {
    let message = e.to_string();
    let link = match &e {
        BlobError::MissingLength => LinkError::length_required(message),
        BlobError::Invalid { .. } => LinkError::bad_request(message),
        BlobError::Upstream { .. }
        | BlobError::InvalidResponse { .. }
        | BlobError::Http { .. }
        | BlobError::Serialization { .. } => LinkError::bad_gateway(message),
        BlobError::Io { .. } => LinkError::general_error(message),
    };
    link.with_source(e.into())
}

impl IntoResponse for LinkAxumError {
    fn into_response(self) -> Response {
        // Keep the structured fields of a LinkError even under anyhow context
        if let Some(link) = self.0.chain().find_map(|e| e.downcast_ref::<LinkError>()) {
            let safe = link.sanitize_for_client();
            let status = StatusCode::from_u16(safe.code())
                .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
            if status.is_server_error() {
                error!(error = %self.0, "request failed");
            }
            return (status, Json(safe.to_json())).into_response();
        }

        error!(error = ?self.0, "unhandled error");
        let safe = LinkError::normalize(self.0).sanitize_for_client();
        let status = StatusCode::from_u16(safe.code())
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        (status, Json(safe.to_json())).into_response()
    }
}
