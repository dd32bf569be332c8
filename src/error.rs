use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use thiserror::Error;

/// Every failure a DANFE request can surface.
///
/// Structural problems in the submitted document (malformed XML, a missing
/// element on the fixed extraction path, an unparseable amount) are client
/// errors; only a failure while serializing the PDF itself is a server error.
#[derive(Debug, Error)]
pub enum DanfeError {
    #[error("invalid XML: {0}")]
    InvalidXml(#[from] roxmltree::Error),

    #[error("required element <{0}> is missing")]
    MissingElement(&'static str),

    #[error("required attribute '{0}' is missing")]
    MissingAttribute(&'static str),

    #[error("field <{field}> is not a valid number")]
    InvalidNumber { field: &'static str },

    #[error("PDF generation failed: {0}")]
    Pdf(#[from] lopdf::Error),
}

impl DanfeError {
    fn status(&self) -> StatusCode {
        match self {
            Self::Pdf(_) => StatusCode::INTERNAL_SERVER_ERROR,
            _ => StatusCode::BAD_REQUEST,
        }
    }
}

impl IntoResponse for DanfeError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!("request failed: {}", self);
        } else {
            tracing::warn!("rejected request: {}", self);
        }
        (status, self.to_string()).into_response()
    }
}

pub type Result<T> = std::result::Result<T, DanfeError>;
