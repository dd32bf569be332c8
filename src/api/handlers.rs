use crate::error::Result;
use crate::service::{extract_invoice, DanfeRenderer};
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;

/// Liveness check
pub async fn health_check() -> &'static str {
    "OK"
}

/// DANFE generation endpoint.
///
/// The request body is the raw NF-e XML; the response is the rendered PDF as
/// a downloadable attachment. Structural problems in the document come back
/// as 400 with a plain-text diagnostic, and the whole PDF is buffered before
/// the first response byte, so an error can never follow a partial body.
pub async fn generate_danfe(body: String) -> Result<impl IntoResponse> {
    let invoice = extract_invoice(&body)?;
    let pdf = DanfeRenderer::new().render(&invoice)?;

    tracing::info!(
        "DANFE generated for key {} ({} bytes)",
        invoice.access_key,
        pdf.len()
    );

    Ok((
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, "application/pdf"),
            (header::CONTENT_DISPOSITION, "attachment; filename=danfe.pdf"),
        ],
        pdf,
    ))
}
