//! Clients for optional external services.
//!
//! - [`ollama`] -- local language model used to draft PCR narratives.
//! - [`cloudinary`] -- image hosting for alert and PCR photos.

pub mod cloudinary;
pub mod ollama;

/// Errors from an external HTTP service.
#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    /// The HTTP request itself failed (network, DNS, TLS, timeout).
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The service returned a non-2xx status code.
    #[error("API error ({status}): {body}")]
    Api {
        /// HTTP status code.
        status: u16,
        /// Raw response body for debugging.
        body: String,
    },
}

/// Return the response unchanged on success, or [`ServiceError::Api`]
/// with the status and body text on failure.
pub(crate) async fn ensure_success(
    response: reqwest::Response,
) -> Result<reqwest::Response, ServiceError> {
    let status = response.status();
    if !status.is_success() {
        let body = response
            .text()
            .await
            .unwrap_or_else(|_| "<unreadable body>".to_string());
        return Err(ServiceError::Api {
            status: status.as_u16(),
            body,
        });
    }
    Ok(response)
}
