//! Image uploads (alert photos, PCR attachments) to Cloudinary.

use axum::extract::{Multipart, State};
use axum::http::StatusCode;
use axum::Json;

use crate::error::{AppError, AppResult};
use crate::middleware::auth::Actor;
use crate::response::DataResponse;
use crate::services::cloudinary::{self, UploadedImage};
use crate::state::AppState;

/// Largest accepted image, in bytes (5 MiB).
pub const MAX_IMAGE_BYTES: usize = 5 * 1024 * 1024;

/// Request body limit for the upload route: the image plus multipart framing.
pub const UPLOAD_BODY_LIMIT: usize = MAX_IMAGE_BYTES + 64 * 1024;

/// Check the declared content type and the size of an uploaded file.
pub fn validate_image(content_type: Option<&str>, len: usize) -> AppResult<()> {
    match content_type {
        Some(ct) if ct.starts_with("image/") => {}
        other => {
            return Err(AppError::BadRequest(format!(
                "Only image uploads are accepted (got '{}')",
                other.unwrap_or("unknown")
            )))
        }
    }
    if len == 0 {
        return Err(AppError::BadRequest("Uploaded file is empty".into()));
    }
    if len > MAX_IMAGE_BYTES {
        return Err(AppError::BadRequest("Image must be at most 5 MiB".into()));
    }
    Ok(())
}

/// POST /api/uploads/image
///
/// Multipart form with a required `file` field. Returns the hosted URL.
pub async fn upload_image(
    State(state): State<AppState>,
    Actor(account): Actor,
    mut multipart: Multipart,
) -> AppResult<(StatusCode, Json<DataResponse<UploadedImage>>)> {
    let config = state.config.cloudinary.as_ref().ok_or_else(|| {
        AppError::ServiceUnavailable("Image uploads are not configured".into())
    })?;

    let mut file: Option<(String, String, Vec<u8>)> = None;
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::BadRequest(e.to_string()))?
    {
        if field.name() != Some("file") {
            continue;
        }
        let filename = field.file_name().unwrap_or("upload").to_string();
        let content_type = field.content_type().map(str::to_string);
        let data = field
            .bytes()
            .await
            .map_err(|e| AppError::BadRequest(e.to_string()))?;
        validate_image(content_type.as_deref(), data.len())?;
        file = Some((filename, content_type.unwrap_or_default(), data.to_vec()));
    }

    let (filename, content_type, data) =
        file.ok_or_else(|| AppError::BadRequest("Missing required 'file' field".into()))?;
    let size = data.len();

    let uploaded = cloudinary::upload_image(&state.http, config, data, filename, &content_type)
        .await
        .map_err(|e| AppError::Upstream(e.to_string()))?;

    tracing::info!(
        account_type = %account.account_type,
        account_id = account.id,
        public_id = %uploaded.public_id,
        bytes = size,
        "Image uploaded",
    );
    Ok((StatusCode::CREATED, Json(DataResponse { data: uploaded })))
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;

    #[test]
    fn accepts_images_within_limit() {
        assert!(validate_image(Some("image/jpeg"), 1024).is_ok());
        assert!(validate_image(Some("image/png"), MAX_IMAGE_BYTES).is_ok());
    }

    #[test]
    fn rejects_other_types_and_oversize() {
        assert_matches!(
            validate_image(Some("application/pdf"), 10),
            Err(AppError::BadRequest(_))
        );
        assert!(validate_image(None, 10).is_err());
        assert!(validate_image(Some("image/png"), MAX_IMAGE_BYTES + 1).is_err());
        assert!(validate_image(Some("image/png"), 0).is_err());
    }
}
