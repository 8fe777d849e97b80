//! Cloudinary signed image upload.
//!
//! Uploads are signed server-side so the API secret never reaches clients:
//! the signature is the SHA-256 hex digest of the sorted upload parameters
//! followed by the secret.

use reqwest::multipart::{Form, Part};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use super::{ensure_success, ServiceError};

/// Account credentials for signed uploads.
#[derive(Debug, Clone)]
pub struct CloudinaryConfig {
    pub cloud_name: String,
    pub api_key: String,
    pub api_secret: String,
}

/// Where an uploaded image landed.
#[derive(Debug, Clone, Serialize)]
pub struct UploadedImage {
    pub url: String,
    pub public_id: String,
}

/// The fields we keep from Cloudinary's upload response. The plain-http
/// `url` it also returns is ignored.
#[derive(Debug, Deserialize)]
struct UploadResponse {
    secure_url: String,
    public_id: String,
}

impl From<UploadResponse> for UploadedImage {
    fn from(raw: UploadResponse) -> Self {
        Self {
            url: raw.secure_url,
            public_id: raw.public_id,
        }
    }
}

/// Signature over `params` (name/value pairs, any order).
///
/// Parameters are sorted by name, joined as `a=1&b=2`, and the secret is
/// appended before hashing.
pub fn sign(params: &[(&str, &str)], api_secret: &str) -> String {
    let mut sorted = params.to_vec();
    sorted.sort_by(|a, b| a.0.cmp(b.0));
    let joined = sorted
        .iter()
        .map(|(k, v)| format!("{k}={v}"))
        .collect::<Vec<_>>()
        .join("&");

    let mut hasher = Sha256::new();
    hasher.update(joined.as_bytes());
    hasher.update(api_secret.as_bytes());
    format!("{:x}", hasher.finalize())
}

/// Upload an image and return its HTTPS URL and public id.
pub async fn upload_image(
    client: &reqwest::Client,
    config: &CloudinaryConfig,
    bytes: Vec<u8>,
    filename: String,
    content_type: &str,
) -> Result<UploadedImage, ServiceError> {
    let timestamp = chrono::Utc::now().timestamp().to_string();
    let signature = sign(&[("timestamp", &timestamp)], &config.api_secret);

    let part = Part::bytes(bytes)
        .file_name(filename)
        .mime_str(content_type)?;
    let form = Form::new()
        .part("file", part)
        .text("api_key", config.api_key.clone())
        .text("timestamp", timestamp)
        .text("signature", signature)
        .text("signature_algorithm", "sha256");

    let response = client
        .post(format!(
            "https://api.cloudinary.com/v1_1/{}/image/upload",
            config.cloud_name
        ))
        .multipart(form)
        .send()
        .await?;

    let raw: UploadResponse = ensure_success(response).await?.json().await?;
    Ok(raw.into())
}
