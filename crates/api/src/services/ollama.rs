//! Ollama text generation (`POST /api/generate`).

use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::{ensure_success, ServiceError};

/// Connection settings for a local Ollama server.
#[derive(Debug, Clone)]
pub struct OllamaConfig {
    /// Base URL without a trailing slash, e.g. `http://localhost:11434`.
    pub host: String,
    pub model: String,
    /// Whole-request timeout; generation on CPU can be slow.
    pub timeout_secs: u64,
}

#[derive(Debug, Serialize)]
struct GenerateRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    stream: bool,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    response: String,
}

/// Run a single non-streaming completion and return the generated text,
/// trimmed.
pub async fn generate(
    client: &reqwest::Client,
    config: &OllamaConfig,
    prompt: &str,
) -> Result<String, ServiceError> {
    let body = GenerateRequest {
        model: &config.model,
        prompt,
        stream: false,
    };

    let response = client
        .post(format!("{}/api/generate", config.host))
        .timeout(Duration::from_secs(config.timeout_secs))
        .json(&body)
        .send()
        .await?;

    let parsed: GenerateResponse = ensure_success(response).await?.json().await?;
    Ok(parsed.response.trim().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_disables_streaming() {
        let body = GenerateRequest {
            model: "llama3",
            prompt: "hi",
            stream: false,
        };
        assert_eq!(
            serde_json::to_value(&body).unwrap(),
            serde_json::json!({ "model": "llama3", "prompt": "hi", "stream": false })
        );
    }
}
