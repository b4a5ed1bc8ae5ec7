//! HTTP model backends

mod images;
mod ollama;
mod openai;

pub use images::{image_to_base64, image_to_url};
pub use ollama::OllamaBackend;
pub use openai::OpenAiBackend;

use crate::error::BenchError;
use reqwest::Response;

/// Turn a non-success response into an error carrying its status
pub(crate) async fn check_status(response: Response, provider: &str) -> Result<Response, BenchError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let url = response.url().to_string();
    let body = response.text().await.unwrap_or_default();
    Err(BenchError::http(
        format!("{} API error (status {}): {}", provider, status, body),
        Some(url),
        Some(status.as_u16()),
    ))
}
