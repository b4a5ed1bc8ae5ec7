//! Image loading and encoding for multimodal requests

use crate::error::{BenchError, BenchResult};
use crate::llm::question::ImageRef;
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use reqwest::Client;
use std::path::Path;

/// Resolve an image to raw base64 (no data-URI prefix)
pub async fn image_to_base64(client: &Client, image: &ImageRef) -> BenchResult<String> {
    match image {
        ImageRef::Base64(data) => Ok(data.clone()),
        ImageRef::Path(path) => {
            let bytes = tokio::fs::read(path).await.map_err(|e| {
                BenchError::io_with_path(format!("Failed to read image: {}", e), path.display().to_string())
            })?;
            Ok(STANDARD.encode(bytes))
        }
        ImageRef::Url(url) => {
            let response = client.get(url).send().await?;
            let response = super::check_status(response, "image host").await?;
            let bytes = response.bytes().await?;
            Ok(STANDARD.encode(bytes))
        }
    }
}

/// Resolve an image to something an OpenAI-style `image_url` accepts
pub async fn image_to_url(image: &ImageRef) -> BenchResult<String> {
    match image {
        ImageRef::Url(url) => Ok(url.clone()),
        ImageRef::Base64(data) => Ok(format!("data:image/png;base64,{}", data)),
        ImageRef::Path(path) => {
            let bytes = tokio::fs::read(path).await.map_err(|e| {
                BenchError::io_with_path(format!("Failed to read image: {}", e), path.display().to_string())
            })?;
            Ok(format!("data:{};base64,{}", mime_for(path), STANDARD.encode(bytes)))
        }
    }
}

fn mime_for(path: &Path) -> &'static str {
    match path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
        .as_deref()
    {
        Some("jpg") | Some("jpeg") => "image/jpeg",
        Some("gif") => "image/gif",
        Some("webp") => "image/webp",
        _ => "image/png",
    }
}
