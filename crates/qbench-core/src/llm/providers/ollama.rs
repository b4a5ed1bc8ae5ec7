//! Ollama backend (native generate API)

use super::images::image_to_base64;
use crate::error::{BenchError, BenchResult};
use crate::llm::backend::Backend;
use crate::llm::prompt::{PromptBuilder, extract_answer};
use crate::llm::question::{BackendKind, Question};
use async_trait::async_trait;
use reqwest::Client;
use serde_json::{Value, json};
use tracing::instrument;

/// Ollama `/api/generate` backend
pub struct OllamaBackend {
    kind: BackendKind,
    model: String,
    base_url: String,
    temperature: Option<f32>,
    max_tokens: Option<u32>,
    http_client: Client,
}

impl OllamaBackend {
    /// Create a new Ollama backend
    pub fn new(
        kind: BackendKind,
        model: impl Into<String>,
        base_url: impl Into<String>,
        http_client: Client,
    ) -> Self {
        Self {
            kind,
            model: model.into(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            temperature: None,
            max_tokens: None,
            http_client,
        }
    }

    /// Set sampling options
    pub fn with_options(mut self, temperature: Option<f32>, max_tokens: Option<u32>) -> Self {
        self.temperature = temperature;
        self.max_tokens = max_tokens;
        self
    }

    pub(crate) fn request_body(&self, prompt: &str, images: Vec<String>) -> Value {
        let mut body = json!({
            "model": self.model,
            "prompt": prompt,
            "stream": false,
        });

        let mut options = serde_json::Map::new();
        if let Some(temperature) = self.temperature {
            options.insert("temperature".into(), json!(temperature));
        }
        if let Some(max_tokens) = self.max_tokens {
            options.insert("num_predict".into(), json!(max_tokens));
        }
        if !options.is_empty() {
            body["options"] = Value::Object(options);
        }
        if !images.is_empty() {
            body["images"] = json!(images);
        }
        body
    }

    pub(crate) fn parse_response(response: &Value) -> BenchResult<String> {
        if let Some(error) = response.get("error").and_then(Value::as_str) {
            return Err(BenchError::backend_with_provider(error, "ollama"));
        }
        response
            .get("response")
            .and_then(Value::as_str)
            .map(str::to_string)
            .ok_or_else(|| BenchError::backend_with_provider("response field missing", "ollama"))
    }
}

#[async_trait]
impl Backend for OllamaBackend {
    fn name(&self) -> String {
        format!("ollama/{}", self.model)
    }

    fn kind(&self) -> BackendKind {
        self.kind
    }

    #[instrument(skip(self, question), fields(model = %self.model), level = "debug")]
    async fn invoke(&self, question: &Question) -> BenchResult<String> {
        let prompt = PromptBuilder::build(question);
        let mut images = Vec::with_capacity(question.images.len());
        for image in &question.images {
            images.push(image_to_base64(&self.http_client, image).await?);
        }

        let url = format!("{}/api/generate", self.base_url);
        let body = self.request_body(&prompt, images);

        let response = self.http_client.post(&url).json(&body).send().await?;
        let response = super::check_status(response, "Ollama").await?;
        let response_json: Value = response.json().await?;

        let text = Self::parse_response(&response_json)?;
        extract_answer(&text, question.choices())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn backend() -> OllamaBackend {
        OllamaBackend::new(BackendKind::Multimodal, "llava", "http://localhost:11434/", Client::new())
            .with_options(Some(0.5), Some(256))
    }

    #[test]
    fn test_request_body_shape() {
        let body = backend().request_body("Question: hi", vec!["QUJD".into()]);
        assert_eq!(body["model"], "llava");
        assert_eq!(body["stream"], false);
        assert_eq!(body["options"]["temperature"], 0.5);
        assert_eq!(body["options"]["num_predict"], 256);
        assert_eq!(body["images"][0], "QUJD");
    }

    #[test]
    fn test_text_request_has_no_images() {
        let backend = OllamaBackend::new(BackendKind::Text, "llama3.2", "http://h", Client::new());
        let body = backend.request_body("Question: hi", vec![]);
        assert!(body.get("images").is_none());
        assert!(body.get("options").is_none());
    }

    #[test]
    fn test_parse_response() {
        let ok = json!({"model": "llava", "response": "Answer: A", "done": true});
        assert_eq!(OllamaBackend::parse_response(&ok).unwrap(), "Answer: A");

        let err = json!({"error": "model 'llava' not found"});
        assert!(OllamaBackend::parse_response(&err).is_err());
    }

    #[test]
    fn test_name_and_base_url_normalized() {
        let backend = backend();
        assert_eq!(backend.name(), "ollama/llava");
        assert_eq!(backend.base_url, "http://localhost:11434");
    }
}
