//! OpenAI-compatible chat completions backend

use super::images::image_to_url;
use crate::error::{BenchError, BenchResult};
use crate::llm::backend::Backend;
use crate::llm::prompt::{PromptBuilder, extract_answer};
use crate::llm::question::{BackendKind, Question};
use async_trait::async_trait;
use reqwest::Client;
use serde_json::{Value, json};
use tracing::instrument;

/// `/chat/completions` backend for OpenAI and compatible servers
pub struct OpenAiBackend {
    kind: BackendKind,
    model: String,
    base_url: String,
    api_key: Option<String>,
    temperature: Option<f32>,
    max_tokens: Option<u32>,
    http_client: Client,
}

impl OpenAiBackend {
    /// Create a new OpenAI-compatible backend
    pub fn new(
        kind: BackendKind,
        model: impl Into<String>,
        base_url: impl Into<String>,
        api_key: Option<String>,
        http_client: Client,
    ) -> Self {
        Self {
            kind,
            model: model.into(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key,
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

    pub(crate) fn request_body(&self, prompt: &str, image_urls: Vec<String>) -> Value {
        let content = if image_urls.is_empty() {
            json!(prompt)
        } else {
            let mut parts = vec![json!({"type": "text", "text": prompt})];
            parts.extend(
                image_urls
                    .into_iter()
                    .map(|url| json!({"type": "image_url", "image_url": {"url": url}})),
            );
            Value::Array(parts)
        };

        let mut body = json!({
            "model": self.model,
            "messages": [{"role": "user", "content": content}],
        });
        if let Some(temperature) = self.temperature {
            body["temperature"] = json!(temperature);
        }
        if let Some(max_tokens) = self.max_tokens {
            body["max_tokens"] = json!(max_tokens);
        }
        body
    }

    pub(crate) fn parse_response(response: &Value) -> BenchResult<String> {
        if let Some(message) = response
            .get("error")
            .and_then(|e| e.get("message"))
            .and_then(Value::as_str)
        {
            return Err(BenchError::backend_with_provider(message, "openai"));
        }
        response
            .pointer("/choices/0/message/content")
            .and_then(Value::as_str)
            .map(str::to_string)
            .ok_or_else(|| BenchError::backend_with_provider("choices[0].message.content missing", "openai"))
    }
}

#[async_trait]
impl Backend for OpenAiBackend {
    fn name(&self) -> String {
        format!("openai/{}", self.model)
    }

    fn kind(&self) -> BackendKind {
        self.kind
    }

    #[instrument(skip(self, question), fields(model = %self.model), level = "debug")]
    async fn invoke(&self, question: &Question) -> BenchResult<String> {
        let prompt = PromptBuilder::build(question);
        let mut image_urls = Vec::with_capacity(question.images.len());
        for image in &question.images {
            image_urls.push(image_to_url(image).await?);
        }

        let url = format!("{}/chat/completions", self.base_url);
        let mut request = self
            .http_client
            .post(&url)
            .json(&self.request_body(&prompt, image_urls));
        if let Some(api_key) = &self.api_key {
            request = request.bearer_auth(api_key);
        }

        let response = request.send().await?;
        let response = super::check_status(response, "OpenAI").await?;
        let response_json: Value = response.json().await?;

        let text = Self::parse_response(&response_json)?;
        extract_answer(&text, question.choices())
    }
}
