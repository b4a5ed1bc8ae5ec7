//! Factory building HTTP backends from configuration

use super::backend::{Backend, BackendFactory};
use super::providers::{OllamaBackend, OpenAiBackend};
use super::question::BackendKind;
use crate::config::{BenchConfig, ProviderKind, timeouts};
use crate::error::{BenchError, BenchResult};
use async_trait::async_trait;
use reqwest::Client;
use std::sync::Arc;

/// Builds the configured provider's backend for each kind.
///
/// All backends share one connection pool.
pub struct HttpBackendFactory {
    config: BenchConfig,
    http_client: Client,
}

impl HttpBackendFactory {
    /// Create a factory for `config`
    pub fn new(config: BenchConfig) -> BenchResult<Self> {
        let http_client = Client::builder()
            .connect_timeout(timeouts::backend::connect_timeout())
            .build()
            .map_err(|e| BenchError::config(format!("Failed to build HTTP client: {}", e)))?;
        Ok(Self {
            config,
            http_client,
        })
    }

    /// Create a factory reusing an existing client
    pub fn with_client(config: BenchConfig, http_client: Client) -> Self {
        Self {
            config,
            http_client,
        }
    }
}

#[async_trait]
impl BackendFactory for HttpBackendFactory {
    async fn construct(&self, kind: BackendKind) -> BenchResult<Arc<dyn Backend>> {
        let model = kind.model_name(&self.config).to_string();
        let base_url = self.config.effective_base_url().to_string();
        let temperature = self.config.temperature;
        let max_tokens = self.config.max_tokens;

        tracing::info!(
            provider = %self.config.provider,
            kind = %kind,
            model = %model,
            "Constructing model backend"
        );

        let backend: Arc<dyn Backend> = match self.config.provider {
            ProviderKind::Ollama => Arc::new(
                OllamaBackend::new(kind, model, base_url, self.http_client.clone())
                    .with_options(temperature, max_tokens),
            ),
            ProviderKind::OpenAi => Arc::new(
                OpenAiBackend::new(
                    kind,
                    model,
                    base_url,
                    self.config.api_key.clone(),
                    self.http_client.clone(),
                )
                .with_options(temperature, max_tokens),
            ),
        };
        Ok(backend)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_constructs_model_per_kind() {
        let config = BenchConfig::default().with_models("llama3.2", "llava");
        let factory = HttpBackendFactory::new(config).unwrap();

        let text = factory.construct(BackendKind::Text).await.unwrap();
        let multimodal = factory.construct(BackendKind::Multimodal).await.unwrap();
        assert_eq!(text.name(), "ollama/llama3.2");
        assert_eq!(text.kind(), BackendKind::Text);
        assert_eq!(multimodal.name(), "ollama/llava");
        assert_eq!(multimodal.kind(), BackendKind::Multimodal);
    }

    #[tokio::test]
    async fn test_openai_provider() {
        let config = BenchConfig::default()
            .with_provider(ProviderKind::OpenAi, None)
            .with_models("gpt-4o-mini", "gpt-4o");
        let factory = HttpBackendFactory::with_client(config, Client::new());

        let backend = factory.construct(BackendKind::Multimodal).await.unwrap();
        assert_eq!(backend.name(), "openai/gpt-4o");
    }
}
