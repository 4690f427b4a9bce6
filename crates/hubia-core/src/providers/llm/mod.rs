use crate::config::{AppConfig, ProviderKind};
use crate::errors::QueryError;
use crate::model::{ChatMessage, LlmResponse};
use async_trait::async_trait;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::time::timeout;

/// Text-completion capability: role-tagged messages in, text out.
#[async_trait]
pub trait LlmClient: Send + Sync {
    async fn complete(&self, messages: &[ChatMessage]) -> anyhow::Result<LlmResponse>;
    fn provider_name(&self) -> &'static str;
    fn model(&self) -> &str;
}

pub mod fake;
pub mod ollama;
pub mod openai;

/// Picks the backend once, at construction.
pub fn build_client(cfg: &AppConfig) -> anyhow::Result<Arc<dyn LlmClient>> {
    let client: Arc<dyn LlmClient> = match cfg.provider {
        ProviderKind::Ollama => Arc::new(ollama::OllamaClient::new(
            cfg.ollama_host.clone(),
            cfg.model_name.clone(),
        )),
        ProviderKind::OpenAi => {
            let key = cfg
                .openai_api_key
                .clone()
                .ok_or_else(|| anyhow::anyhow!("OPENAI_API_KEY required for openai provider"))?;
            Arc::new(openai::OpenAIClient::new(
                cfg.openai_base_url.clone(),
                cfg.model_name.clone(),
                key,
                0.0,
                512,
            ))
        }
    };
    Ok(client)
}

/// One model call under a deadline. Backend failures become
/// `ModelUnavailable`, an expired deadline becomes `Timeout`.
pub async fn complete_bounded(
    client: &dyn LlmClient,
    messages: &[ChatMessage],
    limit: Duration,
) -> Result<LlmResponse, QueryError> {
    let started = Instant::now();
    match timeout(limit, client.complete(messages)).await {
        Ok(Ok(resp)) => {
            tracing::debug!(
                event = "model_call_ok",
                provider = client.provider_name(),
                model = client.model(),
                latency_ms = started.elapsed().as_millis() as u64
            );
            Ok(resp)
        }
        Ok(Err(e)) => {
            tracing::error!(
                event = "model_call_failed",
                provider = client.provider_name(),
                error = %e
            );
            Err(QueryError::ModelUnavailable {
                provider: client.provider_name().to_string(),
                message: format!("{:#}", e),
            })
        }
        Err(_) => {
            tracing::error!(
                event = "model_call_timeout",
                provider = client.provider_name(),
                after_ms = limit.as_millis() as u64
            );
            Err(QueryError::Timeout {
                after_ms: limit.as_millis() as u64,
            })
        }
    }
}
