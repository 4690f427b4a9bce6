use super::LlmClient;
use crate::model::{ChatMessage, LlmResponse};
use async_trait::async_trait;
use serde_json::json;

/// Local Ollama server, non-streaming `/api/chat`.
pub struct OllamaClient {
    pub host: String,
    pub model: String,
    pub client: reqwest::Client,
}

impl OllamaClient {
    pub fn new(host: String, model: String) -> Self {
        Self {
            host,
            model,
            client: reqwest::Client::new(),
        }
    }
}

#[async_trait]
impl LlmClient for OllamaClient {
    async fn complete(&self, messages: &[ChatMessage]) -> anyhow::Result<LlmResponse> {
        let url = format!("{}/api/chat", self.host.trim_end_matches('/'));

        let body = json!({
            "model": self.model,
            "messages": messages,
            "stream": false,
        });

        let resp = self.client.post(&url).json(&body).send().await.map_err(|e| {
            anyhow::anyhow!("ollama not reachable at {}: {}", self.host, e)
        })?;

        if !resp.status().is_success() {
            let status = resp.status();
            let error_text = resp.text().await.unwrap_or_default();
            if status == reqwest::StatusCode::NOT_FOUND {
                anyhow::bail!(
                    "model '{}' not available ({}); run `ollama pull {}`",
                    self.model,
                    error_text,
                    self.model
                );
            }
            anyhow::bail!("Ollama chat API error ({}): {}", status, error_text);
        }

        let json: serde_json::Value = resp.json().await?;

        let text = json
            .pointer("/message/content")
            .and_then(|v| v.as_str())
            .ok_or_else(|| anyhow::anyhow!("Ollama response missing message.content"))?
            .to_string();

        Ok(LlmResponse {
            text,
            provider: "ollama".to_string(),
            model: self.model.clone(),
            meta: json!({
                "eval_count": json.get("eval_count").cloned().unwrap_or_default(),
                "total_duration": json.get("total_duration").cloned().unwrap_or_default(),
            }),
        })
    }

    fn provider_name(&self) -> &'static str {
        "ollama"
    }

    fn model(&self) -> &str {
        &self.model
    }
}
