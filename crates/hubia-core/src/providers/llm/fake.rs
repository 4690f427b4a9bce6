use super::LlmClient;
use crate::model::{ChatMessage, LlmResponse};
use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::Mutex;
use std::time::Duration;

/// Scripted client: replies are handed out in order, every call is recorded.
/// Running out of replies is an error, which makes unexpected calls visible.
pub struct FakeClient {
    replies: Mutex<VecDeque<Result<String, String>>>,
    calls: Mutex<Vec<Vec<ChatMessage>>>,
    delay: Option<Duration>,
}

impl FakeClient {
    pub fn new<I, S>(replies: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            replies: Mutex::new(replies.into_iter().map(|s| Ok(s.into())).collect()),
            calls: Mutex::new(Vec::new()),
            delay: None,
        }
    }

    pub fn failing(message: &str) -> Self {
        let client = Self::new(Vec::<String>::new());
        client.push_error(message);
        client
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn push_reply(&self, reply: &str) {
        self.replies.lock().unwrap().push_back(Ok(reply.to_string()));
    }

    pub fn push_error(&self, message: &str) {
        self.replies.lock().unwrap().push_back(Err(message.to_string()));
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    pub fn calls(&self) -> Vec<Vec<ChatMessage>> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl LlmClient for FakeClient {
    async fn complete(&self, messages: &[ChatMessage]) -> anyhow::Result<LlmResponse> {
        self.calls.lock().unwrap().push(messages.to_vec());
        if let Some(d) = self.delay {
            tokio::time::sleep(d).await;
        }
        let next = self.replies.lock().unwrap().pop_front();
        match next {
            Some(Ok(text)) => Ok(LlmResponse {
                text,
                provider: "fake".into(),
                model: "fake".into(),
                meta: serde_json::json!({}),
            }),
            Some(Err(msg)) => anyhow::bail!("{}", msg),
            None => anyhow::bail!("fake client: no scripted reply left"),
        }
    }

    fn provider_name(&self) -> &'static str {
        "fake"
    }

    fn model(&self) -> &str {
        "fake"
    }
}
