use std::fmt;
use std::time::Duration;

use async_trait::async_trait;
use nh_core::{with_timeout, Error, LanguageModel, Result};
use reqwest::Client;
use serde::{Deserialize, Serialize};

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
}

#[derive(Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: Message,
}

#[derive(Deserialize)]
struct Message {
    #[serde(default)]
    content: Option<String>,
}

/// Any OpenAI-compatible chat completions endpoint. Defaults point at Gemini.
pub struct ChatModel {
    client: Client,
    api_key: String,
    base_url: String,
    model: String,
    timeout: Duration,
}

impl ChatModel {
    pub fn new(api_key: String, base_url: &str, model: &str, timeout: Duration) -> Result<Self> {
        if api_key.trim().is_empty() {
            return Err(Error::Config("Language model API key is required".to_string()));
        }
        Ok(Self {
            client: Client::builder().timeout(timeout).build()?,
            api_key,
            base_url: base_url.trim_end_matches('/').to_string(),
            model: model.to_string(),
            timeout,
        })
    }

    async fn complete(&self, prompt: &str) -> Result<String> {
        let request = ChatRequest {
            model: &self.model,
            messages: vec![ChatMessage {
                role: "user",
                content: prompt,
            }],
        };

        let response = self
            .client
            .post(format!("{}/chat/completions", self.base_url))
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(Error::Inference(format!(
                "{} returned status {}: {}",
                self.model,
                status,
                body.chars().take(200).collect::<String>()
            )));
        }

        let response: ChatResponse = response.json().await?;
        response
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .ok_or_else(|| Error::Inference(format!("{} returned no choices", self.model)))
    }
}

impl fmt::Debug for ChatModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ChatModel")
            .field("client", &"<reqwest::Client>")
            .field("api_key", &"<redacted>")
            .field("base_url", &self.base_url)
            .field("model", &self.model)
            .finish()
    }
}

#[async_trait]
impl LanguageModel for ChatModel {
    fn name(&self) -> &str {
        &self.model
    }

    async fn generate(&self, prompt: &str) -> Result<String> {
        if prompt.trim().is_empty() {
            return Err(Error::Precondition("prompt is empty".to_string()));
        }
        let started = std::time::Instant::now();
        let text = with_timeout(self.timeout, "generate", self.complete(prompt)).await?;
        tracing::debug!(
            model = %self.model,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "🧠 Generated {} chars",
            text.len()
        );
        Ok(text)
    }
}
