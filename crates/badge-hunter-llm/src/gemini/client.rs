// Gemini client implementation (HTTP direct, no SDK)

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, CONTENT_TYPE};
use serde_json::Value;

use super::types::GenerateContentResponse;
use crate::streaming::{parse_gemini_sse_stream, EventStream};
use crate::traits::{ChatClient, ChatOptions, ChatRequest, ChatResponse, TokenUsage};
use crate::types::Message;

const GEMINI_API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta";
const API_KEY_HEADER: &str = "x-goog-api-key";

pub struct GeminiClient {
    http_client: reqwest::Client,
    base_url: String,
}

impl GeminiClient {
    /// Create new client with API key
    pub fn new(api_key: impl Into<String>) -> Result<Self> {
        let api_key = api_key.into();

        let mut key_value = HeaderValue::from_str(&api_key).context("Invalid API key format")?;
        key_value.set_sensitive(true);

        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert(API_KEY_HEADER, key_value);

        let http_client = reqwest::Client::builder()
            .default_headers(headers)
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            http_client,
            base_url: GEMINI_API_BASE.to_string(),
        })
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Build generateContent request payload.
    ///
    /// System messages are folded into `systemInstruction`; the rest become
    /// `contents` with Gemini's `user`/`model` roles.
    pub fn build_request(&self, messages: &[Message], options: &ChatOptions) -> Value {
        let system: Vec<&str> = messages
            .iter()
            .filter_map(|m| match m {
                Message::System { content } => Some(content.as_str()),
                _ => None,
            })
            .collect();

        let contents: Vec<Value> = messages
            .iter()
            .filter_map(|m| match m {
                Message::System { .. } => None,
                Message::Human { content } => Some(serde_json::json!({
                    "role": "user",
                    "parts": [{ "text": content }],
                })),
                Message::AI { content } => Some(serde_json::json!({
                    "role": "model",
                    "parts": [{ "text": content }],
                })),
            })
            .collect();

        let mut request = serde_json::Map::new();
        request.insert("contents".to_string(), Value::Array(contents));

        if !system.is_empty() {
            request.insert(
                "systemInstruction".to_string(),
                serde_json::json!({ "parts": [{ "text": system.join("\n\n") }] }),
            );
        }

        let mut generation = serde_json::Map::new();
        if let Some(temp) = options.temperature {
            generation.insert("temperature".to_string(), serde_json::json!(temp));
        }
        if let Some(max_tokens) = options.max_output_tokens {
            generation.insert("maxOutputTokens".to_string(), serde_json::json!(max_tokens));
        }
        if let Some(budget) = options.thinking_budget {
            generation.insert(
                "thinkingConfig".to_string(),
                serde_json::json!({ "thinkingBudget": budget }),
            );
        }
        if !generation.is_empty() {
            request.insert("generationConfig".to_string(), Value::Object(generation));
        }

        Value::Object(request)
    }

    fn endpoint(&self, model: &str, method: &str) -> String {
        format!("{}/models/{}:{}", self.base_url, model, method)
    }
}

#[async_trait]
impl ChatClient for GeminiClient {
    async fn chat(&self, request: ChatRequest) -> Result<ChatResponse> {
        let payload = self.build_request(&request.messages, &request.options);

        let response = self
            .http_client
            .post(self.endpoint(&request.model, "generateContent"))
            .json(&payload)
            .send()
            .await
            .context("Failed to send request")?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            anyhow::bail!("Gemini API error ({}): {}", status, error_text);
        }

        let raw: GenerateContentResponse = response
            .json()
            .await
            .context("Failed to parse response")?;

        Ok(ChatResponse {
            content: raw.text(),
            usage: raw.usage_metadata.as_ref().map(|u| TokenUsage {
                input_tokens: u.prompt_token_count,
                output_tokens: u.candidates_token_count,
                total_tokens: u.total_token_count,
                reasoning_tokens: u.thoughts_token_count,
            }),
            finish_reason: raw.finish_reason(),
            raw: serde_json::to_value(raw)?,
        })
    }

    async fn chat_stream(&self, request: ChatRequest) -> Result<EventStream> {
        let payload = self.build_request(&request.messages, &request.options);

        tracing::debug!(model = %request.model, "Opening Gemini stream");

        let response = self
            .http_client
            .post(self.endpoint(&request.model, "streamGenerateContent"))
            .query(&[("alt", "sse")])
            .json(&payload)
            .send()
            .await
            .context("Failed to send request")?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            anyhow::bail!("Gemini API error ({}): {}", status, error_text);
        }

        Ok(parse_gemini_sse_stream(response))
    }
}
