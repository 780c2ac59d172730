use anyhow::Result;
use futures::Stream;
use reqwest::Response;
use serde::{Deserialize, Serialize};
use std::pin::Pin;

use crate::buffer_utils::{parse_sse_stream, SseLineParser};
use crate::gemini::GenerateContentResponse;

/// Lazy, finite, non-restartable sequence of provider events
pub type EventStream = Pin<Box<dyn Stream<Item = Result<StreamEvent>> + Send>>;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum StreamEvent {
    /// Model "thought" text, only present when the provider exposes it
    Reasoning {
        content: String,
    },

    Message {
        content: String,
    },

    Done {
        #[serde(skip_serializing_if = "Option::is_none")]
        finish_reason: Option<String>,
    },
}

impl GenerateContentResponse {
    pub(crate) fn to_stream_events(&self) -> Result<Vec<StreamEvent>> {
        if let Some(error) = &self.error {
            anyhow::bail!(
                "Gemini API error ({}): {}",
                error.status.as_deref().unwrap_or("UNKNOWN"),
                error.message
            );
        }

        if let Some(reason) = self
            .prompt_feedback
            .as_ref()
            .and_then(|f| f.block_reason.as_deref())
        {
            anyhow::bail!("Prompt blocked by provider: {}", reason);
        }

        let mut events = Vec::new();

        if let Some(candidate) = self.candidates.first() {
            if let Some(content) = &candidate.content {
                // One chunk is one fragment: its parts are joined, thoughts kept apart
                let mut reasoning = String::new();
                let mut message = String::new();
                for part in &content.parts {
                    let Some(text) = part.text.as_deref() else { continue };
                    if part.thought.unwrap_or(false) {
                        reasoning.push_str(text);
                    } else {
                        message.push_str(text);
                    }
                }

                if !reasoning.is_empty() {
                    events.push(StreamEvent::Reasoning { content: reasoning });
                }
                if !message.is_empty() {
                    events.push(StreamEvent::Message { content: message });
                }
            }

            if let Some(finish_reason) = &candidate.finish_reason {
                events.push(StreamEvent::Done {
                    finish_reason: Some(finish_reason.clone()),
                });
            }
        }

        Ok(events)
    }
}

/// Parses `streamGenerateContent?alt=sse` data lines
pub struct GeminiSseParser;

impl SseLineParser for GeminiSseParser {
    fn parse_data_line(&self, data: &str) -> Result<Vec<StreamEvent>> {
        let chunk: GenerateContentResponse = serde_json::from_str(data)
            .map_err(|e| anyhow::anyhow!("Failed to parse Gemini chunk: {}", e))?;
        chunk.to_stream_events()
    }
}

pub fn parse_gemini_sse_stream(response: Response) -> EventStream {
    parse_sse_stream(response.bytes_stream(), GeminiSseParser)
}
