//! Badge Advisor: streams model advice chunk by chunk and never fails outward.
//!
//! Every failure (request setup, provider error mid-stream, transport) is
//! reported to the caller as one final [`ERROR_NOTICE`] chunk appended after
//! whatever text was already delivered.

use std::sync::{Arc, Mutex, MutexGuard};

use anyhow::Result;
use futures::future::{AbortRegistration, Abortable};
use futures::StreamExt;
use serde::{Deserialize, Serialize};

use badge_hunter_types::{Conversation, MessageHandle};

use crate::streaming::StreamEvent;
use crate::traits::{ChatClient, ChatOptions, ChatRequest};
use crate::types::Message;

/// Fixed persona sent as the system instruction of every request
pub const SYSTEM_INSTRUCTION: &str = "You are a GitHub Profile Achievement Expert. \
Your goal is to help developers understand, earn, and strategize about GitHub Badges. \
You have deep knowledge of all badges (Starstruck, Pull Shark, etc.) and how to troubleshoot missing ones. \
Be encouraging, concise, and technically accurate. \
If asked about \"strategy\", focus on how to contribute meaningfully to open source to earn badges naturally. \
Refer to badges by their official names.";

pub const ERROR_NOTICE: &str =
    "\n\n*Error: Unable to reach the Badge Advisor. Please check your connection or try again later.*";

pub const DEFAULT_FAST_MODEL: &str = "gemini-2.5-flash-lite";
pub const DEFAULT_DEEP_MODEL: &str = "gemini-3-pro-preview";
pub const DEFAULT_DEEP_THINKING_BUDGET: u32 = 32768;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AdviceMode {
    /// Low-latency model, no reasoning budget
    #[default]
    Fast,
    /// Slower model with an enlarged internal reasoning budget
    Deep,
}

impl AdviceMode {
    pub fn from_deep(use_deep_mode: bool) -> Self {
        if use_deep_mode {
            Self::Deep
        } else {
            Self::Fast
        }
    }

    pub fn is_deep(&self) -> bool {
        matches!(self, Self::Deep)
    }
}

/// Model selection for both advice modes
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AdviceModels {
    pub fast_model: String,
    pub deep_model: String,
    pub deep_thinking_budget: u32,
}

impl Default for AdviceModels {
    fn default() -> Self {
        Self {
            fast_model: DEFAULT_FAST_MODEL.to_string(),
            deep_model: DEFAULT_DEEP_MODEL.to_string(),
            deep_thinking_budget: DEFAULT_DEEP_THINKING_BUDGET,
        }
    }
}

/// How a streamed exchange ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdviceOutcome {
    /// Stream closed normally
    Completed,
    /// An error occurred; the error notice was delivered as the last chunk
    Failed,
    /// Aborted by the caller; nothing further was delivered
    Cancelled,
}

pub struct BadgeAdvisor {
    client: Arc<dyn ChatClient>,
    models: AdviceModels,
}

impl BadgeAdvisor {
    pub fn new(client: Arc<dyn ChatClient>) -> Self {
        Self::with_models(client, AdviceModels::default())
    }

    pub fn with_models(client: Arc<dyn ChatClient>, models: AdviceModels) -> Self {
        Self { client, models }
    }

    pub fn models(&self) -> &AdviceModels {
        &self.models
    }

    pub fn build_request(&self, prompt: &str, mode: AdviceMode) -> ChatRequest {
        let messages = vec![Message::system(SYSTEM_INSTRUCTION), Message::human(prompt)];

        match mode {
            AdviceMode::Fast => ChatRequest::new(&self.models.fast_model, messages),
            AdviceMode::Deep => ChatRequest::new(&self.models.deep_model, messages).with_options(
                ChatOptions::new().thinking_budget(self.models.deep_thinking_budget),
            ),
        }
    }

    /// Stream advice for `prompt`, calling `on_chunk` once per text fragment in
    /// arrival order. Fragments are not cumulative.
    pub async fn stream_advice<F>(&self, prompt: &str, mode: AdviceMode, mut on_chunk: F) -> AdviceOutcome
    where
        F: FnMut(&str) + Send,
    {
        let result = self.forward_stream(prompt, mode, &mut on_chunk).await;
        Self::finish(result, &mut on_chunk)
    }

    /// Like [`stream_advice`](Self::stream_advice), but stops as soon as the
    /// paired `AbortHandle` fires. A cancelled stream gets no error notice.
    pub async fn stream_advice_abortable<F>(
        &self,
        prompt: &str,
        mode: AdviceMode,
        registration: AbortRegistration,
        mut on_chunk: F,
    ) -> AdviceOutcome
    where
        F: FnMut(&str) + Send,
    {
        let result = Abortable::new(self.forward_stream(prompt, mode, &mut on_chunk), registration).await;

        match result {
            Ok(result) => Self::finish(result, &mut on_chunk),
            Err(_aborted) => {
                tracing::info!(mode = ?mode, "Advice stream cancelled");
                AdviceOutcome::Cancelled
            }
        }
    }

    /// Run one exchange against a shared transcript.
    ///
    /// Appends the user turn, reserves an assistant message (flagged pending in
    /// deep mode) and streams into that message through its handle. Returns
    /// `None` without touching the transcript when the prompt is blank.
    pub async fn ask(
        &self,
        conversation: &Mutex<Conversation>,
        prompt: &str,
        mode: AdviceMode,
    ) -> Option<(MessageHandle, AdviceOutcome)> {
        let prompt = prompt.trim();
        if prompt.is_empty() {
            return None;
        }

        let handle = {
            let mut transcript = lock(conversation);
            transcript.push_user(prompt);
            transcript.begin_assistant(mode.is_deep())
        };

        let outcome = self
            .stream_advice(prompt, mode, |chunk| {
                if let Err(e) = lock(conversation).append(handle, chunk) {
                    tracing::warn!(error = %e, "Dropped advice chunk");
                }
            })
            .await;

        if let Err(e) = lock(conversation).settle(handle) {
            tracing::warn!(error = %e, "Could not settle advice message");
        }

        Some((handle, outcome))
    }

    async fn forward_stream<F>(&self, prompt: &str, mode: AdviceMode, on_chunk: &mut F) -> Result<()>
    where
        F: FnMut(&str) + Send,
    {
        let request = self.build_request(prompt, mode);
        tracing::debug!(model = %request.model, mode = ?mode, "Requesting badge advice");

        let mut stream = self.client.chat_stream(request).await?;
        let mut fragments = 0usize;

        while let Some(event) = stream.next().await {
            match event? {
                StreamEvent::Message { content } => {
                    fragments += 1;
                    on_chunk(&content);
                }
                StreamEvent::Reasoning { content } => {
                    tracing::trace!(len = content.len(), "Skipping reasoning fragment");
                }
                StreamEvent::Done { finish_reason } => {
                    tracing::debug!(?finish_reason, fragments, "Advice stream finished");
                }
            }
        }

        Ok(())
    }

    fn finish<F>(result: Result<()>, on_chunk: &mut F) -> AdviceOutcome
    where
        F: FnMut(&str),
    {
        match result {
            Ok(()) => AdviceOutcome::Completed,
            Err(e) => {
                tracing::warn!(error = %e, "Badge advisor stream failed");
                on_chunk(ERROR_NOTICE);
                AdviceOutcome::Failed
            }
        }
    }
}

fn lock(conversation: &Mutex<Conversation>) -> MutexGuard<'_, Conversation> {
    conversation.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}
