use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

pub const ADVISOR_GREETING: &str = "Hi! I'm your Badge Advisor. Ask me how to earn a specific badge or how to improve your GitHub profile!";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    User,
    Assistant,
}

/// One entry of the in-memory advisor transcript
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: ChatRole,
    pub text: String,
    /// Assistant slot reserved but no streamed text received yet
    #[serde(default)]
    pub pending: bool,
    pub created_at: DateTime<Utc>,
}

impl ChatMessage {
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            role: ChatRole::User,
            text: text.into(),
            pending: false,
            created_at: Utc::now(),
        }
    }

    pub fn assistant(text: impl Into<String>) -> Self {
        Self {
            role: ChatRole::Assistant,
            text: text.into(),
            pending: false,
            created_at: Utc::now(),
        }
    }

    fn pending_assistant(pending: bool) -> Self {
        Self {
            pending,
            ..Self::assistant(String::new())
        }
    }
}

/// Stable reference to one message of one conversation.
///
/// Streaming replies capture a handle when they start and append through it,
/// so two interleaved streams can never write into each other's message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MessageHandle {
    conversation: Uuid,
    index: usize,
}

impl MessageHandle {
    pub fn index(&self) -> usize {
        self.index
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConversationError {
    #[error("Message handle belongs to conversation {0}")]
    ForeignHandle(Uuid),

    #[error("No message at index {0}")]
    UnknownMessage(usize),

    #[error("Message at index {0} is not an assistant message")]
    NotAssistant(usize),
}

/// Append-only advisor transcript
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Conversation {
    id: Uuid,
    messages: Vec<ChatMessage>,
}

impl Default for Conversation {
    fn default() -> Self {
        Self::new()
    }
}

impl Conversation {
    pub fn new() -> Self {
        Self {
            id: Uuid::new_v4(),
            messages: Vec::new(),
        }
    }

    /// Conversation opened by the advisor's greeting
    pub fn with_greeting() -> Self {
        let mut conversation = Self::new();
        conversation.push(ChatMessage::assistant(ADVISOR_GREETING));
        conversation
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn push_user(&mut self, text: impl Into<String>) -> MessageHandle {
        self.push(ChatMessage::user(text))
    }

    /// Reserve an empty assistant message for a streamed reply
    pub fn begin_assistant(&mut self, pending: bool) -> MessageHandle {
        self.push(ChatMessage::pending_assistant(pending))
    }

    pub fn get(&self, handle: MessageHandle) -> Option<&ChatMessage> {
        if handle.conversation != self.id {
            return None;
        }
        self.messages.get(handle.index)
    }

    /// Append one streamed fragment to the assistant message behind `handle`
    pub fn append(&mut self, handle: MessageHandle, chunk: &str) -> Result<(), ConversationError> {
        if handle.conversation != self.id {
            return Err(ConversationError::ForeignHandle(handle.conversation));
        }

        let message = self
            .messages
            .get_mut(handle.index)
            .ok_or(ConversationError::UnknownMessage(handle.index))?;

        if message.role != ChatRole::Assistant {
            return Err(ConversationError::NotAssistant(handle.index));
        }

        message.text.push_str(chunk);
        message.pending = false;
        Ok(())
    }

    /// Clear the pending flag once a reply ends, even one that produced no text
    pub fn settle(&mut self, handle: MessageHandle) -> Result<(), ConversationError> {
        self.append(handle, "")
    }

    fn push(&mut self, message: ChatMessage) -> MessageHandle {
        self.messages.push(message);
        MessageHandle {
            conversation: self.id,
            index: self.messages.len() - 1,
        }
    }
}
