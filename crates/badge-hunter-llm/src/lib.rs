pub mod advisor;
pub mod buffer_utils;
pub mod config;
pub mod gemini;
pub mod streaming;
pub mod traits;
pub mod types;

pub use traits::{ChatClient, ChatOptions, ChatRequest, ChatResponse, TokenUsage};

pub use advisor::{AdviceMode, AdviceModels, AdviceOutcome, BadgeAdvisor, ERROR_NOTICE, SYSTEM_INSTRUCTION};
pub use config::{ClientFactory, GeminiConfig, ProviderConfig, ProviderType};
pub use gemini::GeminiClient;
pub use streaming::{EventStream, StreamEvent};
pub use types::Message;
