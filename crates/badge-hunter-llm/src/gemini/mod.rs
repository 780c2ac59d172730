// Google Gemini (Generative Language API)
// https://ai.google.dev/api/generate-content

mod client;
mod types;

pub use client::GeminiClient;
pub use types::{
    ApiError, Candidate, CandidateContent, GenerateContentResponse, Part, PromptFeedback,
    UsageMetadata,
};
