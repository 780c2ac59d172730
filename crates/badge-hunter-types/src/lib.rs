pub mod badge;
pub mod chat;
pub mod progress;
pub mod stats;

pub use badge::{BadgeCategory, BadgeDefinition, Tier, TierTable, TierTableError};
pub use chat::{ChatMessage, ChatRole, Conversation, ConversationError, MessageHandle, ADVISOR_GREETING};
pub use progress::{ProgressResult, NO_TIER_LABEL};
pub use stats::{ProfileStats, StatKind};
