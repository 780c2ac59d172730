use serde::{Deserialize, Serialize};

/// Label reported when the value is below the first threshold
pub const NO_TIER_LABEL: &str = "None";

/// Derived progress of one profile towards one tiered badge. Never stored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProgressResult {
    pub current_value: u64,
    /// Smallest threshold strictly above `current_value`, or the top threshold once reached
    pub next_threshold: u64,
    /// Highest tier attained, `None` below the base threshold
    pub tier: Option<String>,
    pub is_unlocked: bool,
    /// Always within `[0, 100]`
    pub percent_to_next: f64,
    pub is_maxed: bool,
}

impl ProgressResult {
    pub fn tier_label(&self) -> &str {
        self.tier.as_deref().unwrap_or(NO_TIER_LABEL)
    }
}
