use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Badge category as shown on the profile page
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BadgeCategory {
    Earnable,
    Highlight,
    /// No longer awarded; never eligible for progress tracking
    Retired,
}

impl BadgeCategory {
    pub const ALL: [BadgeCategory; 3] = [Self::Earnable, Self::Highlight, Self::Retired];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Earnable => "Earnable",
            Self::Highlight => "Highlight",
            Self::Retired => "Retired",
        }
    }
}

impl fmt::Display for BadgeCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One rung of a tiered badge
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tier {
    pub label: String,
    pub threshold: u64,
}

impl Tier {
    pub fn new(label: impl Into<String>, threshold: u64) -> Self {
        Self {
            label: label.into(),
            threshold,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TierTableError {
    #[error("Tier table must contain at least one tier")]
    Empty,

    #[error("Tier '{label}' has a zero threshold")]
    ZeroThreshold { label: String },

    #[error("Tier '{label}' threshold {threshold} does not exceed previous threshold {previous}")]
    NotIncreasing {
        label: String,
        threshold: u64,
        previous: u64,
    },
}

/// Ordered tier thresholds for a badge.
///
/// Thresholds are strictly increasing and non-zero; the first tier is the
/// minimum value that counts as owning the badge. Construction goes through
/// [`TierTable::new`] (also used by deserialization), so a table that exists
/// is always valid.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<Tier>", into = "Vec<Tier>")]
pub struct TierTable {
    tiers: Vec<Tier>,
}

impl TierTable {
    pub fn new(tiers: Vec<Tier>) -> Result<Self, TierTableError> {
        if tiers.is_empty() {
            return Err(TierTableError::Empty);
        }

        let mut previous: Option<u64> = None;
        for tier in &tiers {
            if tier.threshold == 0 {
                return Err(TierTableError::ZeroThreshold {
                    label: tier.label.clone(),
                });
            }
            if let Some(previous) = previous {
                if tier.threshold <= previous {
                    return Err(TierTableError::NotIncreasing {
                        label: tier.label.clone(),
                        threshold: tier.threshold,
                        previous,
                    });
                }
            }
            previous = Some(tier.threshold);
        }

        Ok(Self { tiers })
    }

    /// Build from parallel label/threshold lists, e.g. `(["Base", "Bronze"], [16, 128])`
    pub fn from_pairs<L: Into<String>>(
        pairs: impl IntoIterator<Item = (L, u64)>,
    ) -> Result<Self, TierTableError> {
        Self::new(
            pairs
                .into_iter()
                .map(|(label, threshold)| Tier::new(label, threshold))
                .collect(),
        )
    }

    pub fn tiers(&self) -> &[Tier] {
        &self.tiers
    }

    pub fn len(&self) -> usize {
        self.tiers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tiers.is_empty()
    }

    /// Threshold that unlocks the badge
    pub fn base(&self) -> &Tier {
        &self.tiers[0]
    }

    pub fn top(&self) -> &Tier {
        &self.tiers[self.tiers.len() - 1]
    }

    pub fn labels(&self) -> impl Iterator<Item = &str> {
        self.tiers.iter().map(|t| t.label.as_str())
    }
}

impl TryFrom<Vec<Tier>> for TierTable {
    type Error = TierTableError;

    fn try_from(tiers: Vec<Tier>) -> Result<Self, Self::Error> {
        Self::new(tiers)
    }
}

impl From<TierTable> for Vec<Tier> {
    fn from(table: TierTable) -> Self {
        table.tiers
    }
}

/// Immutable badge definition loaded from the static catalog
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BadgeDefinition {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub icon: String,
    pub description: String,
    pub how_to_earn: String,
    pub category: BadgeCategory,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tiers: Option<TierTable>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tips: Vec<String>,
}

impl BadgeDefinition {
    pub fn is_retired(&self) -> bool {
        self.category == BadgeCategory::Retired
    }

    pub fn is_tiered(&self) -> bool {
        self.tiers.is_some()
    }
}
