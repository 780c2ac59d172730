use badge_hunter_types::{BadgeCategory, BadgeDefinition, StatKind};
use serde::Deserialize;
use std::collections::{BTreeMap, HashMap};
use std::str::FromStr;
use thiserror::Error;

const BUILTIN_CATALOG: &str = include_str!("../data/catalog.toml");

#[derive(Error, Debug)]
pub enum CatalogError {
    #[error("Catalog parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Badge with empty id")]
    EmptyId,

    #[error("Duplicate badge id: {0}")]
    DuplicateId(String),

    #[error("Stat driver refers to unknown badge: {0}")]
    UnknownDriverBadge(String),

    #[error("Stat driver refers to badge without tiers: {0}")]
    UntieredDriverBadge(String),

    #[error("Stat driver refers to retired badge: {0}")]
    RetiredDriverBadge(String),
}

/// On-disk shape of the catalog file
#[derive(Debug, Deserialize)]
struct CatalogFile {
    #[serde(default)]
    drivers: BTreeMap<String, StatKind>,
    badges: Vec<BadgeDefinition>,
}

/// Category selection for the badge grid
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CategoryFilter {
    #[default]
    All,
    Only(BadgeCategory),
}

impl CategoryFilter {
    pub fn matches(&self, badge: &BadgeDefinition) -> bool {
        match self {
            Self::All => true,
            Self::Only(category) => badge.category == *category,
        }
    }
}

impl FromStr for CategoryFilter {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "all" => Ok(Self::All),
            "earnable" => Ok(Self::Only(BadgeCategory::Earnable)),
            "highlight" => Ok(Self::Only(BadgeCategory::Highlight)),
            "retired" => Ok(Self::Only(BadgeCategory::Retired)),
            other => Err(format!("Unknown badge category: {}", other)),
        }
    }
}

/// Validated, immutable badge catalog
#[derive(Debug, Clone)]
pub struct Catalog {
    badges: Vec<BadgeDefinition>,
    index: HashMap<String, usize>,
    drivers: HashMap<String, StatKind>,
}

impl Catalog {
    /// Catalog shipped with the crate
    pub fn builtin() -> Result<Self, CatalogError> {
        Self::from_toml_str(BUILTIN_CATALOG)
    }

    pub fn from_toml_str(source: &str) -> Result<Self, CatalogError> {
        let file: CatalogFile = toml::from_str(source)?;
        Self::from_parts(file.badges, file.drivers)
    }

    /// Build a catalog from definitions and a badge id -> stat driver table.
    ///
    /// Tier tables are already validated by construction; this checks the
    /// cross-references.
    pub fn from_parts(
        badges: Vec<BadgeDefinition>,
        drivers: impl IntoIterator<Item = (String, StatKind)>,
    ) -> Result<Self, CatalogError> {
        let mut index = HashMap::with_capacity(badges.len());
        for (position, badge) in badges.iter().enumerate() {
            if badge.id.trim().is_empty() {
                return Err(CatalogError::EmptyId);
            }
            if index.insert(badge.id.clone(), position).is_some() {
                return Err(CatalogError::DuplicateId(badge.id.clone()));
            }
        }

        let mut driver_table = HashMap::new();
        for (badge_id, stat) in drivers {
            let badge = index
                .get(&badge_id)
                .map(|&i| &badges[i])
                .ok_or_else(|| CatalogError::UnknownDriverBadge(badge_id.clone()))?;

            if badge.is_retired() {
                return Err(CatalogError::RetiredDriverBadge(badge_id));
            }
            if !badge.is_tiered() {
                return Err(CatalogError::UntieredDriverBadge(badge_id));
            }
            driver_table.insert(badge_id, stat);
        }

        tracing::debug!(
            badges = badges.len(),
            drivers = driver_table.len(),
            "Badge catalog loaded"
        );

        Ok(Self {
            badges,
            index,
            drivers: driver_table,
        })
    }

    pub fn badges(&self) -> &[BadgeDefinition] {
        &self.badges
    }

    pub fn len(&self) -> usize {
        self.badges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.badges.is_empty()
    }

    pub fn get(&self, id: &str) -> Option<&BadgeDefinition> {
        self.index.get(id).map(|&i| &self.badges[i])
    }

    /// Stat driving the badge's progress, if it is progress-trackable
    pub fn driver(&self, id: &str) -> Option<StatKind> {
        self.drivers.get(id).copied()
    }

    pub fn drivers(&self) -> &HashMap<String, StatKind> {
        &self.drivers
    }

    /// Badges in catalog order matching `filter`
    pub fn filter(&self, filter: CategoryFilter) -> Vec<&BadgeDefinition> {
        self.badges.iter().filter(|b| filter.matches(b)).collect()
    }

    /// Case-insensitive text search over name, description and how-to-earn.
    /// An empty query matches everything.
    pub fn search(&self, query: &str) -> Vec<&BadgeDefinition> {
        let needle = query.trim().to_lowercase();
        if needle.is_empty() {
            return self.badges.iter().collect();
        }

        self.badges
            .iter()
            .filter(|b| {
                b.name.to_lowercase().contains(&needle)
                    || b.description.to_lowercase().contains(&needle)
                    || b.how_to_earn.to_lowercase().contains(&needle)
            })
            .collect()
    }
}
