use badge_hunter_types::{BadgeDefinition, ProfileStats, ProgressResult, StatKind, TierTable};
use std::collections::HashMap;

use crate::catalog::Catalog;

/// Resolve the tier reached by `value` on `tiers`.
///
/// The attained side of a threshold is inclusive: a value equal to a
/// threshold has reached that tier.
pub fn resolve_tier(tiers: &TierTable, value: u64) -> ProgressResult {
    let rungs = tiers.tiers();

    match rungs.iter().position(|tier| value < tier.threshold) {
        None => {
            let top = tiers.top();
            ProgressResult {
                current_value: value,
                next_threshold: top.threshold,
                tier: Some(top.label.clone()),
                is_unlocked: true,
                percent_to_next: percent_of(value, top.threshold),
                is_maxed: true,
            }
        }
        Some(0) => ProgressResult {
            current_value: value,
            next_threshold: rungs[0].threshold,
            tier: None,
            is_unlocked: false,
            percent_to_next: percent_of(value, rungs[0].threshold),
            is_maxed: false,
        },
        Some(next) => ProgressResult {
            current_value: value,
            next_threshold: rungs[next].threshold,
            tier: Some(rungs[next - 1].label.clone()),
            is_unlocked: true,
            percent_to_next: percent_of(value, rungs[next].threshold),
            is_maxed: false,
        },
    }
}

// TierTable rejects zero thresholds, so `target` is never 0 here.
fn percent_of(value: u64, target: u64) -> f64 {
    (100.0 * value as f64 / target as f64).clamp(0.0, 100.0)
}

/// Computes per-badge progress from profile stats.
///
/// Which statistic drives which badge is a lookup table keyed by badge id,
/// so a new tiered badge only needs a table entry.
#[derive(Debug, Clone, Default)]
pub struct ProgressEngine {
    drivers: HashMap<String, StatKind>,
}

impl ProgressEngine {
    pub fn new(drivers: HashMap<String, StatKind>) -> Self {
        Self { drivers }
    }

    /// Engine using the catalog's `[drivers]` table
    pub fn from_catalog(catalog: &Catalog) -> Self {
        Self::new(catalog.drivers().clone())
    }

    pub fn with_driver(mut self, badge_id: impl Into<String>, stat: StatKind) -> Self {
        self.drivers.insert(badge_id.into(), stat);
        self
    }

    pub fn driver(&self, badge_id: &str) -> Option<StatKind> {
        self.drivers.get(badge_id).copied()
    }

    /// Progress of `stats` towards `badge`.
    ///
    /// `None` for retired badges, badges without tiers, badges with no stat
    /// driver, and when no stats are available.
    pub fn compute_progress(
        &self,
        badge: &BadgeDefinition,
        stats: Option<&ProfileStats>,
    ) -> Option<ProgressResult> {
        if badge.is_retired() {
            return None;
        }
        let tiers = badge.tiers.as_ref()?;
        let stats = stats?;
        let stat = self.driver(&badge.id)?;

        Some(resolve_tier(tiers, stat.read(stats)))
    }

    /// Every catalog badge paired with its progress, in catalog order
    pub fn progress_for_all<'c>(
        &self,
        catalog: &'c Catalog,
        stats: Option<&ProfileStats>,
    ) -> Vec<(&'c BadgeDefinition, Option<ProgressResult>)> {
        catalog
            .badges()
            .iter()
            .map(|badge| (badge, self.compute_progress(badge, stats)))
            .collect()
    }
}
