use badge_hunter_github::{LookupFailureKind, ProfileError};
use badge_hunter_types::ProfileStats;

/// The currently displayed profile.
///
/// A successful lookup replaces the stats; a failed one records the error and
/// leaves the previous stats in place.
#[derive(Debug, Default)]
pub struct ProfileSlot {
    current: Option<ProfileStats>,
    last_error: Option<ProfileError>,
}

impl ProfileSlot {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn current(&self) -> Option<&ProfileStats> {
        self.current.as_ref()
    }

    pub fn last_error(&self) -> Option<&ProfileError> {
        self.last_error.as_ref()
    }

    /// Message to show for the most recent failed lookup, if any
    pub fn error_message(&self) -> Option<&'static str> {
        self.last_error.as_ref().map(ProfileError::user_message)
    }

    pub fn failure_kind(&self) -> Option<LookupFailureKind> {
        self.last_error.as_ref().map(ProfileError::kind)
    }

    /// Record a lookup result. Returns true when the stats changed.
    pub fn apply(&mut self, result: Result<ProfileStats, ProfileError>) -> bool {
        match result {
            Ok(stats) => {
                self.current = Some(stats);
                self.last_error = None;
                true
            }
            Err(e) => {
                self.last_error = Some(e);
                false
            }
        }
    }

    pub fn clear(&mut self) {
        self.current = None;
        self.last_error = None;
    }
}
