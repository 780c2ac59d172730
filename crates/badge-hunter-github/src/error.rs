use thiserror::Error;

/// Collapsed message shown for every lookup failure
pub const LOOKUP_FAILED_MESSAGE: &str = "User not found or API limit reached.";

#[derive(Error, Debug)]
pub enum ProfileError {
    #[error("Profile not found: {0}")]
    NotFound(String),

    #[error("GitHub API rate limit exceeded")]
    RateLimited,

    #[error("GitHub API unavailable ({status:?}): {message}")]
    Unavailable {
        status: Option<u16>,
        message: String,
    },

    #[error("Network failure: {0}")]
    Network(#[source] reqwest::Error),
}

/// Whether the profile is known not to exist, or could not be determined
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LookupFailureKind {
    NotFound,
    Unavailable,
}

impl ProfileError {
    pub fn kind(&self) -> LookupFailureKind {
        match self {
            Self::NotFound(_) => LookupFailureKind::NotFound,
            Self::RateLimited | Self::Unavailable { .. } | Self::Network(_) => {
                LookupFailureKind::Unavailable
            }
        }
    }

    pub fn is_not_found(&self) -> bool {
        self.kind() == LookupFailureKind::NotFound
    }

    /// User-facing text. Not-found and unavailable share one message on
    /// purpose; use [`ProfileError::kind`] to tell them apart.
    pub fn user_message(&self) -> &'static str {
        LOOKUP_FAILED_MESSAGE
    }
}

pub type Result<T> = std::result::Result<T, ProfileError>;
