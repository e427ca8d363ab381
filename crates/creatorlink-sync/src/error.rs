//! Errors surfaced by the sync layer and the user-facing messages derived from them.

use creatorlink_client::{ApiError, ApiErrorKind, FieldError};
use creatorlink_core::{PlatformType, PlatformUrlError};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SyncError {
    #[error(transparent)]
    Api(ApiError),

    #[error(transparent)]
    InvalidUrl(#[from] PlatformUrlError),

    #[error("{platform} is already linked")]
    AlreadyLinked { platform: PlatformType },

    #[error("{platform} is not linked")]
    NotLinked { platform: PlatformType },

    #[error("an update for {platform} is already in progress")]
    OperationInProgress { platform: PlatformType },

    #[error("{platform} data is taking too long to load; try reloading the page in a few minutes")]
    IngestionTimeout { platform: PlatformType, attempts: u32 },

    #[error("operation cancelled")]
    Cancelled,

    #[error("profile has not been loaded yet")]
    NotLoaded,
}

impl From<ApiError> for SyncError {
    fn from(err: ApiError) -> Self {
        if err.kind() == ApiErrorKind::Cancelled {
            SyncError::Cancelled
        } else {
            SyncError::Api(err)
        }
    }
}

impl SyncError {
    /// Message for a toast, or `None` when nothing should be shown.
    ///
    /// Auth failures have already redirected to the login page and a
    /// cancellation was asked for by the user, so neither is reported.
    /// Validation errors carry per-field messages in [`Self::field_errors`].
    #[must_use]
    pub fn user_message(&self) -> Option<String> {
        match self {
            SyncError::Api(err) => match err.kind() {
                ApiErrorKind::Auth | ApiErrorKind::Cancelled => None,
                _ => Some(err.message.clone()),
            },
            SyncError::Cancelled => None,
            other => Some(other.to_string()),
        }
    }

    #[must_use]
    pub fn field_errors(&self) -> Option<&[FieldError]> {
        match self {
            SyncError::Api(err) => err.field_errors.as_deref(),
            _ => None,
        }
    }

    #[must_use]
    pub fn is_timeout(&self) -> bool {
        matches!(self, SyncError::IngestionTimeout { .. })
    }
}
