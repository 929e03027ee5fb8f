//! Error types for the onvif-events crate.

use onvif_api::ApiError;

/// Failures that end a polling session.
///
/// Pull failures never appear here: they are recovered from by re-creating
/// the subscription. Only startup failures and a failed renewal are fatal.
#[derive(Debug, thiserror::Error)]
pub enum PollerError {
    /// The initial event property query failed
    #[error("Failed to get event properties: {0}")]
    Properties(#[source] ApiError),

    /// The initial pull point subscription could not be created
    #[error("Failed to create pull point subscription: {0}")]
    CreateSubscription(#[source] ApiError),

    /// Re-creating the subscription after a pull failure failed
    #[error("Failed to renew subscription: {0}")]
    Renewal(#[source] ApiError),

    /// Invalid configuration provided
    #[error("Configuration error: {0}")]
    Configuration(String),
}

impl PollerError {
    /// Whether the failure happened before the first pull
    pub fn is_startup(&self) -> bool {
        matches!(
            self,
            PollerError::Properties(_) | PollerError::CreateSubscription(_) | PollerError::Configuration(_)
        )
    }
}

/// Convenience type alias for Results using PollerError.
pub type Result<T> = std::result::Result<T, PollerError>;
