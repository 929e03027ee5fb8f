use soap_client::{SoapError, SoapFault};
use thiserror::Error;

/// High-level API errors for ONVIF operations
///
/// This enum provides domain-specific error types that abstract away the underlying
/// SOAP communication details while keeping the distinction between device faults
/// and transport failures, which callers use to decide how to report a failure.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Network communication error
    ///
    /// Connection refused, timeouts, DNS failures and HTTP error statuses
    /// that did not carry a SOAP fault.
    #[error("Network error: {0}")]
    NetworkError(String),

    /// Response parsing error
    ///
    /// The device answered, but the response could not be parsed into the
    /// expected shape.
    #[error("Parse error: {0}")]
    ParseError(String),

    /// SOAP fault returned by the device
    #[error("SOAP fault: {0}")]
    SoapFault(SoapFault),

    /// Invalid parameter value
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    /// Subscription operation failed
    #[error("Subscription error: {0}")]
    SubscriptionError(String),

    /// Device does not offer a required capability
    #[error("Device error: {0}")]
    DeviceError(String),
}

/// Coarse classification of a failure, used only for reporting
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FailureKind {
    /// Protocol-level error reported by the device in a fault envelope
    Fault,
    /// Network/connection-level failure
    Transport,
    /// Anything else
    Other,
}

impl ApiError {
    pub fn kind(&self) -> FailureKind {
        match self {
            ApiError::SoapFault(_) => FailureKind::Fault,
            ApiError::NetworkError(_) => FailureKind::Transport,
            _ => FailureKind::Other,
        }
    }
}

/// Type alias for results that can return an ApiError
pub type Result<T> = std::result::Result<T, ApiError>;

impl From<SoapError> for ApiError {
    fn from(error: SoapError) -> Self {
        match error {
            SoapError::Network(msg) => ApiError::NetworkError(msg),
            SoapError::Parse(msg) => ApiError::ParseError(msg),
            SoapError::Fault(fault) => ApiError::SoapFault(fault),
        }
    }
}
