//! Error types for the SOAP client

use std::fmt;
use thiserror::Error;

/// Errors that can occur during SOAP communication
#[derive(Debug, Error)]
pub enum SoapError {
    /// Network or HTTP communication error
    #[error("Network/HTTP error: {0}")]
    Network(String),

    /// XML parsing error
    #[error("XML parsing error: {0}")]
    Parse(String),

    /// SOAP fault returned by the server
    #[error("SOAP fault: {0}")]
    Fault(SoapFault),
}

/// Contents of a SOAP fault envelope
///
/// SOAP 1.2 faults carry a `Code/Value`, an optional `Code/Subcode/Value`
/// (ONVIF puts its `ter:` error names there) and a human readable
/// `Reason/Text`. SOAP 1.1 style `faultcode`/`faultstring` pairs map onto
/// `code` and `reason`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SoapFault {
    pub code: String,
    pub subcode: Option<String>,
    pub reason: String,
}

impl fmt::Display for SoapFault {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.subcode {
            Some(subcode) => write!(f, "{} ({}): {}", self.code, subcode, self.reason),
            None => write!(f, "{}: {}", self.code, self.reason),
        }
    }
}
