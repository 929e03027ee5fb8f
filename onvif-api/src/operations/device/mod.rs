//! Device management service operations

pub mod get_capabilities;

pub use get_capabilities::{
    CapabilityCategory, EventCapabilities, GetCapabilitiesOperation, GetCapabilitiesRequest,
    GetCapabilitiesResponse,
};
