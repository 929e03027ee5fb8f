//! ONVIF operations organized by service

pub mod device;
pub mod events;

pub use device::GetCapabilitiesOperation;
pub use events::{
    CreatePullPointSubscriptionOperation, GetEventPropertiesOperation, PullMessagesOperation,
};
