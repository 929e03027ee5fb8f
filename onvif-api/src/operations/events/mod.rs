//! Event service operations
//!
//! The event service hands out pull point subscriptions; PullMessages is
//! then sent to the address of each individual subscription.

pub mod create_pull_point_subscription;
pub mod get_event_properties;
pub mod pull_messages;

pub use create_pull_point_subscription::{
    CreatePullPointSubscriptionOperation, CreatePullPointSubscriptionRequest,
    CreatePullPointSubscriptionResponse,
};
pub use get_event_properties::{
    EventProperties, GetEventPropertiesOperation, GetEventPropertiesRequest,
};
pub use pull_messages::{
    NotificationRecord, PullMessagesOperation, PullMessagesRequest, PullMessagesResponse,
};
