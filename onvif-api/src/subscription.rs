//! Pull point subscription handle

use chrono::{DateTime, Utc};
use xmltree::Element;

use crate::operations::events::{CreatePullPointSubscriptionResponse, NotificationRecord};
use crate::value::{ToValue, Value};

/// Opaque reference to an active pull point
///
/// A handle is replaced wholesale when the subscription is re-created; the
/// previous handle is simply dropped, never cancelled on the device.
#[derive(Debug, Clone, PartialEq)]
pub struct SubscriptionHandle {
    address: String,
    reference_parameters: Vec<Element>,
    current_time: Option<DateTime<Utc>>,
    termination_time: Option<DateTime<Utc>>,
}

impl SubscriptionHandle {
    /// Handle for a subscription address with no reference parameters
    pub fn new(address: impl Into<String>) -> Self {
        Self {
            address: address.into(),
            reference_parameters: Vec::new(),
            current_time: None,
            termination_time: None,
        }
    }

    pub fn address(&self) -> &str {
        &self.address
    }

    pub fn reference_parameters(&self) -> &[Element] {
        &self.reference_parameters
    }

    /// Device clock at creation time, as reported by the device
    pub fn current_time(&self) -> Option<DateTime<Utc>> {
        self.current_time
    }

    /// Termination time granted by the device, which may be earlier than requested
    pub fn termination_time(&self) -> Option<DateTime<Utc>> {
        self.termination_time
    }
}

impl From<CreatePullPointSubscriptionResponse> for SubscriptionHandle {
    fn from(response: CreatePullPointSubscriptionResponse) -> Self {
        Self {
            address: response.address,
            reference_parameters: response.reference_parameters,
            current_time: response.current_time,
            termination_time: response.termination_time,
        }
    }
}

impl ToValue for SubscriptionHandle {
    fn to_value(&self) -> Value {
        Value::map()
            .with("address", self.address.as_str())
            .with("reference_parameters", self.reference_parameters.clone())
            .with("current_time", self.current_time)
            .with("termination_time", self.termination_time)
    }
}

/// Outcome of one pull
#[derive(Debug, Clone, PartialEq)]
pub enum PullResult {
    /// No notifications were available this cycle
    Empty,
    /// Notifications in the order the device delivered them
    MessageBatch(Vec<NotificationRecord>),
}

impl PullResult {
    pub fn from_notifications(notifications: Vec<NotificationRecord>) -> Self {
        if notifications.is_empty() {
            PullResult::Empty
        } else {
            PullResult::MessageBatch(notifications)
        }
    }

    pub fn len(&self) -> usize {
        match self {
            PullResult::Empty => 0,
            PullResult::MessageBatch(records) => records.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
