//! PullMessages operation for the pull point subscription

use chrono::{DateTime, Utc};
use std::collections::BTreeMap;
use std::time::Duration;
use tracing::warn;
use xmltree::Element;

use crate::operation::{child_elements, child_text, OnvifOperation};
use crate::value::{ToValue, Value};
use crate::xsd::{format_duration, parse_datetime};
use crate::{ApiError, Service};

/// Extra time granted to the HTTP exchange on top of the long-poll timeout
const TRANSPORT_MARGIN: Duration = Duration::from_secs(10);

/// PullMessages operation
pub struct PullMessagesOperation;

/// Request for PullMessages operation
#[derive(Debug, Clone)]
pub struct PullMessagesRequest {
    /// Subscription address, sent as `wsa:To`
    pub address: String,
    /// Reference parameters from the subscription reference, echoed as headers
    pub reference_parameters: Vec<Element>,
    /// How long the device may wait for messages before answering
    pub timeout: Duration,
    /// Upper bound on notifications returned by one pull
    pub message_limit: u32,
}

/// One notification delivered by a pull
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NotificationRecord {
    pub topic: String,
    /// `UtcTime` of the message, or the response `CurrentTime` when absent
    pub utc_time: Option<DateTime<Utc>>,
    /// `Initialized`, `Changed` or `Deleted` for property events
    pub property_operation: Option<String>,
    pub source: BTreeMap<String, String>,
    pub key: BTreeMap<String, String>,
    pub data: BTreeMap<String, String>,
    /// Raw message payload
    pub message: Option<Element>,
}

impl ToValue for NotificationRecord {
    fn to_value(&self) -> Value {
        Value::map()
            .with("topic", self.topic.as_str())
            .with("utc_time", self.utc_time)
            .with("property_operation", self.property_operation.clone())
            .with("source", self.source.clone())
            .with("key", self.key.clone())
            .with("data", self.data.clone())
            .with("message", self.message.clone())
    }
}

/// Response for PullMessages operation
#[derive(Debug, Clone, PartialEq)]
pub struct PullMessagesResponse {
    pub current_time: Option<DateTime<Utc>>,
    pub termination_time: Option<DateTime<Utc>>,
    pub notifications: Vec<NotificationRecord>,
}

impl OnvifOperation for PullMessagesOperation {
    type Request = PullMessagesRequest;
    type Response = PullMessagesResponse;

    const SERVICE: Service = Service::PullPoint;
    const ACTION: &'static str = "PullMessages";

    fn build_payload(request: &Self::Request) -> String {
        format!(
            "<Timeout>{}</Timeout><MessageLimit>{}</MessageLimit>",
            format_duration(request.timeout),
            request.message_limit
        )
    }

    fn build_headers(request: &Self::Request) -> Vec<String> {
        let mut headers = vec![
            format!(
                "<wsa:Action>{}</wsa:Action>",
                Self::SERVICE.action_uri(Self::ACTION)
            ),
            format!("<wsa:To>{}</wsa:To>", soap_client::escape_xml(&request.address)),
        ];
        for parameter in &request.reference_parameters {
            match soap_client::element_to_string(parameter) {
                Ok(xml) => headers.push(xml),
                Err(e) => warn!(parameter = %parameter.name, error = %e, "dropping unserializable reference parameter"),
            }
        }
        headers
    }

    fn timeout(request: &Self::Request) -> Option<Duration> {
        Some(request.timeout + TRANSPORT_MARGIN)
    }

    fn parse_response(xml: &Element) -> Result<Self::Response, ApiError> {
        let current_time = child_text(xml, "CurrentTime").and_then(|t| parse_datetime(&t));
        let termination_time = child_text(xml, "TerminationTime").and_then(|t| parse_datetime(&t));

        let notifications = child_elements(xml, "NotificationMessage")
            .map(|notification| parse_notification(notification, current_time))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(PullMessagesResponse {
            current_time,
            termination_time,
            notifications,
        })
    }
}

fn parse_notification(
    notification: &Element,
    fallback_time: Option<DateTime<Utc>>,
) -> Result<NotificationRecord, ApiError> {
    let topic = child_text(notification, "Topic").unwrap_or_default();

    // wsnt:Message wraps the tt:Message carrying the event payload
    let message = notification
        .get_child("Message")
        .map(|wrapper| wrapper.get_child("Message").unwrap_or(wrapper))
        .ok_or_else(|| ApiError::ParseError("NotificationMessage without Message".to_string()))?;

    let utc_time = message
        .attributes
        .get("UtcTime")
        .and_then(|t| parse_datetime(t))
        .or(fallback_time);

    Ok(NotificationRecord {
        topic,
        utc_time,
        property_operation: message.attributes.get("PropertyOperation").cloned(),
        source: simple_items(message.get_child("Source")),
        key: simple_items(message.get_child("Key")),
        data: simple_items(message.get_child("Data")),
        message: Some(message.clone()),
    })
}

fn simple_items(container: Option<&Element>) -> BTreeMap<String, String> {
    container
        .map(|c| {
            child_elements(c, "SimpleItem")
                .filter_map(|item| {
                    let name = item.attributes.get("Name")?;
                    let value = item.attributes.get("Value").cloned().unwrap_or_default();
                    Some((name.clone(), value))
                })
                .collect()
        })
        .unwrap_or_default()
}
