//! CreatePullPointSubscription operation for the event service

use chrono::{DateTime, Utc};
use std::time::Duration;
use xmltree::Element;

use crate::operation::{child_text, OnvifOperation};
use crate::xsd::{format_duration, parse_datetime};
use crate::{ApiError, Service};

/// CreatePullPointSubscription operation
pub struct CreatePullPointSubscriptionOperation;

/// Request for CreatePullPointSubscription operation
#[derive(Debug, Clone)]
pub struct CreatePullPointSubscriptionRequest {
    /// Requested lifetime, a hint the device may shorten
    pub initial_termination_time: Duration,
}

/// Response for CreatePullPointSubscription operation
#[derive(Debug, Clone, PartialEq)]
pub struct CreatePullPointSubscriptionResponse {
    /// Address to send PullMessages requests to
    pub address: String,
    /// WS-Addressing reference parameters to echo back as SOAP headers
    pub reference_parameters: Vec<Element>,
    pub current_time: Option<DateTime<Utc>>,
    pub termination_time: Option<DateTime<Utc>>,
}

impl OnvifOperation for CreatePullPointSubscriptionOperation {
    type Request = CreatePullPointSubscriptionRequest;
    type Response = CreatePullPointSubscriptionResponse;

    const SERVICE: Service = Service::Events;
    const ACTION: &'static str = "CreatePullPointSubscription";

    fn build_payload(request: &Self::Request) -> String {
        format!(
            "<InitialTerminationTime>{}</InitialTerminationTime>",
            format_duration(request.initial_termination_time)
        )
    }

    fn parse_response(xml: &Element) -> Result<Self::Response, ApiError> {
        let reference = xml.get_child("SubscriptionReference").ok_or_else(|| {
            ApiError::ParseError("Missing SubscriptionReference element".to_string())
        })?;

        let address = child_text(reference, "Address")
            .filter(|a| !a.is_empty())
            .ok_or_else(|| ApiError::ParseError("Missing subscription Address".to_string()))?;

        let reference_parameters: Vec<Element> = reference
            .get_child("ReferenceParameters")
            .map(|params| {
                params
                    .children
                    .iter()
                    .filter_map(|node| node.as_element())
                    .cloned()
                    .collect()
            })
            .unwrap_or_default();

        Ok(CreatePullPointSubscriptionResponse {
            address,
            reference_parameters,
            current_time: child_text(xml, "CurrentTime").and_then(|t| parse_datetime(&t)),
            termination_time: child_text(xml, "TerminationTime").and_then(|t| parse_datetime(&t)),
        })
    }
}
