//! GetCapabilities operation for the device management service

use xmltree::Element;

use crate::operation::{child_text, OnvifOperation};
use crate::xsd::parse_boolean;
use crate::{ApiError, Service};

/// GetCapabilities operation
pub struct GetCapabilitiesOperation;

/// Capability category to request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CapabilityCategory {
    All,
    Events,
}

impl CapabilityCategory {
    fn as_str(&self) -> &'static str {
        match self {
            CapabilityCategory::All => "All",
            CapabilityCategory::Events => "Events",
        }
    }
}

/// Request for GetCapabilities operation
#[derive(Debug, Clone)]
pub struct GetCapabilitiesRequest {
    pub category: CapabilityCategory,
}

/// Event service capabilities
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventCapabilities {
    /// Address of the event service
    pub xaddr: String,
    pub ws_subscription_policy_support: bool,
    pub ws_pull_point_support: bool,
}

/// Response for GetCapabilities operation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GetCapabilitiesResponse {
    /// `None` when the device does not report an event service
    pub events: Option<EventCapabilities>,
}

impl OnvifOperation for GetCapabilitiesOperation {
    type Request = GetCapabilitiesRequest;
    type Response = GetCapabilitiesResponse;

    const SERVICE: Service = Service::Device;
    const ACTION: &'static str = "GetCapabilities";

    fn build_payload(request: &Self::Request) -> String {
        format!("<Category>{}</Category>", request.category.as_str())
    }

    fn parse_response(xml: &Element) -> Result<Self::Response, ApiError> {
        let capabilities = xml
            .get_child("Capabilities")
            .ok_or_else(|| ApiError::ParseError("Missing Capabilities element".to_string()))?;

        let events = capabilities.get_child("Events").and_then(|events| {
            let xaddr = child_text(events, "XAddr").filter(|x| !x.is_empty())?;
            let flag = |name: &str| child_text(events, name).map_or(false, |v| parse_boolean(&v));
            Some(EventCapabilities {
                xaddr,
                ws_subscription_policy_support: flag("WSSubscriptionPolicySupport"),
                ws_pull_point_support: flag("WSPullPointSupport"),
            })
        });

        Ok(GetCapabilitiesResponse { events })
    }
}
