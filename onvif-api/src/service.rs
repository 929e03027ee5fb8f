/// Represents the ONVIF services this crate talks to
///
/// Each service has its own WSDL namespace and action URI scheme. The pull
/// point is not a separate service on the device but a separate port type
/// of the event service, with its own action prefix.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Service {
    /// Device management service - capabilities and device information
    Device,

    /// Event service - event properties and subscription creation
    Events,

    /// Pull point subscription port type - message retrieval
    PullPoint,
}

/// Contains the namespace and action URI information for a service
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceInfo {
    /// WSDL namespace of the request/response elements
    pub namespace: &'static str,

    /// Prefix prepended to the operation name to form the action URI
    pub action_prefix: &'static str,

    /// Suffix appended to the operation name to form the action URI
    pub action_suffix: &'static str,
}

impl Service {
    /// Get the namespace and action information for this service
    pub fn info(&self) -> ServiceInfo {
        match self {
            Service::Device => ServiceInfo {
                namespace: "http://www.onvif.org/ver10/device/wsdl",
                action_prefix: "http://www.onvif.org/ver10/device/wsdl/",
                action_suffix: "",
            },
            Service::Events => ServiceInfo {
                namespace: "http://www.onvif.org/ver10/events/wsdl",
                action_prefix: "http://www.onvif.org/ver10/events/wsdl/EventPortType/",
                action_suffix: "Request",
            },
            Service::PullPoint => ServiceInfo {
                namespace: "http://www.onvif.org/ver10/events/wsdl",
                action_prefix: "http://www.onvif.org/ver10/events/wsdl/PullPointSubscription/",
                action_suffix: "Request",
            },
        }
    }

    /// Full action URI for an operation of this service
    pub fn action_uri(&self, operation: &str) -> String {
        let info = self.info();
        format!("{}{}{}", info.action_prefix, operation, info.action_suffix)
    }
}
