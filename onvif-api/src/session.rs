//! Authenticated session with a single ONVIF device

use serde::de::Error as _;
use serde::{Deserialize, Deserializer};
use soap_client::{SoapClient, UsernameToken};
use std::fmt;
use std::time::Duration;
use tracing::{debug, warn};

use crate::operations::device::{
    CapabilityCategory, EventCapabilities, GetCapabilitiesOperation, GetCapabilitiesRequest,
};
use crate::operations::events::{
    CreatePullPointSubscriptionOperation, CreatePullPointSubscriptionRequest, EventProperties,
    GetEventPropertiesOperation, GetEventPropertiesRequest, PullMessagesOperation,
    PullMessagesRequest,
};
use crate::{ApiError, OnvifClient, PullResult, Result, SubscriptionHandle};

/// Path of the device management service on every ONVIF device
const DEVICE_SERVICE_PATH: &str = "onvif/device_service";

/// Connection settings for a device
#[derive(Clone, PartialEq, Eq, Deserialize)]
pub struct Credentials {
    pub host: String,
    #[serde(deserialize_with = "deserialize_port")]
    pub port: u16,
    pub username: String,
    pub password: String,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum PortRepr {
    Number(u64),
    Text(String),
}

fn deserialize_port<'de, D: Deserializer<'de>>(deserializer: D) -> std::result::Result<u16, D::Error> {
    let port = match PortRepr::deserialize(deserializer)? {
        PortRepr::Number(n) => u16::try_from(n).ok(),
        PortRepr::Text(s) => s.trim().parse::<u16>().ok(),
    };
    port.ok_or_else(|| D::Error::custom("port must be an integer between 1 and 65535"))
}

impl Credentials {
    /// Parse credentials from a JSON configuration payload
    pub fn from_json(payload: &str) -> Result<Self> {
        let credentials: Credentials = serde_json::from_str(payload).map_err(|e| {
            ApiError::InvalidParameter(format!("invalid configuration payload: {}", e))
        })?;
        credentials.validate()?;
        Ok(credentials)
    }

    pub fn validate(&self) -> Result<()> {
        if self.host.trim().is_empty() {
            return Err(ApiError::InvalidParameter("host must not be empty".to_string()));
        }
        if self.port == 0 {
            return Err(ApiError::InvalidParameter(
                "port must be an integer between 1 and 65535".to_string(),
            ));
        }
        Ok(())
    }

    /// `host:port`, with IPv6 literals bracketed
    pub fn authority(&self) -> String {
        let host = self.host.trim();
        if host.contains(':') && !host.starts_with('[') {
            format!("[{}]:{}", host, self.port)
        } else {
            format!("{}:{}", host, self.port)
        }
    }

    /// URL of the device management service
    pub fn device_service_url(&self) -> String {
        format!("http://{}/{}", self.authority(), DEVICE_SERVICE_PATH)
    }
}

// The password must never reach a log line.
impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// An authenticated connection to one device
///
/// Created once at startup; the event service address is discovered during
/// [`DeviceSession::connect`] and reused for every later call. There is no
/// explicit close: the session lives as long as the process.
#[derive(Debug, Clone)]
pub struct DeviceSession {
    client: OnvifClient,
    device_url: String,
    events: EventCapabilities,
}

impl DeviceSession {
    /// Connect with a default SOAP client
    pub fn connect(credentials: &Credentials) -> Result<Self> {
        Self::connect_with(credentials, SoapClient::new())
    }

    /// Connect using the given SOAP client, signing requests with the credentials
    ///
    /// Looks up the event service through `GetCapabilities`, which also
    /// verifies that the credentials are accepted.
    pub fn connect_with(credentials: &Credentials, soap_client: SoapClient) -> Result<Self> {
        credentials.validate()?;

        let soap_client = if credentials.username.is_empty() {
            soap_client
        } else {
            soap_client.with_credentials(UsernameToken::new(
                credentials.username.clone(),
                credentials.password.clone(),
            ))
        };
        let client = OnvifClient::with_soap_client(soap_client);
        let device_url = credentials.device_service_url();

        debug!(url = %device_url, "requesting event capabilities");
        let capabilities = client.execute::<GetCapabilitiesOperation>(
            &device_url,
            &GetCapabilitiesRequest {
                category: CapabilityCategory::Events,
            },
        )?;

        let events = capabilities.events.ok_or_else(|| {
            ApiError::DeviceError("device does not expose an event service".to_string())
        })?;

        if !events.ws_pull_point_support {
            warn!(xaddr = %events.xaddr, "device does not advertise pull point support");
        }

        Ok(Self {
            client,
            device_url,
            events,
        })
    }

    pub fn device_url(&self) -> &str {
        &self.device_url
    }

    /// Address of the event service reported by the device
    pub fn events_address(&self) -> &str {
        &self.events.xaddr
    }

    pub fn event_capabilities(&self) -> &EventCapabilities {
        &self.events
    }

    /// Query the supported event topics and dialects
    pub fn describe_event_properties(&self) -> Result<EventProperties> {
        self.client
            .execute::<GetEventPropertiesOperation>(self.events_address(), &GetEventPropertiesRequest)
            .inspect_err(|e| warn!(error = %e, "failed to get event properties"))
    }

    /// Create a new pull point subscription
    ///
    /// `requested_lifetime` is a hint; the device may grant a shorter one,
    /// visible through [`SubscriptionHandle::termination_time`].
    pub fn create_subscription(&self, requested_lifetime: Duration) -> Result<SubscriptionHandle> {
        let response = self
            .client
            .execute::<CreatePullPointSubscriptionOperation>(
                self.events_address(),
                &CreatePullPointSubscriptionRequest {
                    initial_termination_time: requested_lifetime,
                },
            )
            .inspect_err(|e| warn!(error = %e, "failed to create pull point"))?;

        debug!(
            address = %response.address,
            termination_time = ?response.termination_time,
            "pull point created"
        );
        Ok(SubscriptionHandle::from(response))
    }

    /// Pull buffered notifications, letting the device wait up to `timeout`
    pub fn pull(
        &self,
        handle: &SubscriptionHandle,
        timeout: Duration,
        message_limit: u32,
    ) -> Result<PullResult> {
        let request = PullMessagesRequest {
            address: handle.address().to_string(),
            reference_parameters: handle.reference_parameters().to_vec(),
            timeout,
            message_limit,
        };

        let response = self
            .client
            .execute::<PullMessagesOperation>(handle.address(), &request)?;

        Ok(PullResult::from_notifications(response.notifications))
    }
}
