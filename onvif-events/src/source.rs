//! The device operations the poller depends on

use std::time::Duration;

use onvif_api::{
    ApiError, Credentials, DeviceSession, EventProperties, PullResult, SoapClient,
    SubscriptionHandle, Value,
};

use crate::sink::LogSink;

/// Source of pull point events
///
/// [`DeviceSession`] is the production implementation. The poller only
/// talks to this trait so it can be driven by scripted sources in tests.
pub trait EventSource {
    fn describe_event_properties(&self) -> Result<EventProperties, ApiError>;

    fn create_subscription(&self, requested_lifetime: Duration) -> Result<SubscriptionHandle, ApiError>;

    fn pull(
        &self,
        handle: &SubscriptionHandle,
        timeout: Duration,
        message_limit: u32,
    ) -> Result<PullResult, ApiError>;
}

impl EventSource for DeviceSession {
    fn describe_event_properties(&self) -> Result<EventProperties, ApiError> {
        DeviceSession::describe_event_properties(self)
    }

    fn create_subscription(&self, requested_lifetime: Duration) -> Result<SubscriptionHandle, ApiError> {
        DeviceSession::create_subscription(self, requested_lifetime)
    }

    fn pull(
        &self,
        handle: &SubscriptionHandle,
        timeout: Duration,
        message_limit: u32,
    ) -> Result<PullResult, ApiError> {
        DeviceSession::pull(self, handle, timeout, message_limit)
    }
}

impl<S: EventSource + ?Sized> EventSource for &S {
    fn describe_event_properties(&self) -> Result<EventProperties, ApiError> {
        (**self).describe_event_properties()
    }

    fn create_subscription(&self, requested_lifetime: Duration) -> Result<SubscriptionHandle, ApiError> {
        (**self).create_subscription(requested_lifetime)
    }

    fn pull(
        &self,
        handle: &SubscriptionHandle,
        timeout: Duration,
        message_limit: u32,
    ) -> Result<PullResult, ApiError> {
        (**self).pull(handle, timeout, message_limit)
    }
}

/// Open a device session, reporting progress to the event log
///
/// Failures are returned, not logged; the caller reports them as fatal.
pub fn connect<L: LogSink + ?Sized>(
    credentials: &Credentials,
    soap_client: SoapClient,
    sink: &L,
) -> Result<DeviceSession, ApiError> {
    sink.debug(
        "Connecting to device",
        Some(
            Value::map()
                .with("host", credentials.host.as_str())
                .with("port", credentials.port)
                .with("username", credentials.username.as_str()),
        ),
    );

    let session = DeviceSession::connect_with(credentials, soap_client)?;

    sink.info(
        "Connected to device",
        Some(
            Value::map()
                .with("device_service", session.device_url())
                .with("event_service", session.events_address()),
        ),
    );

    Ok(session)
}
