//! End-to-end startup sequence against a mock device

use std::time::Duration;

use mockito::{Matcher, Mock, Server, ServerGuard};
use onvif_api::{Credentials, SoapClient};
use onvif_events::{
    connect, Level, LogRecord, LogSink, MemorySink, PollerConfig, ShutdownSignal, SubscriptionPoller,
};

/// Captures records and requests shutdown once a given message is seen
struct StopOnMessage {
    inner: MemorySink,
    message: &'static str,
    shutdown: ShutdownSignal,
}

impl LogSink for StopOnMessage {
    fn emit(&self, record: LogRecord) {
        if record.message == self.message {
            self.shutdown.trigger();
        }
        self.inner.emit(record);
    }
}

fn envelope(body: &str) -> String {
    format!(
        r#"<?xml version="1.0" encoding="UTF-8"?>
<env:Envelope xmlns:env="http://www.w3.org/2003/05/soap-envelope"
    xmlns:tds="http://www.onvif.org/ver10/device/wsdl"
    xmlns:tev="http://www.onvif.org/ver10/events/wsdl"
    xmlns:tt="http://www.onvif.org/ver10/schema"
    xmlns:wsa5="http://www.w3.org/2005/08/addressing"
    xmlns:wsnt="http://docs.oasis-open.org/wsn/b-2"
    xmlns:wstop="http://docs.oasis-open.org/wsn/t-1"
    xmlns:tns1="http://www.onvif.org/ver10/topics">
  <env:Body>{}</env:Body>
</env:Envelope>"#,
        body
    )
}

fn credentials(server: &ServerGuard) -> Credentials {
    let payload = format!(
        r#"{{"host": "{}", "port": "{}", "username": "admin", "password": "secret"}}"#,
        server.host_with_port().rsplit_once(':').unwrap().0,
        server.host_with_port().rsplit_once(':').unwrap().1,
    );
    Credentials::from_json(&payload).unwrap()
}

fn mock_device(server: &mut ServerGuard) -> Vec<Mock> {
    let url = server.url();

    let capabilities = server
        .mock("POST", "/onvif/device_service")
        .match_body(Matcher::Regex("GetCapabilities".to_string()))
        .with_body(envelope(&format!(
            r#"<tds:GetCapabilitiesResponse><tds:Capabilities><tt:Events>
                 <tt:XAddr>{url}/onvif/Events</tt:XAddr>
                 <tt:WSPullPointSupport>true</tt:WSPullPointSupport>
               </tt:Events></tds:Capabilities></tds:GetCapabilitiesResponse>"#
        )))
        .create();

    let properties = server
        .mock("POST", "/onvif/Events")
        .match_body(Matcher::Regex("GetEventProperties".to_string()))
        .with_body(envelope(
            r#"<tev:GetEventPropertiesResponse>
                 <wsnt:FixedTopicSet>true</wsnt:FixedTopicSet>
                 <wstop:TopicSet><tns1:VideoSource><MotionAlarm wstop:topic="true"/></tns1:VideoSource></wstop:TopicSet>
               </tev:GetEventPropertiesResponse>"#,
        ))
        .create();

    let create = server
        .mock("POST", "/onvif/Events")
        .match_body(Matcher::Regex("CreatePullPointSubscription".to_string()))
        .with_body(envelope(&format!(
            r#"<tev:CreatePullPointSubscriptionResponse>
                 <tev:SubscriptionReference><wsa5:Address>{url}/onvif/Subscription/0</wsa5:Address></tev:SubscriptionReference>
                 <wsnt:CurrentTime>2026-10-18T08:00:00Z</wsnt:CurrentTime>
                 <wsnt:TerminationTime>2026-10-18T09:00:00Z</wsnt:TerminationTime>
               </tev:CreatePullPointSubscriptionResponse>"#
        )))
        .create();

    let pull = server
        .mock("POST", "/onvif/Subscription/0")
        .match_body(Matcher::Regex("PullMessages".to_string()))
        .with_body(envelope(
            r#"<tev:PullMessagesResponse>
                 <tev:CurrentTime>2026-10-18T08:00:10Z</tev:CurrentTime>
                 <tev:TerminationTime>2026-10-18T09:00:00Z</tev:TerminationTime>
               </tev:PullMessagesResponse>"#,
        ))
        .create();

    vec![capabilities, properties, create, pull]
}

#[test]
fn test_startup_sequence_until_first_empty_pull() {
    let mut server = Server::new();
    let _mocks = mock_device(&mut server);

    let shutdown = ShutdownSignal::new();
    let records = MemorySink::new();
    let sink = StopOnMessage {
        inner: records.clone(),
        message: "No messages",
        shutdown: shutdown.clone(),
    };

    let session = connect(&credentials(&server), SoapClient::new(), &sink).unwrap();
    let config = PollerConfig::default().with_poll_interval(Duration::ZERO);
    let mut poller = SubscriptionPoller::new(session, &sink, config).with_shutdown(shutdown);

    assert!(poller.run().is_ok());

    let summary: Vec<(Level, String)> = records
        .records()
        .into_iter()
        .map(|r| (r.level, r.message))
        .collect();
    assert_eq!(
        summary,
        vec![
            (Level::Debug, "Connecting to device".to_string()),
            (Level::Info, "Connected to device".to_string()),
            (Level::Debug, "Event properties".to_string()),
            (Level::Info, "Pull-point subscription created".to_string()),
            (Level::Info, "No messages".to_string()),
            (Level::Info, "Subscription stopped".to_string()),
        ]
    );

    let created = records.records()[3].data.as_ref().unwrap().to_json();
    assert_eq!(created["address"], format!("{}/onvif/Subscription/0", server.url()));
    assert_eq!(created["termination_time"], "2026-10-18T09:00:00.000Z");
}

#[test]
fn test_connect_failure_logs_only_the_attempt() {
    let mut server = Server::new();
    let _mock = server
        .mock("POST", "/onvif/device_service")
        .with_status(500)
        .with_body(envelope(
            r#"<env:Fault><env:Code><env:Value>env:Receiver</env:Value></env:Code>
                 <env:Reason><env:Text>Service unavailable</env:Text></env:Reason></env:Fault>"#,
        ))
        .create();

    let sink = MemorySink::new();
    let error = connect(&credentials(&server), SoapClient::new(), &sink).unwrap_err();

    assert!(error.to_string().contains("Service unavailable"));
    assert_eq!(sink.messages(), vec!["Connecting to device"]);
}
