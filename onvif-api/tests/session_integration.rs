//! Device session tests against a mock ONVIF device
//!
//! These tests serve canned SOAP responses from a local HTTP server so the
//! full request/response path (signing, addressing headers, parsing) is
//! exercised without a camera on the network.

use mockito::{Matcher, Mock, Server, ServerGuard};
use onvif_api::{ApiError, Credentials, DeviceSession, FailureKind, PullResult};
use std::time::Duration;

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
    let host_with_port = server.host_with_port();
    let (host, port) = host_with_port.rsplit_once(':').unwrap();
    Credentials {
        host: host.to_string(),
        port: port.parse().unwrap(),
        username: "admin".to_string(),
        password: "secret".to_string(),
    }
}

fn mock_capabilities(server: &mut ServerGuard) -> Mock {
    let body = envelope(&format!(
        r#"<tds:GetCapabilitiesResponse><tds:Capabilities><tt:Events>
             <tt:XAddr>{}/onvif/Events</tt:XAddr>
             <tt:WSSubscriptionPolicySupport>true</tt:WSSubscriptionPolicySupport>
             <tt:WSPullPointSupport>true</tt:WSPullPointSupport>
           </tt:Events></tds:Capabilities></tds:GetCapabilitiesResponse>"#,
        server.url()
    ));
    server
        .mock("POST", "/onvif/device_service")
        .match_body(Matcher::Regex("GetCapabilities".to_string()))
        .with_status(200)
        .with_body(body)
        .create()
}

fn mock_create_pull_point(server: &mut ServerGuard, index: u32) -> Mock {
    let body = envelope(&format!(
        r#"<tev:CreatePullPointSubscriptionResponse>
             <tev:SubscriptionReference>
               <wsa5:Address>{}/onvif/Subscription/{}</wsa5:Address>
             </tev:SubscriptionReference>
             <wsnt:CurrentTime>2026-10-18T08:00:00Z</wsnt:CurrentTime>
             <wsnt:TerminationTime>2026-10-18T09:00:00Z</wsnt:TerminationTime>
           </tev:CreatePullPointSubscriptionResponse>"#,
        server.url(),
        index
    ));
    server
        .mock("POST", "/onvif/Events")
        .match_body(Matcher::AllOf(vec![
            Matcher::Regex("CreatePullPointSubscription".to_string()),
            Matcher::Regex("<InitialTerminationTime>PT1H</InitialTerminationTime>".to_string()),
        ]))
        .with_status(200)
        .with_body(body)
        .create()
}

#[test]
fn test_connect_discovers_event_service() {
    let mut server = Server::new();
    let capabilities = mock_capabilities(&mut server);

    let session = DeviceSession::connect(&credentials(&server)).unwrap();

    assert_eq!(session.events_address(), format!("{}/onvif/Events", server.url()));
    assert!(session.event_capabilities().ws_pull_point_support);
    capabilities.assert();
}

#[test]
fn test_connect_rejected_credentials_is_fault() {
    let mut server = Server::new();
    let _mock = server
        .mock("POST", "/onvif/device_service")
        .with_status(400)
        .with_body(envelope(
            r#"<env:Fault>
                 <env:Code><env:Value>env:Sender</env:Value>
                   <env:Subcode><env:Value>ter:NotAuthorized</env:Value></env:Subcode></env:Code>
                 <env:Reason><env:Text>Sender not Authorized</env:Text></env:Reason>
               </env:Fault>"#,
        ))
        .create();

    let error = DeviceSession::connect(&credentials(&server)).unwrap_err();
    assert_eq!(error.kind(), FailureKind::Fault);
    assert!(error.to_string().contains("NotAuthorized"));
}

#[test]
fn test_connect_without_event_service_is_device_error() {
    let mut server = Server::new();
    let _mock = server
        .mock("POST", "/onvif/device_service")
        .with_status(200)
        .with_body(envelope(
            "<tds:GetCapabilitiesResponse><tds:Capabilities/></tds:GetCapabilitiesResponse>",
        ))
        .create();

    assert!(matches!(
        DeviceSession::connect(&credentials(&server)),
        Err(ApiError::DeviceError(_))
    ));
}

#[test]
fn test_describe_event_properties() {
    let mut server = Server::new();
    let _capabilities = mock_capabilities(&mut server);
    let properties = server
        .mock("POST", "/onvif/Events")
        .match_body(Matcher::Regex("GetEventProperties".to_string()))
        .with_status(200)
        .with_body(envelope(
            r#"<tev:GetEventPropertiesResponse>
                 <tev:TopicNamespaceLocation>http://www.onvif.org/onvif/ver10/topics/topicns.xml</tev:TopicNamespaceLocation>
                 <wsnt:FixedTopicSet>true</wsnt:FixedTopicSet>
                 <wstop:TopicSet>
                   <tns1:VideoSource><MotionAlarm wstop:topic="true"/></tns1:VideoSource>
                 </wstop:TopicSet>
               </tev:GetEventPropertiesResponse>"#,
        ))
        .create();

    let session = DeviceSession::connect(&credentials(&server)).unwrap();
    let document = session.describe_event_properties().unwrap();

    assert!(document.fixed_topic_set);
    assert_eq!(document.topics(), vec!["tns1:VideoSource/MotionAlarm".to_string()]);
    properties.assert();
}

#[test]
fn test_create_subscription_and_pull() {
    let mut server = Server::new();
    let _capabilities = mock_capabilities(&mut server);
    let _create = mock_create_pull_point(&mut server, 0);

    let to_header = format!("<wsa:To>{}/onvif/Subscription/0</wsa:To>", server.url());
    let pull = server
        .mock("POST", "/onvif/Subscription/0")
        .match_body(Matcher::AllOf(vec![
            Matcher::Regex("<Timeout>PT10S</Timeout>".to_string()),
            Matcher::Regex("<MessageLimit>10</MessageLimit>".to_string()),
            Matcher::Regex(regex_escape(&to_header)),
        ]))
        .with_status(200)
        .with_body(envelope(
            r#"<tev:PullMessagesResponse>
                 <tev:CurrentTime>2026-10-18T08:00:10Z</tev:CurrentTime>
                 <tev:TerminationTime>2026-10-18T09:00:00Z</tev:TerminationTime>
                 <wsnt:NotificationMessage>
                   <wsnt:Topic>tns1:VideoSource/MotionAlarm</wsnt:Topic>
                   <wsnt:Message><tt:Message UtcTime="2026-10-18T08:00:09Z" PropertyOperation="Changed">
                     <tt:Source><tt:SimpleItem Name="Source" Value="VideoSource_1"/></tt:Source>
                     <tt:Data><tt:SimpleItem Name="State" Value="true"/></tt:Data>
                   </tt:Message></wsnt:Message>
                 </wsnt:NotificationMessage>
               </tev:PullMessagesResponse>"#,
        ))
        .create();

    let session = DeviceSession::connect(&credentials(&server)).unwrap();
    let handle = session.create_subscription(Duration::from_secs(3600)).unwrap();
    assert_eq!(handle.address(), format!("{}/onvif/Subscription/0", server.url()));
    assert!(handle.termination_time().is_some());

    match session.pull(&handle, Duration::from_secs(10), 10).unwrap() {
        PullResult::MessageBatch(records) => {
            assert_eq!(records.len(), 1);
            assert_eq!(records[0].topic, "tns1:VideoSource/MotionAlarm");
            assert_eq!(records[0].data.get("State").map(String::as_str), Some("true"));
        }
        PullResult::Empty => panic!("Expected a message batch"),
    }
    pull.assert();
}

#[test]
fn test_pull_against_expired_subscription_is_fault() {
    let mut server = Server::new();
    let _capabilities = mock_capabilities(&mut server);
    let _create = mock_create_pull_point(&mut server, 1);
    let _pull = server
        .mock("POST", "/onvif/Subscription/1")
        .with_status(500)
        .with_body(envelope(
            r#"<env:Fault>
                 <env:Code><env:Value>env:Receiver</env:Value></env:Code>
                 <env:Reason><env:Text>Subscription does not exist</env:Text></env:Reason>
               </env:Fault>"#,
        ))
        .create();

    let session = DeviceSession::connect(&credentials(&server)).unwrap();
    let handle = session.create_subscription(Duration::from_secs(3600)).unwrap();
    let error = session.pull(&handle, Duration::from_secs(1), 10).unwrap_err();

    assert_eq!(error.kind(), FailureKind::Fault);
}

fn regex_escape(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        if "\\.+*?()|[]{}^$".contains(c) {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}
