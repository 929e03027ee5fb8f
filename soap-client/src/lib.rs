//! Private SOAP client for ONVIF device communication
//!
//! This crate provides a minimal SOAP 1.2 client specifically designed for
//! talking to ONVIF devices. Requests are signed with a WS-Security
//! UsernameToken when credentials are configured, and SOAP faults are
//! surfaced as structured errors regardless of the HTTP status they arrive with.

mod error;
mod security;

pub use error::{SoapError, SoapFault};
pub use security::{password_digest, UsernameToken};

use std::time::Duration;
use tracing::{debug, trace};
use xmltree::{Element, EmitterConfig};

/// SOAP 1.2 envelope namespace
pub const SOAP_ENV_NS: &str = "http://www.w3.org/2003/05/soap-envelope";

/// WS-Addressing namespace, bound to the `wsa` prefix on every envelope
pub const WSA_NS: &str = "http://www.w3.org/2005/08/addressing";

/// A single SOAP request
#[derive(Debug, Clone, Copy)]
pub struct SoapCall<'a> {
    /// Full action URI, sent in the `Content-Type` action parameter
    pub action: &'a str,
    /// Local name of the body element (the response is expected as `{operation}Response`)
    pub operation: &'a str,
    /// Namespace of the body element
    pub namespace: &'a str,
    /// Inner XML of the body element
    pub payload: &'a str,
    /// Extra header blocks, written after the security header
    pub headers: &'a [String],
    /// Overall deadline for this request, overriding the agent read timeout
    pub timeout: Option<Duration>,
}

/// A minimal SOAP client for ONVIF device communication
#[derive(Debug, Clone)]
pub struct SoapClient {
    agent: ureq::Agent,
    token: Option<UsernameToken>,
}

impl SoapClient {
    /// Create a new SOAP client with default configuration
    pub fn new() -> Self {
        Self {
            agent: ureq::AgentBuilder::new()
                .timeout_connect(Duration::from_secs(5))
                .timeout_read(Duration::from_secs(10))
                .build(),
            token: None,
        }
    }

    /// Sign every request with the given UsernameToken
    pub fn with_credentials(mut self, token: UsernameToken) -> Self {
        self.token = Some(token);
        self
    }

    /// Send a SOAP request and return the parsed response element
    pub fn call(&self, url: &str, call: &SoapCall<'_>) -> Result<Element, SoapError> {
        let body = self.envelope(call);
        let content_type = format!(
            "application/soap+xml; charset=utf-8; action=\"{}\"",
            call.action
        );

        debug!(url, operation = call.operation, "sending SOAP request");
        trace!(%body, "SOAP request body");

        let mut request = self.agent.post(url).set("Content-Type", &content_type);
        if let Some(timeout) = call.timeout {
            request = request.timeout(timeout);
        }

        let xml_text = match request.send_string(&body) {
            Ok(response) => response
                .into_string()
                .map_err(|e| SoapError::Network(e.to_string()))?,
            Err(ureq::Error::Status(status, response)) => {
                // SOAP 1.2 delivers faults with 4xx/5xx statuses
                let text = response.into_string().unwrap_or_default();
                if let Ok(xml) = Element::parse(text.as_bytes()) {
                    if let Some(fault) = find_fault(&xml) {
                        return Err(SoapError::Fault(fault));
                    }
                }
                return Err(SoapError::Network(format!("HTTP {} from {}", status, url)));
            }
            Err(e) => return Err(SoapError::Network(e.to_string())),
        };

        trace!(body = %xml_text, "SOAP response body");

        let xml = Element::parse(xml_text.as_bytes())
            .map_err(|e| SoapError::Parse(e.to_string()))?;

        self.extract_response(&xml, call.operation)
    }

    fn envelope(&self, call: &SoapCall<'_>) -> String {
        let security = self
            .token
            .as_ref()
            .map(UsernameToken::header)
            .unwrap_or_default();

        format!(
            r#"<?xml version="1.0" encoding="UTF-8"?><s:Envelope xmlns:s="{env}" xmlns:wsa="{wsa}"><s:Header>{security}{headers}</s:Header><s:Body><{operation} xmlns="{namespace}">{payload}</{operation}></s:Body></s:Envelope>"#,
            env = SOAP_ENV_NS,
            wsa = WSA_NS,
            security = security,
            headers = call.headers.concat(),
            operation = call.operation,
            namespace = call.namespace,
            payload = call.payload,
        )
    }

    fn extract_response(&self, xml: &Element, operation: &str) -> Result<Element, SoapError> {
        let body = xml
            .get_child("Body")
            .ok_or_else(|| SoapError::Parse("Missing SOAP Body".to_string()))?;

        if let Some(fault) = body.get_child("Fault") {
            return Err(SoapError::Fault(parse_fault(fault)));
        }

        let response_name = format!("{}Response", operation);
        body.get_child(response_name.as_str())
            .cloned()
            .ok_or_else(|| SoapError::Parse(format!("Missing {} element", response_name)))
    }
}

impl Default for SoapClient {
    fn default() -> Self {
        Self::new()
    }
}

fn find_fault(envelope: &Element) -> Option<SoapFault> {
    envelope
        .get_child("Body")
        .and_then(|body| body.get_child("Fault"))
        .map(parse_fault)
}

fn parse_fault(fault: &Element) -> SoapFault {
    let text = |element: Option<&Element>| {
        element
            .and_then(|e| e.get_text())
            .map(|t| t.trim().to_string())
    };

    let code_element = fault.get_child("Code");
    let code = text(code_element.and_then(|c| c.get_child("Value")))
        .or_else(|| text(fault.get_child("faultcode")))
        .unwrap_or_else(|| "unknown".to_string());
    let subcode = text(
        code_element
            .and_then(|c| c.get_child("Subcode"))
            .and_then(|s| s.get_child("Value")),
    );
    let reason = text(fault.get_child("Reason").and_then(|r| r.get_child("Text")))
        .or_else(|| text(fault.get_child("faultstring")))
        .unwrap_or_default();

    SoapFault {
        code,
        subcode,
        reason,
    }
}

/// Serialize an element (and its children) back to XML text without a document declaration
pub fn element_to_string(element: &Element) -> Result<String, SoapError> {
    let mut buffer = Vec::new();
    element
        .write_with_config(
            &mut buffer,
            EmitterConfig::new().write_document_declaration(false),
        )
        .map_err(|e| SoapError::Parse(e.to_string()))?;
    String::from_utf8(buffer).map_err(|e| SoapError::Parse(e.to_string()))
}

/// Escape text for inclusion in XML content or attribute values
pub fn escape_xml(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&apos;"),
            _ => escaped.push(c),
        }
    }
    escaped
}
