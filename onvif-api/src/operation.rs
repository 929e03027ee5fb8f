//! Operation framework for ONVIF SOAP calls

use std::time::Duration;
use xmltree::Element;

use crate::error::ApiError;
use crate::service::Service;

/// Base trait for all ONVIF operations
///
/// This trait defines the common interface that all operations must implement.
/// It provides type safety through associated types and keeps request
/// construction and response parsing next to each other, independent of the
/// transport that carries them.
pub trait OnvifOperation {
    /// The request type for this operation
    type Request;

    /// The response type for this operation
    type Response;

    /// The service this operation belongs to
    const SERVICE: Service;

    /// The body element name, e.g. `PullMessages`
    const ACTION: &'static str;

    /// Build the inner XML of the request body element
    ///
    /// The body element itself (with the service namespace as default
    /// namespace) is written by the client, so child elements inherit it.
    fn build_payload(request: &Self::Request) -> String;

    /// Extra SOAP header blocks for this request
    fn build_headers(_request: &Self::Request) -> Vec<String> {
        Vec::new()
    }

    /// Overall deadline for this request, when it differs from the client default
    fn timeout(_request: &Self::Request) -> Option<Duration> {
        None
    }

    /// Parse the `{ACTION}Response` element into the typed response
    fn parse_response(xml: &Element) -> Result<Self::Response, ApiError>;
}

/// Trimmed text content of a direct child element
pub(crate) fn child_text(xml: &Element, name: &str) -> Option<String> {
    xml.get_child(name)
        .and_then(|e| e.get_text())
        .map(|t| t.trim().to_string())
}

/// Trimmed text of every direct child with the given name, in document order
pub(crate) fn children_text(xml: &Element, name: &str) -> Vec<String> {
    xml.children
        .iter()
        .filter_map(|node| node.as_element())
        .filter(|e| e.name == name)
        .filter_map(|e| e.get_text().map(|t| t.trim().to_string()))
        .collect()
}

/// Every direct child element with the given name, in document order
pub(crate) fn child_elements<'a>(xml: &'a Element, name: &'a str) -> impl Iterator<Item = &'a Element> + 'a {
    xml.children
        .iter()
        .filter_map(|node| node.as_element())
        .filter(move |e| e.name == name)
}
