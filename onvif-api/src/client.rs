use soap_client::{SoapCall, SoapClient};
use tracing::debug;

use crate::{OnvifOperation, Result};

/// A client for executing ONVIF operations against actual devices
///
/// This client bridges the gap between the stateless operation definitions
/// and actual network requests. It uses the soap-client crate to handle the
/// underlying SOAP communication, including request signing.
///
/// ```rust,ignore
/// use onvif_api::{OnvifClient, SoapClient};
/// use onvif_api::operations::events::{GetEventPropertiesOperation, GetEventPropertiesRequest};
///
/// let client = OnvifClient::with_soap_client(SoapClient::new());
/// let properties = client.execute::<GetEventPropertiesOperation>(
///     "http://192.168.1.64/onvif/Events",
///     &GetEventPropertiesRequest,
/// )?;
/// ```
#[derive(Debug, Clone)]
pub struct OnvifClient {
    soap_client: SoapClient,
}

impl OnvifClient {
    /// Create a client with a custom SOAP client, typically one carrying credentials
    pub fn with_soap_client(soap_client: SoapClient) -> Self {
        Self { soap_client }
    }

    /// Execute an operation against the service at `url`
    ///
    /// Builds the payload and headers from the typed request, sends it, and
    /// parses the `{ACTION}Response` element into the typed response.
    pub fn execute<Op: OnvifOperation>(
        &self,
        url: &str,
        request: &Op::Request,
    ) -> Result<Op::Response> {
        let service_info = Op::SERVICE.info();
        let action = Op::SERVICE.action_uri(Op::ACTION);
        let payload = Op::build_payload(request);
        let headers = Op::build_headers(request);

        let call = SoapCall {
            action: &action,
            operation: Op::ACTION,
            namespace: service_info.namespace,
            payload: &payload,
            headers: &headers,
            timeout: Op::timeout(request),
        };

        let xml = self.soap_client.call(url, &call).inspect_err(|e| {
            debug!(operation = Op::ACTION, url, error = %e, "ONVIF operation failed");
        })?;

        Op::parse_response(&xml)
    }
}
