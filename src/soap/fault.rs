//! SOAP Faults UPnP (parsing côté control point)

use super::envelope::{child_text_local, find_child_local};
use super::SoapEnvelope;

/// Erreur SOAP (Fault) renvoyée par un device.
#[derive(Debug, Clone)]
pub struct SoapFault {
    /// Code d'erreur SOAP (ex: "s:Client")
    pub fault_code: Option<String>,

    /// Description de l'erreur (ex: "UPnPError")
    pub fault_string: Option<String>,

    /// Détail UPnP optionnel
    pub upnp_error: Option<UpnpError>,
}

/// Erreur UPnP spécifique portée par `<detail>/<UPnPError>`.
#[derive(Debug, Clone)]
pub struct UpnpError {
    /// Code d'erreur UPnP (ex: 401, 718)
    pub error_code: Option<u32>,

    /// Description de l'erreur
    pub error_description: Option<String>,
}

/// Extract the `<Fault>` carried by a response envelope, if any.
///
/// All four fields are optional on the wire; whatever is present is
/// surfaced.
pub fn parse_soap_fault(envelope: &SoapEnvelope) -> Option<SoapFault> {
    let fault = envelope.body_element("Fault")?;

    let fault_code = child_text_local(fault, "faultcode");
    let fault_string = child_text_local(fault, "faultstring");

    let upnp_error = find_child_local(fault, "detail")
        .and_then(|detail| find_child_local(detail, "UPnPError"))
        .map(|err| UpnpError {
            error_code: child_text_local(err, "errorCode").and_then(|s| s.parse().ok()),
            error_description: child_text_local(err, "errorDescription"),
        });

    Some(SoapFault {
        fault_code,
        fault_string,
        upnp_error,
    })
}
