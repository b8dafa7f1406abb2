//! Envoi HTTP d'une action SOAP vers le controlURL d'un service.

use tracing::{debug, trace, warn};

use crate::errors::Error;
use crate::http::{authorization_header, build_agent};
use crate::session::SessionPolicy;
use crate::soap::{build_soap_request, parse_soap_envelope, SoapEnvelope};

/// Result of a SOAP call:
/// - HTTP status code
/// - raw XML body (always)
/// - parsed SOAP envelope if parsing succeeded
pub struct SoapCallResult {
    pub status: ureq::http::StatusCode,
    pub raw_body: String,
    pub envelope: Option<SoapEnvelope>,
}

/// Invoke a UPnP SOAP action on a control URL.
///
/// - `control_url`: full HTTP URL of the service control endpoint
/// - `service_type`: service URN
/// - `action`: action name
/// - `args`: list of (name, encoded value), in SCPD declaration order
/// - `policy`: effective session policy (auth, headers, timeout, TLS)
pub fn invoke_upnp_action(
    control_url: &str,
    service_type: &str,
    action: &str,
    args: &[(&str, &str)],
    policy: &SessionPolicy,
) -> Result<SoapCallResult, Error> {
    let body_xml = build_soap_request(service_type, action, args)
        .map_err(|e| Error::parse(format!("failed to build SOAP request body: {}", e)))?;

    let arg_log = summarize_args_for_log(args);
    debug!(
        url = control_url,
        action = action,
        service_type = service_type,
        args = ?arg_log,
        "Sending SOAP request"
    );
    trace!(body = body_xml.as_str(), "SOAP request body");

    let agent = build_agent(policy)?;

    let soap_action_header = format!(r#""{}#{}""#, service_type, action);

    let mut request = agent
        .post(control_url)
        .header("Content-Type", r#"text/xml; charset="utf-8""#)
        .header("SOAPACTION", soap_action_header.as_str());
    if let Some(authorization) = authorization_header(policy) {
        request = request.header("Authorization", authorization.as_str());
    }
    for (name, value) in &policy.http_headers {
        request = request.header(name.as_str(), value.as_str());
    }

    let mut response = request.send(body_xml)?;

    let status = response.status();
    debug!(status = status.as_u16(), "SOAP response received");

    let raw_body = response.body_mut().read_to_string()?;

    // Try to parse SOAP envelope; non-fatal on failure
    let parsed_envelope = parse_soap_envelope(raw_body.as_bytes()).ok();

    if !status.is_success() {
        warn!(
            url = control_url,
            action = action,
            service_type = service_type,
            status = status.as_u16(),
            body_snippet = %response_snippet(&raw_body),
            "SOAP call returned non-success status"
        );
    }

    Ok(SoapCallResult {
        status,
        raw_body,
        envelope: parsed_envelope,
    })
}

fn summarize_args_for_log<'a>(args: &'a [(&'a str, &'a str)]) -> Vec<String> {
    args.iter()
        .map(|(name, value)| format!("{}:{}B {}", name, value.len(), preview_value(value)))
        .collect()
}

fn preview_value(value: &str) -> String {
    const MAX_PREVIEW: usize = 96;
    if value.len() <= MAX_PREVIEW {
        value.to_string()
    } else {
        format!("{}…", &value[..MAX_PREVIEW])
    }
}

fn response_snippet(body: &str) -> String {
    const MAX_LEN: usize = 256;
    let trimmed = body.trim();
    if trimmed.len() <= MAX_LEN {
        trimmed.to_string()
    } else {
        format!("{}…", &trimmed[..MAX_LEN])
    }
}
