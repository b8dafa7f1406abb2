//! Construction de requêtes SOAP

use xmltree::{Element, EmitterConfig, XMLNode};

use super::{ENCODING_STYLE, NS_SOAP_ENV};

/// Construit la requête SOAP d'une action UPnP
///
/// # Arguments
///
/// * `service_urn` - URN du service (ex: "urn:schemas-upnp-org:service:WANIPConnection:1")
/// * `action` - Nom de l'action (ex: "AddPortMapping")
/// * `args` - Arguments `in`, dans l'ordre déclaré par le SCPD
///
/// # Returns
///
/// XML SOAP formaté en String, déclaration `<?xml?>` incluse. L'échappement
/// des valeurs est fait par l'émetteur.
pub fn build_soap_request(
    service_urn: &str,
    action: &str,
    args: &[(&str, &str)],
) -> Result<String, xmltree::Error> {
    // Format: <u:Action xmlns:u="service-urn">
    let mut action_elem = Element::new(&format!("u:{}", action));
    action_elem
        .attributes
        .insert("xmlns:u".to_string(), service_urn.to_string());

    for (name, value) in args {
        let mut child = Element::new(name);
        child.children.push(XMLNode::Text(value.to_string()));
        action_elem.children.push(XMLNode::Element(child));
    }

    // Construire le Body
    let mut body = Element::new("s:Body");
    body.children.push(XMLNode::Element(action_elem));

    // Construire l'Envelope
    let mut envelope = Element::new("s:Envelope");
    envelope
        .attributes
        .insert("xmlns:s".to_string(), NS_SOAP_ENV.to_string());
    envelope
        .attributes
        .insert("s:encodingStyle".to_string(), ENCODING_STYLE.to_string());
    envelope.children.push(XMLNode::Element(body));

    // Sérialiser en XML
    let mut buf = Vec::new();
    let config = EmitterConfig::new().write_document_declaration(true);
    envelope.write_with_config(&mut buf, config)?;

    Ok(String::from_utf8(buf).unwrap_or_default())
}
