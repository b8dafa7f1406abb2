//! Parser d'enveloppes SOAP de réponse

use std::io::BufReader;

use xmltree::Element;

use super::envelope::local_name;
use super::{SoapBody, SoapEnvelope, SoapHeader};

/// Erreur de parsing SOAP
#[derive(Debug, thiserror::Error)]
pub enum SoapParseError {
    #[error("XML parse error: {0}")]
    XmlError(#[from] xmltree::ParseError),

    #[error("Missing SOAP Envelope")]
    MissingEnvelope,

    #[error("Missing SOAP Body")]
    MissingBody,
}

/// Parse une enveloppe SOAP complète
pub fn parse_soap_envelope(xml: &[u8]) -> Result<SoapEnvelope, SoapParseError> {
    // Certains devices renvoient plusieurs déclarations <?xml ?> quand ils
    // recrachent leurs propres fichiers de configuration.
    let cleaned = remove_extraneous_xml_declarations(xml);
    let reader = BufReader::new(cleaned.as_slice());
    let root = Element::parse(reader)?;

    if local_name(&root.name) != "Envelope" {
        return Err(SoapParseError::MissingEnvelope);
    }

    let header = root
        .children
        .iter()
        .find_map(|n| n.as_element())
        .filter(|e| local_name(&e.name) == "Header")
        .map(|e| SoapHeader { content: e.clone() });

    let body_elem = root
        .children
        .iter()
        .find_map(|n| n.as_element().filter(|e| local_name(&e.name) == "Body"))
        .ok_or(SoapParseError::MissingBody)?;

    Ok(SoapEnvelope {
        header,
        body: SoapBody {
            content: body_elem.clone(),
        },
    })
}

/// Ne garde que la première déclaration `<?xml ... ?>` du document.
fn remove_extraneous_xml_declarations(xml: &[u8]) -> Vec<u8> {
    let text = String::from_utf8_lossy(xml);
    let trimmed = text.trim_start();
    let (declaration, mut rest) = match trimmed.strip_prefix("<?xml") {
        Some(after) => match after.find("?>") {
            Some(pos) => (&trimmed[..5 + pos + 2], &after[pos + 2..]),
            None => ("", trimmed),
        },
        None => ("", trimmed),
    };

    let mut cleaned = String::with_capacity(text.len());
    cleaned.push_str(declaration);
    loop {
        match rest.find("<?xml") {
            Some(start) => {
                cleaned.push_str(&rest[..start]);
                match rest[start..].find("?>") {
                    Some(end) => rest = &rest[start + end + 2..],
                    None => {
                        rest = &rest[start..];
                        break;
                    }
                }
            }
            None => break,
        }
    }
    cleaned.push_str(rest);
    cleaned.into_bytes()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_simple_response() {
        let xml = r#"<?xml version="1.0"?>
<s:Envelope xmlns:s="http://schemas.xmlsoap.org/soap/envelope/">
  <s:Body>
    <u:GetExternalIPAddressResponse xmlns:u="urn:schemas-upnp-org:service:WANIPConnection:1">
      <NewExternalIPAddress>203.0.113.7</NewExternalIPAddress>
    </u:GetExternalIPAddressResponse>
  </s:Body>
</s:Envelope>"#;

        let envelope = parse_soap_envelope(xml.as_bytes()).unwrap();
        let response = envelope
            .body_element("GetExternalIPAddressResponse")
            .unwrap();
        assert!(response.name.ends_with("GetExternalIPAddressResponse"));
    }

    #[test]
    fn not_an_envelope() {
        let xml = "<other/>";
        assert!(matches!(
            parse_soap_envelope(xml.as_bytes()),
            Err(SoapParseError::MissingEnvelope)
        ));
    }

    #[test]
    fn missing_body() {
        let xml = r#"<s:Envelope xmlns:s="http://schemas.xmlsoap.org/soap/envelope/"/>"#;
        assert!(matches!(
            parse_soap_envelope(xml.as_bytes()),
            Err(SoapParseError::MissingBody)
        ));
    }

    #[test]
    fn duplicate_xml_declarations_are_stripped() {
        let xml = "<?xml version=\"1.0\"?>\n<?xml version=\"1.0\"?>\n<s:Envelope xmlns:s=\"http://schemas.xmlsoap.org/soap/envelope/\"><s:Body/></s:Envelope>";
        assert!(parse_soap_envelope(xml.as_bytes()).is_ok());
    }
}
