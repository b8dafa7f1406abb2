//! Parsing de la description racine d'un device.

use tracing::warn;
use url::Url;
use xmltree::{Element, XMLNode};

use super::{DeviceDescription, ServiceStub};
use crate::errors::Error;

/// Parse a root device description document fetched from `location`.
///
/// `<URLBase>` is honoured when present; otherwise relative SCPD/control/
/// event URLs resolve against the description URL itself (RFC 3986 strips
/// the path to the last `/`).
pub fn parse_description(xml: &str, location: &str) -> Result<DeviceDescription, Error> {
    let root = Element::parse(xml.as_bytes())?;
    if local_name(&root.name) != "root" {
        return Err(Error::parse(format!(
            "expected <root> document element, found <{}>",
            root.name
        )));
    }

    let base_str = child_text(&root, "URLBase");
    let base = match &base_str {
        Some(b) => Url::parse(b)
            .map_err(|e| Error::parse(format!("invalid URLBase '{}': {}", b, e)))?,
        None => Url::parse(location)
            .map_err(|e| Error::parse(format!("invalid description URL '{}': {}", location, e)))?,
    };

    let device = find_child(&root, "device")
        .ok_or_else(|| Error::parse("description has no <device> element"))?;

    Ok(parse_device(device, location, &base))
}

fn parse_device(elem: &Element, location: &str, base: &Url) -> DeviceDescription {
    let mut desc = DeviceDescription {
        location: location.to_string(),
        url_base: base.to_string(),
        device_type: child_text(elem, "deviceType"),
        friendly_name: child_text(elem, "friendlyName"),
        manufacturer: child_text(elem, "manufacturer"),
        manufacturer_url: child_text(elem, "manufacturerURL"),
        model_description: child_text(elem, "modelDescription"),
        model_name: child_text(elem, "modelName"),
        model_number: child_text(elem, "modelNumber"),
        model_url: child_text(elem, "modelURL"),
        serial_number: child_text(elem, "serialNumber"),
        udn: child_text(elem, "UDN"),
        upc: child_text(elem, "UPC"),
        presentation_url: child_text(elem, "presentationURL"),
        ..DeviceDescription::default()
    };

    if let Some(service_list) = find_child(elem, "serviceList") {
        for service in child_elements(service_list, "service") {
            desc.services.push(parse_service_stub(service, base));
        }
    }

    if let Some(device_list) = find_child(elem, "deviceList") {
        for embedded in child_elements(device_list, "device") {
            desc.device_list.push(parse_device(embedded, location, base));
        }
    }

    desc
}

fn parse_service_stub(elem: &Element, base: &Url) -> ServiceStub {
    ServiceStub {
        service_type: child_text(elem, "serviceType").unwrap_or_default(),
        service_id: child_text(elem, "serviceId").unwrap_or_default(),
        scpd_url: resolve_url(base, &child_text(elem, "SCPDURL").unwrap_or_default()),
        control_url: resolve_url(base, &child_text(elem, "controlURL").unwrap_or_default()),
        event_sub_url: resolve_url(base, &child_text(elem, "eventSubURL").unwrap_or_default()),
    }
}

/// Résolution relative → absolue ; en cas d'URL invalide on garde la forme
/// brute plutôt que d'échouer (les descriptions réelles sont pleines de
/// valeurs douteuses).
fn resolve_url(base: &Url, raw: &str) -> String {
    match base.join(raw) {
        Ok(url) => url.to_string(),
        Err(e) => {
            warn!("cannot resolve '{}' against {}: {}", raw, base, e);
            raw.to_string()
        }
    }
}

fn local_name(name: &str) -> &str {
    name.rsplit(':').next().unwrap_or(name)
}

fn find_child<'a>(parent: &'a Element, name: &str) -> Option<&'a Element> {
    parent.children.iter().find_map(|node| match node {
        XMLNode::Element(elem) if local_name(&elem.name) == name => Some(elem),
        _ => None,
    })
}

fn child_elements<'a>(parent: &'a Element, name: &'a str) -> impl Iterator<Item = &'a Element> {
    parent.children.iter().filter_map(move |node| match node {
        XMLNode::Element(elem) if local_name(&elem.name) == name => Some(elem),
        _ => None,
    })
}

fn child_text(parent: &Element, name: &str) -> Option<String> {
    let text = find_child(parent, name)?.get_text()?;
    let trimmed = text.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}
