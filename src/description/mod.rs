//! # Description de device et SCPD
//!
//! Parsing des deux schémas XML UPnP côté control point :
//!
//! - la description racine (`urn:schemas-upnp-org:device-1-0`), qui donne
//!   les métadonnées du device, ses services et ses devices embarqués ;
//! - le SCPD de chaque service (`urn:schemas-upnp-org:service-1-0`), qui
//!   donne actions, arguments et variables d'état.
//!
//! Les deux parsers travaillent par nom local (les préfixes de namespace
//! des devices réels sont incohérents) et ignorent les éléments inconnus.

mod device;
mod scpd;

use std::collections::BTreeSet;

pub use device::parse_description;
pub use scpd::parse_scpd;

use crate::value_ranges::ValueRange;
use crate::variable_types::StateVarType;

/// Métadonnées d'un device tirées de `<root>/<device>`, plus la base de
/// résolution d'URL. Les champs optionnels absents restent `None`.
#[derive(Debug, Clone, Default)]
pub struct DeviceDescription {
    pub location: String,
    pub url_base: String,
    pub device_type: Option<String>,
    pub friendly_name: Option<String>,
    pub manufacturer: Option<String>,
    pub manufacturer_url: Option<String>,
    pub model_description: Option<String>,
    pub model_name: Option<String>,
    pub model_number: Option<String>,
    pub model_url: Option<String>,
    pub serial_number: Option<String>,
    pub udn: Option<String>,
    pub upc: Option<String>,
    pub presentation_url: Option<String>,
    pub services: Vec<ServiceStub>,
    pub device_list: Vec<DeviceDescription>,
}

/// Entrée de `<serviceList>` : les URLs sont résolues en absolu contre
/// `URLBase` (ou l'URL de description) dès le parsing.
#[derive(Debug, Clone)]
pub struct ServiceStub {
    pub service_type: String,
    pub service_id: String,
    pub scpd_url: String,
    pub control_url: String,
    pub event_sub_url: String,
}

/// Contenu d'un SCPD après résolution des `relatedStateVariable`.
#[derive(Debug, Clone, Default)]
pub struct Scpd {
    pub actions: Vec<ActionDef>,
    pub statevars: Vec<StateVariable>,
}

#[derive(Debug, Clone)]
pub struct ActionDef {
    pub name: String,
    pub argsdef_in: Vec<(String, ArgDef)>,
    pub argsdef_out: Vec<(String, ArgDef)>,
}

/// Signature typée d'un argument, obtenue en croisant l'argument avec sa
/// variable d'état.
#[derive(Debug, Clone)]
pub struct ArgDef {
    pub related_statevar: String,
    pub datatype: StateVarType,
    pub allowed_values: BTreeSet<String>,
    pub allowed_value_range: Option<ValueRange>,
}

#[derive(Debug, Clone)]
pub struct StateVariable {
    pub name: String,
    pub datatype: StateVarType,
    pub send_events: bool,
    pub default_value: Option<String>,
    pub allowed_values: BTreeSet<String>,
    pub allowed_value_range: Option<ValueRange>,
}

impl Scpd {
    pub fn statevar(&self, name: &str) -> Option<&StateVariable> {
        self.statevars.iter().find(|v| v.name == name)
    }
}
