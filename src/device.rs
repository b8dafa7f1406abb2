//! Modèle objet d'un device UPnP : construction depuis une URL de
//! description, navigation services/actions, invocation typée.

use std::collections::HashMap;

use tracing::{debug, warn};

use crate::description::{parse_description, parse_scpd, ArgDef, DeviceDescription, ServiceStub, StateVariable};
use crate::errors::Error;
use crate::http::http_get;
use crate::session::{CallOverrides, SessionPolicy};
use crate::soap::parse_soap_fault;
use crate::soap_client::invoke_upnp_action;
use crate::ssdp::SsdpResponse;
use crate::variable_types::StateValue;

/// Un device UPnP complet : métadonnées, services typés, devices
/// embarqués. Possède la [`SessionPolicy`] appliquée à tous ses échanges.
#[derive(Debug)]
pub struct Device {
    description: DeviceDescription,
    services: Vec<Service>,
    device_list: Vec<Device>,
    /// Index figé à la construction : service_id complet, dernier segment,
    /// et forme assainie, tous vers la même entrée de la liste aplatie.
    service_map: HashMap<String, usize>,
    policy: SessionPolicy,
}

/// Un service d'un device, avec ses actions et variables d'état typées.
#[derive(Debug)]
pub struct Service {
    pub service_type: String,
    pub service_id: String,
    pub scpd_url: String,
    pub control_url: String,
    pub event_sub_url: String,
    actions: Vec<Action>,
    action_map: HashMap<String, usize>,
    statevars: HashMap<String, StateVariable>,
}

/// Une action invocable, liée au controlURL et au serviceType de son
/// service.
#[derive(Debug, Clone)]
pub struct Action {
    pub name: String,
    pub argsdef_in: Vec<(String, ArgDef)>,
    pub argsdef_out: Vec<(String, ArgDef)>,
    control_url: String,
    service_type: String,
}

/// Valeurs de sortie d'une action, dans l'ordre déclaré par le SCPD.
#[derive(Debug, Default)]
pub struct ActionOutput {
    values: Vec<(String, StateValue)>,
}

impl ActionOutput {
    pub fn get(&self, name: &str) -> Option<&StateValue> {
        self.values
            .iter()
            .find_map(|(n, v)| (n == name).then_some(v))
    }

    pub fn iter(&self) -> impl Iterator<Item = &(String, StateValue)> {
        self.values.iter()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl IntoIterator for ActionOutput {
    type Item = (String, StateValue);
    type IntoIter = std::vec::IntoIter<(String, StateValue)>;

    fn into_iter(self) -> Self::IntoIter {
        self.values.into_iter()
    }
}

impl Device {
    /// Fetch and build a device from its description URL: root XML, then
    /// one SCPD per service (embedded devices included).
    pub fn from_url(location: &str, policy: SessionPolicy) -> Result<Device, Error> {
        let xml = http_get(location, &policy)?;
        let description = parse_description(&xml, location)?;
        Device::from_description(description, policy)
    }

    /// Upgrade an SSDP search response to a full device.
    pub fn from_ssdp(response: &SsdpResponse, policy: SessionPolicy) -> Result<Device, Error> {
        Device::from_url(&response.location, policy)
    }

    /// Re-fetch la description et reconstruit le device. Seule façon de
    /// rafraîchir l'arbre : les instances existantes sont immuables.
    pub fn refresh(&self) -> Result<Device, Error> {
        Device::from_url(&self.description.location, self.policy.clone())
    }

    fn from_description(
        mut description: DeviceDescription,
        policy: SessionPolicy,
    ) -> Result<Device, Error> {
        let stubs = std::mem::take(&mut description.services);
        let embedded = std::mem::take(&mut description.device_list);

        let mut services = Vec::with_capacity(stubs.len());
        for stub in stubs {
            services.push(build_service(stub, &policy)?);
        }

        let mut device_list = Vec::with_capacity(embedded.len());
        for sub in embedded {
            device_list.push(Device::from_description(sub, policy.clone())?);
        }

        let mut device = Device {
            description,
            services,
            device_list,
            service_map: HashMap::new(),
            policy,
        };
        device.service_map = build_service_map(&device.flat_services());
        Ok(device)
    }

    /// Métadonnées brutes de la description.
    pub fn description(&self) -> &DeviceDescription {
        &self.description
    }

    pub fn friendly_name(&self) -> Option<&str> {
        self.description.friendly_name.as_deref()
    }

    pub fn udn(&self) -> Option<&str> {
        self.description.udn.as_deref()
    }

    pub fn location(&self) -> &str {
        &self.description.location
    }

    /// Devices embarqués.
    pub fn device_list(&self) -> &[Device] {
        &self.device_list
    }

    /// Tous les services, ceux du device racine d'abord puis ceux des
    /// devices embarqués en préordre.
    pub fn services(&self) -> Vec<&Service> {
        self.flat_services()
    }

    fn flat_services(&self) -> Vec<&Service> {
        let mut all: Vec<&Service> = self.services.iter().collect();
        for sub in &self.device_list {
            all.extend(sub.flat_services());
        }
        all
    }

    /// Recherche par service_id complet, dernier segment du service_id, ou
    /// forme assainie. Les trois clés résolvent le même service.
    pub fn find_service(&self, key: &str) -> Option<&Service> {
        let index = *self.service_map.get(key)?;
        self.flat_services().get(index).copied()
    }

    /// Première action portant ce nom, tous services confondus.
    pub fn find_action(&self, action_name: &str) -> Option<&Action> {
        self.flat_services()
            .iter()
            .find_map(|service| service.find_action(action_name))
    }

    /// Invoque `service_key.action_name` avec la politique du device,
    /// éventuellement surchargée pour cet appel.
    pub fn call_action(
        &self,
        service_key: &str,
        action_name: &str,
        args: &[(&str, StateValue)],
        overrides: Option<&CallOverrides>,
    ) -> Result<ActionOutput, Error> {
        let service = self.find_service(service_key).ok_or_else(|| {
            Error::validation(format!("no service matching '{}'", service_key))
        })?;
        let action = service.find_action(action_name).ok_or_else(|| {
            Error::validation(format!(
                "service '{}' has no action '{}'",
                service.service_id, action_name
            ))
        })?;
        action.invoke(&self.policy.layered(overrides), args)
    }

    pub fn policy(&self) -> &SessionPolicy {
        &self.policy
    }

    pub fn policy_mut(&mut self) -> &mut SessionPolicy {
        &mut self.policy
    }
}

impl Service {
    /// Nom court : dernier segment du serviceId.
    pub fn name(&self) -> &str {
        last_segment(&self.service_id)
    }

    pub fn actions(&self) -> &[Action] {
        &self.actions
    }

    pub fn find_action(&self, name: &str) -> Option<&Action> {
        self.action_map.get(name).and_then(|i| self.actions.get(*i))
    }

    pub fn statevars(&self) -> &HashMap<String, StateVariable> {
        &self.statevars
    }
}

impl Action {
    /// Valide, encode et envoie l'action ; décode les arguments `out`.
    ///
    /// `args` associe chaque nom d'argument `in` à une valeur ; la valeur
    /// est coercée vers le type déclaré puis validée (allowedValueList,
    /// allowedValueRange). Toute erreur de validation est rendue avant la
    /// moindre E/S réseau.
    pub fn invoke(
        &self,
        policy: &SessionPolicy,
        args: &[(&str, StateValue)],
    ) -> Result<ActionOutput, Error> {
        let encoded = self.validate_and_encode(args)?;
        let encoded_refs: Vec<(&str, &str)> = encoded
            .iter()
            .map(|(n, v)| (n.as_str(), v.as_str()))
            .collect();

        let result = invoke_upnp_action(
            &self.control_url,
            &self.service_type,
            &self.name,
            &encoded_refs,
            policy,
        )?;

        if !result.status.is_success() {
            if let Some(fault) = result.envelope.as_ref().and_then(parse_soap_fault) {
                let (error_code, error_description) = match fault.upnp_error {
                    Some(upnp) => (upnp.error_code, upnp.error_description),
                    None => (None, None),
                };
                return Err(Error::SoapFault {
                    fault_code: fault.fault_code,
                    fault_string: fault.fault_string,
                    error_code,
                    error_description,
                });
            }
            return Err(Error::Http {
                status: result.status.as_u16(),
                reason: result
                    .status
                    .canonical_reason()
                    .unwrap_or("")
                    .to_string(),
                body: result.raw_body,
            });
        }

        let envelope = result.envelope.ok_or_else(|| {
            Error::parse(format!(
                "response to '{}' does not contain a SOAP envelope",
                self.name
            ))
        })?;

        let response_name = format!("{}Response", self.name);
        let response = envelope.body_element(&response_name).ok_or_else(|| {
            Error::parse(format!("SOAP body has no <{}> element", response_name))
        })?;

        let mut output = ActionOutput::default();
        for (out_name, out_def) in &self.argsdef_out {
            let text = response
                .children
                .iter()
                .find_map(|node| match node {
                    xmltree::XMLNode::Element(elem)
                        if elem.name.rsplit(':').next().unwrap_or(elem.name.as_str())
                            == out_name =>
                    {
                        Some(elem.get_text().unwrap_or_default().to_string())
                    }
                    _ => None,
                })
                .ok_or_else(|| {
                    Error::parse(format!(
                        "<{}> is missing expected element <{}>",
                        response_name, out_name
                    ))
                })?;
            let value = StateValue::parse(out_def.datatype, &text).map_err(|e| {
                Error::parse(format!("cannot decode output '{}': {}", out_name, e))
            })?;
            output.values.push((out_name.clone(), value));
        }

        debug!(action = self.name.as_str(), outputs = output.len(), "action completed");
        Ok(output)
    }

    /// Vérifie la liste d'arguments contre la signature et rend les formes
    /// fil, dans l'ordre de déclaration du SCPD. Les raisons d'échec sont
    /// toutes collectées avant de rendre l'erreur.
    fn validate_and_encode(
        &self,
        args: &[(&str, StateValue)],
    ) -> Result<Vec<(String, String)>, Error> {
        let mut reasons: Vec<String> = Vec::new();

        let mut supplied: HashMap<&str, &StateValue> = HashMap::new();
        for (name, value) in args {
            if supplied.insert(*name, value).is_some() {
                reasons.push(format!("argument '{}' supplied twice", name));
            }
        }

        for name in supplied.keys() {
            if !self.argsdef_in.iter().any(|(n, _)| n == name) {
                reasons.push(format!("unknown argument '{}'", name));
            }
        }

        let mut encoded: Vec<(String, String)> = Vec::with_capacity(self.argsdef_in.len());
        for (name, def) in &self.argsdef_in {
            let Some(value) = supplied.get(name.as_str()) else {
                reasons.push(format!("missing required argument '{}'", name));
                continue;
            };

            let coerced = match value.try_cast(def.datatype) {
                Ok(coerced) => coerced,
                Err(e) => {
                    reasons.push(format!("argument '{}': {}", name, e));
                    continue;
                }
            };

            let wire = coerced.to_string();

            if !def.allowed_values.is_empty() && !def.allowed_values.contains(&wire) {
                reasons.push(format!(
                    "argument '{}': value '{}' not in allowed list",
                    name, wire
                ));
                continue;
            }

            if let Some(range) = &def.allowed_value_range {
                if !range.is_in_range(&coerced) {
                    reasons.push(format!(
                        "argument '{}': value '{}' out of allowed range",
                        name, wire
                    ));
                    continue;
                }
            }

            encoded.push((name.clone(), wire));
        }

        if !reasons.is_empty() {
            return Err(Error::Validation(reasons.join("; ")));
        }
        Ok(encoded)
    }
}

fn build_service(stub: ServiceStub, policy: &SessionPolicy) -> Result<Service, Error> {
    debug!(
        service_id = stub.service_id.as_str(),
        scpd_url = stub.scpd_url.as_str(),
        "fetching SCPD"
    );
    let xml = http_get(&stub.scpd_url, policy)?;
    let scpd = parse_scpd(&xml)?;

    let statevars: HashMap<String, StateVariable> = scpd
        .statevars
        .into_iter()
        .map(|var| (var.name.clone(), var))
        .collect();

    let actions: Vec<Action> = scpd
        .actions
        .into_iter()
        .map(|def| Action {
            name: def.name,
            argsdef_in: def.argsdef_in,
            argsdef_out: def.argsdef_out,
            control_url: stub.control_url.clone(),
            service_type: stub.service_type.clone(),
        })
        .collect();

    let mut action_map = HashMap::new();
    for (index, action) in actions.iter().enumerate() {
        action_map.entry(action.name.clone()).or_insert(index);
    }

    Ok(Service {
        service_type: stub.service_type,
        service_id: stub.service_id,
        scpd_url: stub.scpd_url,
        control_url: stub.control_url,
        event_sub_url: stub.event_sub_url,
        actions,
        action_map,
        statevars,
    })
}

/// Les trois formes d'indexation d'un service. Premier arrivé, premier
/// servi en cas de collision entre services.
fn build_service_map(services: &[&Service]) -> HashMap<String, usize> {
    let mut map = HashMap::new();
    for (index, service) in services.iter().enumerate() {
        for key in service_keys(&service.service_id) {
            if map.contains_key(&key) {
                warn!("service key '{}' already taken, keeping the first", key);
                continue;
            }
            map.insert(key, index);
        }
    }
    map
}

fn service_keys(service_id: &str) -> Vec<String> {
    let mut keys = vec![service_id.to_string()];
    let short = last_segment(service_id);
    if !short.is_empty() && !keys.iter().any(|k| k == short) {
        keys.push(short.to_string());
    }
    let sanitised: String = short
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || *c == '_')
        .collect();
    if !sanitised.is_empty() && !keys.iter().any(|k| k == &sanitised) {
        keys.push(sanitised);
    }
    keys
}

fn last_segment(service_id: &str) -> &str {
    match service_id.rfind(':') {
        Some(index) => &service_id[index + 1..],
        None => service_id,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::variable_types::StateVarType;
    use std::collections::BTreeSet;

    fn test_action() -> Action {
        let proto_def = ArgDef {
            related_statevar: "PortMappingProtocol".into(),
            datatype: StateVarType::String,
            allowed_values: BTreeSet::from(["TCP".to_string(), "UDP".to_string()]),
            allowed_value_range: None,
        };
        let port_def = ArgDef {
            related_statevar: "ExternalPort".into(),
            datatype: StateVarType::UI2,
            allowed_values: BTreeSet::new(),
            allowed_value_range: None,
        };
        Action {
            name: "AddPortMapping".into(),
            argsdef_in: vec![
                ("NewExternalPort".into(), port_def),
                ("NewProtocol".into(), proto_def),
            ],
            argsdef_out: vec![],
            control_url: "http://10.0.0.1/ctl/IPConn".into(),
            service_type: "urn:schemas-upnp-org:service:WANIPConnection:1".into(),
        }
    }

    #[test]
    fn encoding_follows_declaration_order() {
        let action = test_action();
        // caller order is irrelevant, SCPD order wins
        let encoded = action
            .validate_and_encode(&[
                ("NewProtocol", StateValue::from("TCP")),
                ("NewExternalPort", StateValue::UI2(12345)),
            ])
            .unwrap();
        assert_eq!(encoded[0], ("NewExternalPort".to_string(), "12345".to_string()));
        assert_eq!(encoded[1], ("NewProtocol".to_string(), "TCP".to_string()));
    }

    #[test]
    fn allowed_values_are_case_sensitive() {
        let action = test_action();
        let err = action
            .validate_and_encode(&[
                ("NewExternalPort", StateValue::UI2(1)),
                ("NewProtocol", StateValue::from("tcp")),
            ])
            .unwrap_err();
        assert!(matches!(err, Error::Validation(_)));
    }

    #[test]
    fn missing_and_unknown_arguments_are_reported_together() {
        let action = test_action();
        let err = action
            .validate_and_encode(&[("NewBogus", StateValue::UI1(1))])
            .unwrap_err();
        let message = err.to_string();
        assert!(message.contains("unknown argument 'NewBogus'"));
        assert!(message.contains("missing required argument 'NewExternalPort'"));
        assert!(message.contains("missing required argument 'NewProtocol'"));
    }

    #[test]
    fn integer_coercion_checks_target_range() {
        let action = test_action();
        let err = action
            .validate_and_encode(&[
                ("NewExternalPort", StateValue::UI4(70000)),
                ("NewProtocol", StateValue::from("TCP")),
            ])
            .unwrap_err();
        assert!(matches!(err, Error::Validation(_)));
    }

    #[test]
    fn service_keys_three_forms() {
        let keys = service_keys("urn:upnp-org:serviceId:WANIPConn1");
        assert_eq!(
            keys,
            vec!["urn:upnp-org:serviceId:WANIPConn1".to_string(), "WANIPConn1".to_string()]
        );
        let keys = service_keys("urn:upnp-org:serviceId:wandsllc:pvc_Internet");
        assert!(keys.contains(&"pvc_Internet".to_string()));
    }
}
