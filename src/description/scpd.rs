//! Parsing en flux d'un SCPD (Service Control Protocol Definition).

use std::collections::BTreeSet;

use quick_xml::{events::Event, Reader};
use tracing::warn;

use super::{ActionDef, ArgDef, Scpd, StateVariable};
use crate::errors::Error;
use crate::value_ranges::ValueRange;
use crate::variable_types::{StateValue, StateVarType};

#[derive(Default)]
struct RawArgument {
    name: Option<String>,
    direction: Option<String>,
    related: Option<String>,
}

#[derive(Default)]
struct RawAction {
    name: Option<String>,
    arguments: Vec<RawArgument>,
}

#[derive(Default)]
struct RawStateVar {
    name: Option<String>,
    datatype: Option<String>,
    send_events: bool,
    default_value: Option<String>,
    allowed_values: BTreeSet<String>,
    range_min: Option<String>,
    range_max: Option<String>,
    range_step: Option<String>,
}

/// Parse an SCPD document into actions and state variables, cross-linking
/// each argument to its `relatedStateVariable`. A dangling reference or an
/// unknown `<dataType>` is a parse error; unknown elements are skipped.
pub fn parse_scpd(xml: &str) -> Result<Scpd, Error> {
    let mut reader = Reader::from_reader(xml.as_bytes());
    reader.config_mut().trim_text(true);

    let mut buf = Vec::new();

    let mut actions: Vec<RawAction> = Vec::new();
    let mut statevars: Vec<RawStateVar> = Vec::new();

    let mut in_action = false;
    let mut in_argument = false;
    let mut in_statevar = false;
    let mut in_allowed_list = false;
    let mut in_allowed_range = false;
    let mut current_tag: Option<String> = None;

    loop {
        match reader.read_event_into(&mut buf)? {
            Event::Start(e) => {
                let name = String::from_utf8_lossy(e.local_name().as_ref()).to_string();
                match name.as_str() {
                    "action" => {
                        in_action = true;
                        actions.push(RawAction::default());
                        current_tag = None;
                    }
                    "argument" if in_action => {
                        in_argument = true;
                        if let Some(action) = actions.last_mut() {
                            action.arguments.push(RawArgument::default());
                        }
                        current_tag = None;
                    }
                    "stateVariable" => {
                        in_statevar = true;
                        let mut var = RawStateVar {
                            send_events: true,
                            ..RawStateVar::default()
                        };
                        // sendEvents="no" désactive l'eventing (défaut "yes")
                        if let Ok(Some(attr)) = e.try_get_attribute("sendEvents") {
                            if let Ok(value) = attr.unescape_value() {
                                var.send_events = !value.trim().eq_ignore_ascii_case("no");
                            }
                        }
                        statevars.push(var);
                        current_tag = None;
                    }
                    "allowedValueList" if in_statevar => {
                        in_allowed_list = true;
                        current_tag = None;
                    }
                    "allowedValueRange" if in_statevar => {
                        in_allowed_range = true;
                        current_tag = None;
                    }
                    _ => {
                        current_tag = Some(name);
                    }
                }
            }
            Event::End(e) => {
                let name = String::from_utf8_lossy(e.local_name().as_ref()).to_string();
                match name.as_str() {
                    "action" => in_action = false,
                    "argument" => in_argument = false,
                    "stateVariable" => in_statevar = false,
                    "allowedValueList" => in_allowed_list = false,
                    "allowedValueRange" => in_allowed_range = false,
                    _ => {}
                }
                current_tag = None;
            }
            Event::Text(e) => {
                let Some(tag) = &current_tag else {
                    buf.clear();
                    continue;
                };
                let text = e.unescape()?.trim().to_string();
                if text.is_empty() {
                    buf.clear();
                    continue;
                }

                if in_argument {
                    if let Some(arg) = actions.last_mut().and_then(|a| a.arguments.last_mut()) {
                        match tag.as_str() {
                            "name" => arg.name = Some(text),
                            "direction" => arg.direction = Some(text),
                            "relatedStateVariable" => arg.related = Some(text),
                            _ => {}
                        }
                    }
                } else if in_action {
                    if tag == "name" {
                        if let Some(action) = actions.last_mut() {
                            action.name = Some(text);
                        }
                    }
                } else if in_statevar {
                    if let Some(var) = statevars.last_mut() {
                        if in_allowed_list {
                            if tag == "allowedValue" {
                                var.allowed_values.insert(text);
                            }
                        } else if in_allowed_range {
                            match tag.as_str() {
                                "minimum" => var.range_min = Some(text),
                                "maximum" => var.range_max = Some(text),
                                "step" => var.range_step = Some(text),
                                _ => {}
                            }
                        } else {
                            match tag.as_str() {
                                "name" => var.name = Some(text),
                                "dataType" => var.datatype = Some(text),
                                "defaultValue" => var.default_value = Some(text),
                                _ => {}
                            }
                        }
                    }
                }
            }
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }

    build_scpd(actions, statevars)
}

fn build_scpd(
    raw_actions: Vec<RawAction>,
    raw_vars: Vec<RawStateVar>,
) -> Result<Scpd, Error> {
    let mut scpd = Scpd::default();

    for raw in raw_vars {
        let name = raw
            .name
            .ok_or_else(|| Error::parse("stateVariable without <name>"))?;
        if scpd.statevar(&name).is_some() {
            warn!("duplicate stateVariable '{}', keeping the first", name);
            continue;
        }
        let datatype_str = raw
            .datatype
            .ok_or_else(|| Error::parse(format!("stateVariable '{}' without <dataType>", name)))?;
        let datatype: StateVarType = datatype_str
            .parse()
            .map_err(|_| Error::parse(format!("unknown dataType '{}'", datatype_str)))?;

        let allowed_value_range =
            build_range(&name, datatype, &raw.range_min, &raw.range_max, &raw.range_step);

        scpd.statevars.push(StateVariable {
            name,
            datatype,
            send_events: raw.send_events,
            default_value: raw.default_value,
            allowed_values: raw.allowed_values,
            allowed_value_range,
        });
    }

    for raw in raw_actions {
        let name = raw
            .name
            .ok_or_else(|| Error::parse("action without <name>"))?;
        if scpd.actions.iter().any(|a| a.name == name) {
            warn!("duplicate action '{}', keeping the first", name);
            continue;
        }

        let mut argsdef_in: Vec<(String, ArgDef)> = Vec::new();
        let mut argsdef_out: Vec<(String, ArgDef)> = Vec::new();

        for arg in raw.arguments {
            let arg_name = arg
                .name
                .ok_or_else(|| Error::parse(format!("argument of '{}' without <name>", name)))?;
            let related = arg.related.ok_or_else(|| {
                Error::parse(format!(
                    "argument '{}' of '{}' without <relatedStateVariable>",
                    arg_name, name
                ))
            })?;
            let statevar = scpd.statevar(&related).ok_or_else(|| {
                Error::parse(format!(
                    "argument '{}' of '{}' refers to unknown state variable '{}'",
                    arg_name, name, related
                ))
            })?;

            let def = ArgDef {
                related_statevar: related,
                datatype: statevar.datatype,
                allowed_values: statevar.allowed_values.clone(),
                allowed_value_range: statevar.allowed_value_range.clone(),
            };

            let is_in = arg
                .direction
                .map(|d| d.trim().eq_ignore_ascii_case("in"))
                .unwrap_or(false);
            let list = if is_in { &mut argsdef_in } else { &mut argsdef_out };
            if list.iter().any(|(n, _)| n == &arg_name) {
                warn!(
                    "duplicate argument '{}' in action '{}', keeping the first",
                    arg_name, name
                );
                continue;
            }
            list.push((arg_name, def));
        }

        scpd.actions.push(ActionDef {
            name,
            argsdef_in,
            argsdef_out,
        });
    }

    Ok(scpd)
}

fn build_range(
    var_name: &str,
    datatype: StateVarType,
    min: &Option<String>,
    max: &Option<String>,
    step: &Option<String>,
) -> Option<ValueRange> {
    let (min, max) = match (min, max) {
        (Some(min), Some(max)) => (min, max),
        (None, None) => return None,
        _ => {
            warn!(
                "allowedValueRange of '{}' lacks minimum or maximum, ignoring",
                var_name
            );
            return None;
        }
    };

    let parse = |s: &str| StateValue::parse(datatype, s);
    let (min, max) = match (parse(min), parse(max)) {
        (Ok(min), Ok(max)) => (min, max),
        _ => {
            warn!("unparseable allowedValueRange of '{}', ignoring", var_name);
            return None;
        }
    };
    let step = match step {
        Some(s) => match parse(s) {
            Ok(v) => Some(v),
            Err(_) => {
                warn!("unparseable step of '{}', ignoring range", var_name);
                return None;
            }
        },
        None => None,
    };

    match ValueRange::new(&min, &max, step.as_ref()) {
        Ok(range) => Some(range),
        Err(e) => {
            warn!("invalid allowedValueRange of '{}': {}", var_name, e);
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SCPD: &str = r#"<?xml version="1.0"?>
<scpd xmlns="urn:schemas-upnp-org:service-1-0">
  <specVersion><major>1</major><minor>0</minor></specVersion>
  <actionList>
    <action>
      <name>SetDefaultConnectionService</name>
      <argumentList>
        <argument>
          <name>NewDefaultConnectionService</name>
          <direction>in</direction>
          <relatedStateVariable>DefaultConnectionService</relatedStateVariable>
        </argument>
      </argumentList>
    </action>
    <action>
      <name>GetDefaultConnectionService</name>
      <argumentList>
        <argument>
          <name>NewDefaultConnectionService</name>
          <direction>out</direction>
          <relatedStateVariable>DefaultConnectionService</relatedStateVariable>
        </argument>
      </argumentList>
    </action>
  </actionList>
  <serviceStateTable>
    <stateVariable sendEvents="no">
      <name>DefaultConnectionService</name>
      <dataType>string</dataType>
    </stateVariable>
    <stateVariable sendEvents="no">
      <name>Port</name>
      <dataType>ui2</dataType>
      <allowedValueRange>
        <minimum>1</minimum>
        <maximum>65535</maximum>
      </allowedValueRange>
    </stateVariable>
    <stateVariable>
      <name>Proto</name>
      <dataType>string</dataType>
      <allowedValueList>
        <allowedValue>TCP</allowedValue>
        <allowedValue>UDP</allowedValue>
      </allowedValueList>
    </stateVariable>
  </serviceStateTable>
</scpd>"#;

    #[test]
    fn actions_and_directions() {
        let scpd = parse_scpd(SCPD).unwrap();
        assert_eq!(scpd.actions.len(), 2);
        let set = &scpd.actions[0];
        assert_eq!(set.name, "SetDefaultConnectionService");
        assert_eq!(set.argsdef_in.len(), 1);
        assert!(set.argsdef_out.is_empty());
        let get = &scpd.actions[1];
        assert!(get.argsdef_in.is_empty());
        assert_eq!(get.argsdef_out.len(), 1);
    }

    #[test]
    fn argdef_carries_statevar_schema() {
        let scpd = parse_scpd(SCPD).unwrap();
        let (name, def) = &scpd.actions[0].argsdef_in[0];
        assert_eq!(name, "NewDefaultConnectionService");
        assert_eq!(def.related_statevar, "DefaultConnectionService");
        assert_eq!(def.datatype, StateVarType::String);
    }

    #[test]
    fn send_events_attribute_defaults_to_yes() {
        let scpd = parse_scpd(SCPD).unwrap();
        assert!(!scpd.statevar("DefaultConnectionService").unwrap().send_events);
        assert!(scpd.statevar("Proto").unwrap().send_events);
    }

    #[test]
    fn allowed_values_and_range() {
        let scpd = parse_scpd(SCPD).unwrap();
        let proto = scpd.statevar("Proto").unwrap();
        assert!(proto.allowed_values.contains("TCP"));
        assert!(proto.allowed_values.contains("UDP"));
        let port = scpd.statevar("Port").unwrap();
        let range = port.allowed_value_range.as_ref().unwrap();
        assert!(range.is_in_range(&StateValue::UI2(8080)));
        assert!(!range.is_in_range(&StateValue::UI2(0)));
    }

    #[test]
    fn dangling_related_statevar_is_an_error() {
        let xml = SCPD.replace("DefaultConnectionService</relatedStateVariable>", "Nope</relatedStateVariable>");
        assert!(parse_scpd(&xml).is_err());
    }

    #[test]
    fn unknown_datatype_is_an_error() {
        let xml = SCPD.replace("<dataType>ui2</dataType>", "<dataType>ui3</dataType>");
        assert!(parse_scpd(&xml).is_err());
    }
}
