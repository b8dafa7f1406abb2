use std::cmp::Ordering;

use crate::variable_types::{type_trait::UpnpVarType, StateValue, StateVarType};

impl UpnpVarType for StateValue {
    fn as_state_var_type(&self) -> StateVarType {
        StateVarType::from(self)
    }
}

impl PartialEq for StateValue {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (a, b) if a.is_integer() && b.is_integer() => {
                a.integer_value() == b.integer_value()
            }
            (a, b) if a.is_float() && b.is_float() => {
                // NaN respecte la sémantique IEEE (NaN != NaN)
                match (a.float_value(), b.float_value()) {
                    (Some(x), Some(y)) => x == y,
                    _ => false,
                }
            }
            (a, b) if a.is_string() && b.is_string() => a.to_string() == b.to_string(),
            (StateValue::Boolean(a), StateValue::Boolean(b)) => a == b,
            (StateValue::Date(a), StateValue::Date(b)) => a == b,
            (StateValue::Time(a), StateValue::Time(b)) => a == b,
            (StateValue::DateTime(a), StateValue::DateTime(b)) => a == b,
            (StateValue::DateTimeTZ(a), StateValue::DateTimeTZ(b)) => a == b,
            (StateValue::TimeTZ(a), StateValue::TimeTZ(b)) => a == b,
            (StateValue::UUID(a), StateValue::UUID(b)) => a == b,
            (StateValue::URI(a), StateValue::URI(b)) => a == b,
            (StateValue::BinBase64(a), StateValue::BinBase64(b)) => a == b,
            (StateValue::BinHex(a), StateValue::BinHex(b)) => a == b,
            (_, _) => false,
        }
    }
}

impl PartialOrd for StateValue {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        match (self, other) {
            (a, b) if a.is_integer() && b.is_integer() => {
                Some(a.integer_value()?.cmp(&b.integer_value()?))
            }
            (a, b) if a.is_numeric() && b.is_numeric() => {
                let fa = a.float_value().or_else(|| a.integer_value().map(|i| i as f64))?;
                let fb = b.float_value().or_else(|| b.integer_value().map(|i| i as f64))?;
                fa.partial_cmp(&fb)
            }
            (a, b) if a.is_string() && b.is_string() => Some(a.to_string().cmp(&b.to_string())),
            (StateValue::Date(a), StateValue::Date(b)) => Some(a.cmp(b)),
            (StateValue::Time(a), StateValue::Time(b)) => Some(a.cmp(b)),
            (StateValue::DateTime(a), StateValue::DateTime(b)) => Some(a.cmp(b)),
            (StateValue::DateTimeTZ(a), StateValue::DateTimeTZ(b)) => Some(a.cmp(b)),
            (StateValue::TimeTZ(a), StateValue::TimeTZ(b)) => Some(a.cmp(b)),
            (_, _) => None,
        }
    }
}
