use crate::variable_types::{StateValue, StateValueError, StateVarType, UpnpVarType};

impl StateValue {
    /// Coerce a value to a declared wire type. Used when a caller hands an
    /// argument whose variant does not match the SCPD datatype (e.g. a
    /// `UI4` literal for a `ui2` argument, or a string for anything).
    /// Narrowing conversions are range-checked; lossy float→int casts are
    /// refused.
    pub fn try_cast(&self, target: StateVarType) -> Result<StateValue, StateValueError> {
        let source = StateVarType::from(self);

        // Identité (même type)
        if source == target {
            return Ok(self.clone());
        }

        // Une chaîne se coerce en re-parcourant la forme fil.
        if let StateValue::String(s) = self {
            return StateValue::parse(target, s);
        }

        if target == StateVarType::String {
            return Ok(StateValue::String(self.to_string()));
        }

        if target.is_integer() {
            let v = self.integer_value().ok_or_else(|| {
                StateValueError::TypeError(format!("Cannot cast {:?} to {}", self, target))
            })?;
            return StateValue::from_integer(target, v);
        }

        if target.is_float() {
            let v = self
                .float_value()
                .or_else(|| self.integer_value().map(|i| i as f64))
                .ok_or_else(|| {
                    StateValueError::TypeError(format!("Cannot cast {:?} to {}", self, target))
                })?;
            return StateValue::from_float(target, v);
        }

        Err(StateValueError::TypeError(format!(
            "Cannot cast {:?} to {}",
            self, target
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn widening_and_narrowing() {
        let v = StateValue::UI4(12345).try_cast(StateVarType::UI2).unwrap();
        assert!(matches!(v, StateValue::UI2(12345)));
        assert!(StateValue::UI4(70000).try_cast(StateVarType::UI2).is_err());
    }

    #[test]
    fn string_source_is_parsed() {
        let v = StateValue::String("443".into())
            .try_cast(StateVarType::UI2)
            .unwrap();
        assert!(matches!(v, StateValue::UI2(443)));
        assert!(StateValue::String("no-digit".into())
            .try_cast(StateVarType::UI2)
            .is_err());
    }

    #[test]
    fn anything_casts_to_string() {
        let v = StateValue::Boolean(true)
            .try_cast(StateVarType::String)
            .unwrap();
        assert!(matches!(v, StateValue::String(ref s) if s == "1"));
    }

    #[test]
    fn float_to_int_is_refused() {
        assert!(StateValue::R8(1.5).try_cast(StateVarType::I4).is_err());
    }
}
