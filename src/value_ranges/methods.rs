use std::cmp::Ordering;

use crate::{
    value_ranges::ValueRange,
    variable_types::{StateValue, StateValueError, StateVarType, UpnpVarType},
};

impl UpnpVarType for ValueRange {
    fn as_state_var_type(&self) -> StateVarType {
        self.min.as_state_var_type()
    }
}

impl ValueRange {
    pub fn new(
        min: &StateValue,
        max: &StateValue,
        step: Option<&StateValue>,
    ) -> Result<Self, StateValueError> {
        if min.as_state_var_type() != max.as_state_var_type() {
            return Err(StateValueError::TypeError(
                "min and max do not belong to the same type".to_string(),
            ));
        }

        // Vérifier que min <= max
        if let Some(Ordering::Greater) = min.partial_cmp(max) {
            return Err(StateValueError::RangeError(
                "Minimum cannot be greater than maximum".to_string(),
            ));
        }

        if let Some(step) = step {
            if step.as_state_var_type() != min.as_state_var_type() {
                return Err(StateValueError::TypeError(
                    "step does not belong to the range type".to_string(),
                ));
            }
        }

        Ok(Self {
            min: min.clone(),
            max: max.clone(),
            step: step.cloned(),
        })
    }

    pub fn minimum(&self) -> &StateValue {
        &self.min
    }

    pub fn maximum(&self) -> &StateValue {
        &self.max
    }

    pub fn step(&self) -> Option<&StateValue> {
        self.step.as_ref()
    }

    /// min <= value <= max, et (value - min) multiple de step s'il y en a un.
    pub fn is_in_range(&self, value: &StateValue) -> bool {
        if self.as_state_var_type() != value.as_state_var_type() {
            return false;
        }
        match (self.min.partial_cmp(value), self.max.partial_cmp(value)) {
            (Some(Ordering::Greater), _) => return false,
            (_, Some(Ordering::Less)) => return false,
            (Some(_), Some(_)) => {}
            _ => return false,
        }

        if let Some(step) = &self.step {
            if let (Some(v), Some(min), Some(s)) = (
                value.integer_value(),
                self.min.integer_value(),
                step.integer_value(),
            ) {
                if s > 0 && (v - min) % s != 0 {
                    return false;
                }
            }
        }

        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn range(min: u16, max: u16, step: Option<u16>) -> ValueRange {
        let step = step.map(StateValue::UI2);
        ValueRange::new(
            &StateValue::UI2(min),
            &StateValue::UI2(max),
            step.as_ref(),
        )
        .unwrap()
    }

    #[test]
    fn bounds_are_inclusive() {
        let r = range(10, 20, None);
        assert!(r.is_in_range(&StateValue::UI2(10)));
        assert!(r.is_in_range(&StateValue::UI2(20)));
        assert!(!r.is_in_range(&StateValue::UI2(9)));
        assert!(!r.is_in_range(&StateValue::UI2(21)));
    }

    #[test]
    fn step_divisibility() {
        let r = range(0, 100, Some(10));
        assert!(r.is_in_range(&StateValue::UI2(50)));
        assert!(!r.is_in_range(&StateValue::UI2(55)));
    }

    #[test]
    fn inverted_bounds_are_rejected() {
        assert!(ValueRange::new(&StateValue::UI2(5), &StateValue::UI2(1), None).is_err());
    }

    #[test]
    fn mismatched_value_type_is_out_of_range() {
        let r = range(0, 10, None);
        assert!(!r.is_in_range(&StateValue::I4(5)));
    }
}
