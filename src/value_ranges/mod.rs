mod methods;

use crate::variable_types::StateValue;

/// Plage `allowedValueRange` d'une variable d'état (min, max, step).
#[derive(Debug, Clone)]
pub struct ValueRange {
    min: StateValue,
    max: StateValue,
    step: Option<StateValue>,
}
