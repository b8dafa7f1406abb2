use crate::variable_types::{type_trait::UpnpVarType, StateVarType};

impl UpnpVarType for StateVarType {
    fn as_state_var_type(&self) -> StateVarType {
        *self
    }

    fn bit_size(&self) -> Option<usize> {
        match self {
            StateVarType::UI1 | StateVarType::I1 => Some(8),
            StateVarType::UI2 | StateVarType::I2 => Some(16),
            StateVarType::UI4 | StateVarType::I4 | StateVarType::Int | StateVarType::R4 => Some(32),
            StateVarType::UI8
            | StateVarType::I8
            | StateVarType::R8
            | StateVarType::Float
            | StateVarType::Number
            | StateVarType::Fixed14_4 => Some(64),
            _ => None,
        }
    }

    fn is_numeric(&self) -> bool {
        self.is_integer() || self.is_float()
    }

    fn is_integer(&self) -> bool {
        matches!(
            self,
            StateVarType::UI1
                | StateVarType::UI2
                | StateVarType::UI4
                | StateVarType::UI8
                | StateVarType::I1
                | StateVarType::I2
                | StateVarType::I4
                | StateVarType::I8
                | StateVarType::Int
        )
    }

    fn is_signed_int(&self) -> bool {
        matches!(
            self,
            StateVarType::I1
                | StateVarType::I2
                | StateVarType::I4
                | StateVarType::I8
                | StateVarType::Int
        )
    }

    fn is_unsigned_int(&self) -> bool {
        matches!(
            self,
            StateVarType::UI1 | StateVarType::UI2 | StateVarType::UI4 | StateVarType::UI8
        )
    }

    fn is_float(&self) -> bool {
        matches!(
            self,
            StateVarType::R4
                | StateVarType::R8
                | StateVarType::Float
                | StateVarType::Number
                | StateVarType::Fixed14_4
        )
    }

    fn is_bool(&self) -> bool {
        matches!(self, StateVarType::Boolean)
    }

    fn is_string(&self) -> bool {
        matches!(self, StateVarType::String | StateVarType::Char)
    }

    fn is_time(&self) -> bool {
        matches!(
            self,
            StateVarType::Date
                | StateVarType::DateTime
                | StateVarType::DateTimeTZ
                | StateVarType::Time
                | StateVarType::TimeTZ
        )
    }

    fn is_binary(&self) -> bool {
        matches!(self, StateVarType::BinBase64 | StateVarType::BinHex)
    }

    fn is_comparable(&self) -> bool {
        !self.is_binary()
    }
}

impl StateVarType {
    /// Bornes des types entiers, pour la validation avant émission.
    pub(crate) fn integer_bounds(&self) -> Option<(i128, i128)> {
        match self {
            StateVarType::UI1 => Some((0, u8::MAX as i128)),
            StateVarType::UI2 => Some((0, u16::MAX as i128)),
            StateVarType::UI4 => Some((0, u32::MAX as i128)),
            StateVarType::UI8 => Some((0, u64::MAX as i128)),
            StateVarType::I1 => Some((i8::MIN as i128, i8::MAX as i128)),
            StateVarType::I2 => Some((i16::MIN as i128, i16::MAX as i128)),
            StateVarType::I4 | StateVarType::Int => Some((i32::MIN as i128, i32::MAX as i128)),
            StateVarType::I8 => Some((i64::MIN as i128, i64::MAX as i128)),
            _ => None,
        }
    }
}
