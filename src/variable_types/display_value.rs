use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use std::fmt;

use crate::variable_types::StateValue;

/// Forme "fil" de la valeur, telle qu'elle est placée dans un corps SOAP.
/// L'échappement XML est fait par l'émetteur, pas ici.
impl fmt::Display for StateValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            // Numériques
            StateValue::UI1(v) => write!(f, "{}", v),
            StateValue::UI2(v) => write!(f, "{}", v),
            StateValue::UI4(v) => write!(f, "{}", v),
            StateValue::UI8(v) => write!(f, "{}", v),
            StateValue::I1(v) => write!(f, "{}", v),
            StateValue::I2(v) => write!(f, "{}", v),
            StateValue::I4(v) => write!(f, "{}", v),
            StateValue::I8(v) => write!(f, "{}", v),
            StateValue::Int(v) => write!(f, "{}", v),
            StateValue::R4(v) => write!(f, "{}", v),
            StateValue::R8(v) => write!(f, "{}", v),
            StateValue::Float(v) => write!(f, "{}", v),
            StateValue::Number(v) => write!(f, "{}", v),
            StateValue::Fixed14_4(v) => write!(f, "{}", v),

            // Types déjà Display
            StateValue::Char(v) => write!(f, "{}", v),
            StateValue::String(v) => write!(f, "{}", v),
            StateValue::UUID(v) => write!(f, "{}", v),
            StateValue::URI(v) => write!(f, "{}", v),

            // Booléen : 1 ou 0
            StateValue::Boolean(v) => write!(f, "{}", if *v { "1" } else { "0" }),

            // Encodages binaires
            StateValue::BinBase64(v) => write!(f, "{}", STANDARD.encode(v)),
            StateValue::BinHex(v) => write!(f, "{}", hex::encode(v)),

            // Dates et temps
            StateValue::Date(v) => write!(f, "{}", v.format("%Y-%m-%d")),
            StateValue::DateTime(v) => write!(f, "{}", v.format("%Y-%m-%dT%H:%M:%S")),
            StateValue::DateTimeTZ(v) => write!(f, "{}", v.to_rfc3339()),
            StateValue::Time(v) => write!(f, "{}", v.format("%H:%M:%S")),
            StateValue::TimeTZ(v) => write!(f, "{}", v.format("%H:%M:%S%:z")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn boolean_encodes_as_digit() {
        assert_eq!(StateValue::Boolean(true).to_string(), "1");
        assert_eq!(StateValue::Boolean(false).to_string(), "0");
    }

    #[test]
    fn binary_encodings() {
        let bytes = b"Hello, World!".to_vec();
        assert_eq!(
            StateValue::BinBase64(bytes.clone()).to_string(),
            "SGVsbG8sIFdvcmxkIQ=="
        );
        assert_eq!(
            StateValue::BinHex(bytes).to_string(),
            "48656c6c6f2c20576f726c6421"
        );
    }

    #[test]
    fn date_and_time_forms() {
        let d = NaiveDate::from_ymd_opt(2017, 8, 11).unwrap();
        assert_eq!(StateValue::Date(d).to_string(), "2017-08-11");
        let dt = d.and_hms_opt(12, 34, 56).unwrap();
        assert_eq!(StateValue::DateTime(dt).to_string(), "2017-08-11T12:34:56");
    }
}
