//! # Types de variables UPnP
//!
//! UPnP wire datatypes (`ui1`..`ui8`, `i1`..`i8`, `int`, `r4`/`r8`/`float`/
//! `number`, `boolean`, `string`, `bin.base64`, `bin.hex`, `uri`, `uuid`,
//! dates and times with optional `.tz`) and the tagged values that travel
//! through SOAP bodies.
//!
//! - [`StateVarType`] : the declared type of a state variable / argument
//! - [`StateValue`] : one in-memory value, one variant per wire type
//!
//! Encoding to the wire form is `Display`; decoding is
//! [`StateValue::parse`]; [`StateValue::try_cast`] coerces a caller value
//! to a declared type with range checks.

mod cast;
mod convert;
mod display_type;
mod display_value;
mod errors;
mod fromstr;
mod parse_value;
mod type_methods;
mod type_trait;
mod value_methods;
mod values_from_type;

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, NaiveTime};
use url::Url;
use uuid::Uuid;

pub use errors::StateValueError;
pub use type_trait::UpnpVarType;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StateVarType {
    UI1,        // Unsigned 8-bit integer
    UI2,        // Unsigned 16-bit integer
    UI4,        // Unsigned 32-bit integer
    UI8,        // Unsigned 64-bit integer
    I1,         // Signed 8-bit integer
    I2,         // Signed 16-bit integer
    I4,         // Signed 32-bit integer
    I8,         // Signed 64-bit integer
    Int,        // Synonymous with i4
    R4,         // 32-bit floating point
    R8,         // 64-bit floating point
    Float,      // Synonymous with r8
    Number,     // Synonymous with r8
    Fixed14_4,  // Fixed-point decimal
    Char,       // Single Unicode character
    String,     // Character string
    Boolean,    // Boolean value
    BinBase64,  // Base64-encoded binary
    BinHex,     // Hex-encoded binary
    Date,       // Date (YYYY-MM-DD)
    DateTime,   // DateTime without timezone
    DateTimeTZ, // DateTime with timezone
    Time,       // Time without timezone
    TimeTZ,     // Time with timezone
    UUID,       // Universally unique identifier
    URI,        // Uniform Resource Identifier
}

#[derive(Clone, Debug)]
pub enum StateValue {
    UI1(u8),
    UI2(u16),
    UI4(u32),
    UI8(u64),
    I1(i8),
    I2(i16),
    I4(i32),
    I8(i64),
    Int(i32),
    R4(f32),
    R8(f64),
    Float(f64),
    Number(f64),
    Fixed14_4(f64),
    Char(char),
    String(String),
    Boolean(bool),
    BinBase64(Vec<u8>),
    BinHex(Vec<u8>),
    Date(NaiveDate),
    DateTime(NaiveDateTime),
    DateTimeTZ(DateTime<FixedOffset>),
    Time(NaiveTime),
    TimeTZ(DateTime<FixedOffset>),
    UUID(Uuid),
    URI(Url),
}

impl StateValue {
    /// Integer content widened to i128, for range checks and comparisons
    /// across the signed/unsigned variants.
    pub(crate) fn integer_value(&self) -> Option<i128> {
        match self {
            StateValue::UI1(v) => Some(*v as i128),
            StateValue::UI2(v) => Some(*v as i128),
            StateValue::UI4(v) => Some(*v as i128),
            StateValue::UI8(v) => Some(*v as i128),
            StateValue::I1(v) => Some(*v as i128),
            StateValue::I2(v) => Some(*v as i128),
            StateValue::I4(v) => Some(*v as i128),
            StateValue::I8(v) => Some(*v as i128),
            StateValue::Int(v) => Some(*v as i128),
            _ => None,
        }
    }

    pub(crate) fn float_value(&self) -> Option<f64> {
        match self {
            StateValue::R4(v) => Some(*v as f64),
            StateValue::R8(v) | StateValue::Float(v) | StateValue::Number(v) => Some(*v),
            StateValue::Fixed14_4(v) => Some(*v),
            _ => None,
        }
    }
}
