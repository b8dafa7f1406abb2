//! Conversions depuis les types hôtes vers [`StateValue`].

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, NaiveTime};
use url::Url;
use uuid::Uuid;

use crate::variable_types::StateValue;

macro_rules! impl_from {
    ($($src:ty => $variant:ident),* $(,)?) => {
        $(
            impl From<$src> for StateValue {
                fn from(v: $src) -> Self {
                    StateValue::$variant(v)
                }
            }
        )*
    };
}

impl_from! {
    u8 => UI1,
    u16 => UI2,
    u32 => UI4,
    u64 => UI8,
    i8 => I1,
    i16 => I2,
    i32 => I4,
    i64 => I8,
    f32 => R4,
    f64 => R8,
    bool => Boolean,
    char => Char,
    String => String,
    Url => URI,
    Uuid => UUID,
    NaiveDate => Date,
    NaiveDateTime => DateTime,
    NaiveTime => Time,
}

impl From<&str> for StateValue {
    fn from(v: &str) -> Self {
        StateValue::String(v.to_string())
    }
}

impl From<Vec<u8>> for StateValue {
    fn from(v: Vec<u8>) -> Self {
        StateValue::BinBase64(v)
    }
}

impl From<DateTime<FixedOffset>> for StateValue {
    fn from(v: DateTime<FixedOffset>) -> Self {
        StateValue::DateTimeTZ(v)
    }
}
