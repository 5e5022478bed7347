use crate::ParameterType;
use chrono::{DateTime, Utc};
use std::fmt::{Display, Formatter};

/// A value bound to a migration query or read back from a result row.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum Value {
    #[default]
    NULL,
    Int(i64),
    UInt(u64),
    String(String),
    Bytes(Vec<u8>),
    Float(f64),
    Boolean(bool),
    DateTime(DateTime<Utc>),
}

impl Value {
    pub fn is_null(&self) -> bool {
        matches!(self, Value::NULL)
    }

    /// The binding type a driver should use for this value.
    pub fn parameter_type(&self) -> ParameterType {
        match self {
            Value::NULL => ParameterType::Null,
            Value::Int(_) | Value::UInt(_) => ParameterType::Integer,
            Value::String(_) | Value::DateTime(_) => ParameterType::String,
            Value::Bytes(_) => ParameterType::Binary,
            Value::Float(_) => ParameterType::Float,
            Value::Boolean(_) => ParameterType::Boolean,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(value) => Some(value.as_str()),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match *self {
            Value::Int(value) => Some(value),
            Value::UInt(value) => i64::try_from(value).ok(),
            _ => None,
        }
    }
}

impl Display for Value {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Value::NULL => write!(f, "NULL"),
            Value::Int(value) => write!(f, "{}", value),
            Value::UInt(value) => write!(f, "{}", value),
            Value::String(value) => write!(f, "{}", value),
            Value::Bytes(value) => write!(f, "Bytes (len: {}) <{:02X?}>", value.len(), value),
            Value::Float(value) => write!(f, "{}", value),
            Value::Boolean(value) => write!(f, "{}", if *value { "true" } else { "false" }),
            Value::DateTime(value) => write!(f, "{}", value.to_rfc3339()),
        }
    }
}

macro_rules! from_to_value {
    ($variant:ident, $source:ty) => {
        impl From<$source> for Value {
            #[inline]
            fn from(value: $source) -> Self {
                Value::$variant(value)
            }
        }

        impl From<Option<$source>> for Value {
            #[inline]
            fn from(value: Option<$source>) -> Self {
                match value {
                    None => Value::NULL,
                    Some(value) => Value::$variant(value),
                }
            }
        }
    };
}

from_to_value!(Int, i64);
from_to_value!(UInt, u64);
from_to_value!(String, String);
from_to_value!(Bytes, Vec<u8>);
from_to_value!(Float, f64);
from_to_value!(Boolean, bool);
from_to_value!(DateTime, DateTime<Utc>);

impl From<i32> for Value {
    fn from(value: i32) -> Self {
        Value::Int(value as i64)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::String(value.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::Value;
    use crate::ParameterType;

    #[test]
    fn values_report_their_binding_type() {
        assert_eq!(Value::from(12).parameter_type(), ParameterType::Integer);
        assert_eq!(Value::from("foo").parameter_type(), ParameterType::String);
        assert_eq!(Value::from(None::<i64>).parameter_type(), ParameterType::Null);
        assert_eq!(Value::from(vec![0_u8, 1]).parameter_type(), ParameterType::Binary);
    }

    #[test]
    fn can_display_values() {
        assert_eq!(Value::NULL.to_string(), "NULL");
        assert_eq!(Value::from(true).to_string(), "true");
        assert_eq!(Value::from(42_u64).to_string(), "42");
    }
}
