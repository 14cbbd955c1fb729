//! Typed values and their stored text form.

use std::fmt;
use uuid::Uuid;

use crate::keys::PreferenceValue;

/// A value that can live in a preference node.
///
/// Every stored value is text. Scalars use their display form, arrays and
/// objects use JSON. `decode` returns `None` for text that does not parse,
/// which callers treat as a malformed value and replace with the default.
pub trait StoredValue: Clone + PartialEq + fmt::Debug + 'static {
    /// Name used in diagnostics.
    const TYPE_NAME: &'static str;

    fn encode(&self) -> String;

    fn decode(raw: &str) -> Option<Self>;

    /// Convert a declared key default into this type
    fn from_default(value: &PreferenceValue) -> Option<Self>;
}

impl StoredValue for bool {
    const TYPE_NAME: &'static str = "bool";

    fn encode(&self) -> String {
        self.to_string()
    }

    fn decode(raw: &str) -> Option<Self> {
        match raw.trim() {
            "true" => Some(true),
            "false" => Some(false),
            _ => None,
        }
    }

    fn from_default(value: &PreferenceValue) -> Option<Self> {
        match value {
            PreferenceValue::Bool(b) => Some(*b),
            _ => None,
        }
    }
}

impl StoredValue for String {
    const TYPE_NAME: &'static str = "String";

    fn encode(&self) -> String {
        self.clone()
    }

    fn decode(raw: &str) -> Option<Self> {
        Some(raw.to_string())
    }

    fn from_default(value: &PreferenceValue) -> Option<Self> {
        match value {
            PreferenceValue::Str(s) => Some(s.clone()),
            _ => None,
        }
    }
}

impl StoredValue for f64 {
    const TYPE_NAME: &'static str = "f64";

    fn encode(&self) -> String {
        self.to_string()
    }

    fn decode(raw: &str) -> Option<Self> {
        raw.trim().parse().ok()
    }

    fn from_default(value: &PreferenceValue) -> Option<Self> {
        match value {
            PreferenceValue::Double(d) => Some(*d),
            PreferenceValue::Int(i) => Some(f64::from(*i)),
            _ => None,
        }
    }
}

impl StoredValue for i32 {
    const TYPE_NAME: &'static str = "i32";

    fn encode(&self) -> String {
        self.to_string()
    }

    fn decode(raw: &str) -> Option<Self> {
        raw.trim().parse().ok()
    }

    fn from_default(value: &PreferenceValue) -> Option<Self> {
        match value {
            PreferenceValue::Int(i) => Some(*i),
            _ => None,
        }
    }
}

impl StoredValue for Vec<f64> {
    const TYPE_NAME: &'static str = "Vec<f64>";

    fn encode(&self) -> String {
        serde_json::to_string(self).unwrap_or_default()
    }

    fn decode(raw: &str) -> Option<Self> {
        serde_json::from_str(raw).ok()
    }

    fn from_default(value: &PreferenceValue) -> Option<Self> {
        match value {
            PreferenceValue::DoubleArray(values) => Some(values.clone()),
            _ => None,
        }
    }
}

impl StoredValue for Uuid {
    const TYPE_NAME: &'static str = "Uuid";

    fn encode(&self) -> String {
        self.to_string()
    }

    fn decode(raw: &str) -> Option<Self> {
        Uuid::parse_str(raw.trim()).ok()
    }

    fn from_default(value: &PreferenceValue) -> Option<Self> {
        match value {
            PreferenceValue::Str(s) => Uuid::parse_str(s).ok(),
            _ => None,
        }
    }
}
