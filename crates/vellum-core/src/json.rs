//! Conversions between [`Value`] and `serde_json::Value`
//!
//! Documents arrive and leave as JSON; the shaper only ever sees [`Value`].
//! Numbers are widened to f64 on the way in, matching the document model's
//! single numeric type.

// this_file: crates/vellum-core/src/json.rs

use crate::Value;

impl From<&serde_json::Value> for Value {
    fn from(json: &serde_json::Value) -> Self {
        match json {
            serde_json::Value::Null => Value::Null,
            serde_json::Value::Bool(b) => Value::Bool(*b),
            serde_json::Value::Number(n) => Value::Number(n.as_f64().unwrap_or(f64::NAN)),
            serde_json::Value::String(s) => Value::String(s.clone()),
            serde_json::Value::Array(items) => Value::List(items.iter().map(Value::from).collect()),
            serde_json::Value::Object(fields) => Value::Object(
                fields
                    .iter()
                    .map(|(name, value)| (name.clone(), Value::from(value)))
                    .collect(),
            ),
        }
    }
}

impl From<serde_json::Value> for Value {
    fn from(json: serde_json::Value) -> Self {
        Value::from(&json)
    }
}

impl From<&Value> for serde_json::Value {
    fn from(value: &Value) -> Self {
        match value {
            Value::Null => serde_json::Value::Null,
            Value::Bool(b) => serde_json::Value::Bool(*b),
            Value::Number(n) => serde_json::Number::from_f64(*n)
                .map(serde_json::Value::Number)
                .unwrap_or(serde_json::Value::Null),
            Value::String(s) => serde_json::Value::String(s.clone()),
            Value::List(items) => {
                serde_json::Value::Array(items.iter().map(serde_json::Value::from).collect())
            }
            Value::Object(fields) => serde_json::Value::Object(
                fields
                    .iter()
                    .map(|(name, value)| (name.clone(), serde_json::Value::from(value)))
                    .collect(),
            ),
        }
    }
}

/// Serialize a document value as a JSON byte body
pub fn to_json_bytes(value: &Value) -> Vec<u8> {
    serde_json::Value::from(value).to_string().into_bytes()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_trip() {
        let json: serde_json::Value =
            serde_json::from_str(r#"{"a":1,"b":[true,null,"x"],"c":{"d":2.5}}"#).unwrap();
        let value = Value::from(&json);
        let back = serde_json::Value::from(&value);
        assert_eq!(json, back);
    }

    #[test]
    fn test_integers_become_doubles() {
        let value = Value::from(serde_json::json!(42));
        assert_eq!(value, Value::Number(42.0));
    }

    #[test]
    fn test_non_finite_numbers_serialize_as_null() {
        let json = serde_json::Value::from(&Value::Number(f64::NAN));
        assert_eq!(json, serde_json::Value::Null);
    }
}
