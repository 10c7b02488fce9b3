use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Flat form values keyed by logical field name
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FormValues(Map<String, Value>);

impl FormValues {
    pub fn new() -> Self {
        Self(Map::new())
    }

    pub fn get(&self, field: &str) -> Option<&Value> {
        self.0.get(field)
    }

    pub fn insert(&mut self, field: &str, value: Value) {
        self.0.insert(field.to_string(), value);
    }

    pub fn with(mut self, field: &str, value: Value) -> Self {
        self.insert(field, value);
        self
    }

    /// Form truthiness: missing, null, false, 0, NaN and "" are falsy
    pub fn is_truthy(&self, field: &str) -> bool {
        match self.0.get(field) {
            None | Some(Value::Null) => false,
            Some(Value::Bool(b)) => *b,
            Some(Value::Number(n)) => n.as_f64().map(|f| f != 0.0 && !f.is_nan()).unwrap_or(true),
            Some(Value::String(s)) => !s.is_empty(),
            Some(Value::Array(_)) | Some(Value::Object(_)) => true,
        }
    }
}

impl From<Map<String, Value>> for FormValues {
    fn from(map: Map<String, Value>) -> Self {
        Self(map)
    }
}

impl TryFrom<Value> for FormValues {
    type Error = Value;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        match value {
            Value::Object(map) => Ok(Self(map)),
            other => Err(other),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_truthiness_follows_form_semantics() {
        let values: FormValues = serde_json::from_value(json!({
            "empty": "",
            "zero": 0,
            "no": false,
            "nothing": null,
            "text": "x",
            "one": 1,
            "yes": true,
            "list": [],
            "object": {}
        }))
        .unwrap();

        for field in ["empty", "zero", "no", "nothing", "missing"] {
            assert!(!values.is_truthy(field), "{} should be falsy", field);
        }
        for field in ["text", "one", "yes", "list", "object"] {
            assert!(values.is_truthy(field), "{} should be truthy", field);
        }
    }

    #[test]
    fn test_non_object_values_are_rejected() {
        assert!(FormValues::try_from(json!([1, 2])).is_err());
        assert!(FormValues::try_from(json!({"a": 1})).is_ok());
    }
}
