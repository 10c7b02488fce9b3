use serde_json::Value;

/// Normalize one raw form value into the list written to a multi-valued
/// property. Null and "" are dropped, a present scalar becomes a single
/// element list. An empty result means the property is not set.
pub fn extract_values(raw: Option<&Value>) -> Vec<Value> {
    match raw {
        Some(Value::Array(items)) => items.iter().filter(|v| is_present(v)).cloned().collect(),
        Some(value) if is_present(value) => vec![value.clone()],
        _ => Vec::new(),
    }
}

fn is_present(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::String(s) => !s.is_empty(),
        _ => true,
    }
}
