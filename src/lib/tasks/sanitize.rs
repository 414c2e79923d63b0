use serde_json::{Map, Value};

/// Falsy values in the sense the platform payloads are cleaned by:
/// null, false, zero, and empty strings, arrays and objects.
pub fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(items) => !items.is_empty(),
        Value::Object(map) => !map.is_empty(),
    }
}

/// Returns a copy of `value` with every falsy entry pruned at every depth.
///
/// An entry survives only if it is truthy both before and after its own
/// contents are sanitized, so containers that end up empty are dropped too.
/// Scalars at the top level are returned as they are.
pub fn sanitize(value: &Value) -> Value {
    match value {
        Value::Object(map) => Value::Object(sanitize_object(map)),
        Value::Array(items) => Value::Array(
            items
                .iter()
                .filter(|v| is_truthy(v))
                .map(sanitize)
                .filter(is_truthy)
                .collect(),
        ),
        other => other.clone(),
    }
}

pub fn sanitize_object(map: &Map<String, Value>) -> Map<String, Value> {
    map.iter()
        .filter(|(_, v)| is_truthy(v))
        .filter_map(|(k, v)| {
            let cleaned = sanitize(v);
            is_truthy(&cleaned).then(|| (k.clone(), cleaned))
        })
        .collect()
}
