//! Tolerant deserializers for persisted documents.
//!
//! Stored documents come from older builds and from stores that coerce scalars, so a
//! string field may arrive as a number, a boolean or `null`. These helpers absorb that
//! instead of failing the whole load.

use serde::{Deserialize, Deserializer};
use serde_json::Value;

/// Deserializes any JSON scalar into a `String`. `null` becomes `""`.
pub fn string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(value_to_string(Value::deserialize(deserializer)?))
}

pub fn value_to_string(value: Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s,
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        other => other.to_string(),
    }
}

/// Reads a JSON collection that may have been stored as an object keyed by index
/// (`{"0": {...}, "1": {...}}`) rather than as an array. Keys are ordered numerically
/// when possible so the original sequence is kept.
pub fn array_items(value: Value) -> Option<Vec<Value>> {
    match value {
        Value::Array(items) => Some(items),
        Value::Object(map) => {
            let mut entries: Vec<(String, Value)> = map.into_iter().collect();
            entries.sort_by(|(a, _), (b, _)| match (a.parse::<u64>(), b.parse::<u64>()) {
                (Ok(x), Ok(y)) => x.cmp(&y),
                _ => a.cmp(b),
            });
            Some(entries.into_iter().map(|(_, v)| v).collect())
        }
        Value::Null => None,
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_value_to_string_coerces_scalars() {
        assert_eq!(value_to_string(json!(null)), "");
        assert_eq!(value_to_string(json!(42)), "42");
        assert_eq!(value_to_string(json!(true)), "true");
        assert_eq!(value_to_string(json!("x")), "x");
    }

    #[test]
    fn test_array_items_reads_index_keyed_object_in_order() {
        let items = array_items(json!({"10": "c", "2": "b", "0": "a"})).unwrap();
        assert_eq!(items, vec![json!("a"), json!("b"), json!("c")]);
    }

    #[test]
    fn test_array_items_rejects_scalars() {
        assert!(array_items(json!("nope")).is_none());
        assert!(array_items(json!(null)).is_none());
    }
}
