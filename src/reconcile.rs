//! Turns raw view results into typed records, failing closed.

use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::warn;

/// Decodes a collection result. Anything that is not an array becomes an
/// empty list; array elements that do not match `T` are dropped.
pub fn reconcile_list<T: DeserializeOwned>(raw: Option<Value>) -> Vec<T> {
    match raw {
        Some(Value::Array(items)) => items
            .into_iter()
            .enumerate()
            .filter_map(|(idx, item)| match serde_json::from_value::<T>(item) {
                Ok(record) => Some(record),
                Err(e) => {
                    warn!(
                        "Dropping malformed {} at index {idx}: {e}",
                        std::any::type_name::<T>()
                    );
                    None
                }
            })
            .collect(),
        Some(Value::Null) | None => vec![],
        Some(other) => {
            warn!(
                "Expected a list of {}, got {}",
                std::any::type_name::<T>(),
                kind(&other)
            );
            vec![]
        }
    }
}

/// Decodes a single-record result.
pub fn reconcile_one<T: DeserializeOwned>(raw: Option<Value>) -> Option<T> {
    match raw {
        None | Some(Value::Null) => None,
        Some(value) => match serde_json::from_value::<T>(value) {
            Ok(record) => Some(record),
            Err(e) => {
                warn!("Malformed {}: {e}", std::any::type_name::<T>());
                None
            }
        },
    }
}

fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
