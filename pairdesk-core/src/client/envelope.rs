//! Response envelope parsing.
//!
//! Every backend response is a JSON object carrying either
//! `"status": "success"` or `"success": true`. Anything else is a failure
//! whose message lives under `message` or `error`.

use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

use super::ClientError;

/// Check the status discriminator and return the envelope's fields.
pub fn unwrap_envelope(body: Value) -> Result<Map<String, Value>, ClientError> {
    let map = match body {
        Value::Object(map) => map,
        other => {
            return Err(ClientError::Malformed(format!(
                "expected a JSON object, got {}",
                type_name(&other)
            )))
        }
    };

    let succeeded = match (map.get("status"), map.get("success")) {
        (Some(Value::String(status)), _) if status == "success" => true,
        (_, Some(Value::Bool(true))) => true,
        (None, None) => {
            return Err(ClientError::Malformed(
                "response has no status discriminator".to_string(),
            ))
        }
        _ => false,
    };

    if succeeded {
        Ok(map)
    } else {
        Err(ClientError::Backend(
            failure_message(&map).unwrap_or_else(|| "request failed".to_string()),
        ))
    }
}

/// Remove `field` from the envelope and deserialize it.
pub fn take_field<T: DeserializeOwned>(
    map: &mut Map<String, Value>,
    field: &str,
) -> Result<T, ClientError> {
    let value = map
        .remove(field)
        .ok_or_else(|| ClientError::Malformed(format!("missing field `{field}`")))?;
    serde_json::from_value(value)
        .map_err(|e| ClientError::Malformed(format!("field `{field}`: {e}")))
}

/// `message` or `error` of a failure body, if it has one.
pub(crate) fn failure_message(map: &Map<String, Value>) -> Option<String> {
    ["message", "error"]
        .iter()
        .find_map(|key| map.get(*key).and_then(Value::as_str))
        .map(str::to_string)
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
