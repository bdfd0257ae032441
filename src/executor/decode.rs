use serde_yaml::Value;

use crate::DecodeError;
use crate::ExecOutput;

/// Parses the YAML list the request chunk prints on success.
pub fn decode_output(output: &ExecOutput) -> Result<Value, DecodeError> {
    serde_yaml::from_str(&output.stdout).map_err(|source| DecodeError {
        stdout: output.stdout.clone(),
        source,
    })
}

/// A probe is satisfied when its first returned value is neither `nil` nor
/// `false`. An empty reply is falsy.
pub fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Sequence(values) => values.first().is_some_and(is_truthy_scalar),
        other => is_truthy_scalar(other),
    }
}

fn is_truthy_scalar(value: &Value) -> bool {
    !matches!(value, Value::Null | Value::Bool(false))
}

/// Text of the error value in a `nil, err` style reply.
///
/// Returns `None` unless the reply is a two-element list whose second
/// element is present. Cartridge error objects are encoded as mappings
/// carrying the message under `str` or `err`.
pub fn reply_error(value: &Value) -> Option<String> {
    let Value::Sequence(values) = value else {
        return None;
    };
    if values.len() != 2 {
        return None;
    }

    match &values[1] {
        Value::Null => None,
        Value::String(text) => Some(text.clone()),
        Value::Mapping(fields) => ["str", "err"]
            .iter()
            .find_map(|key| fields.get(*key).and_then(Value::as_str))
            .map(str::to_string)
            .or_else(|| serde_yaml::to_string(&values[1]).ok()),
        other => serde_yaml::to_string(other).ok(),
    }
}
