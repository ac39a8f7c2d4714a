use serde_json::Value;

use super::require;
use crate::error::TypeError;
use crate::strict::Strictness;
use crate::value::ValueType;

pub fn cast(value: Value, strict: Strictness) -> Result<Value, TypeError> {
	if strict.is_strict() {
		return require(ValueType::Array, value);
	}
	Ok(match value {
		Value::Array(_) | Value::Object(_) => value,
		Value::Null => Value::Array(Vec::new()),
		scalar => Value::Array(vec![scalar]),
	})
}
