use serde_json::Value;

use super::{numeric, require};
use crate::error::TypeError;
use crate::strict::Strictness;
use crate::value::ValueType;

pub fn cast(value: Value, strict: Strictness) -> Result<Value, TypeError> {
	if strict.is_strict() {
		return require(ValueType::Number, value);
	}
	Ok(match value {
		Value::Bool(b) => Value::from(i64::from(b)),
		Value::Number(_) => value,
		Value::String(s) => numeric::parse(&s).unwrap_or(Value::Null),
		Value::Null | Value::Array(_) | Value::Object(_) => Value::Null,
	})
}
