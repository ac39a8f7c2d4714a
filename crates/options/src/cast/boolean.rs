use serde_json::Value;

use super::require;
use crate::error::TypeError;
use crate::strict::Strictness;
use crate::value::ValueType;

pub fn cast(value: Value, strict: Strictness) -> Result<Value, TypeError> {
	if strict.is_strict() {
		return require(ValueType::Boolean, value);
	}
	Ok(Value::Bool(match value {
		Value::String(s) if s == "false" || s == "0" => false,
		Value::String(s) if s == "true" || s == "1" => true,
		other => truthy(&other),
	}))
}

/// Host truthiness: empty strings, zero, empty arrays and `null` are false.
pub(crate) fn truthy(value: &Value) -> bool {
	match value {
		Value::Null => false,
		Value::Bool(b) => *b,
		Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
		Value::String(s) => !s.is_empty(),
		Value::Array(items) => !items.is_empty(),
		Value::Object(map) => !map.is_empty(),
	}
}

#[cfg(test)]
mod tests {
	use pretty_assertions::assert_eq;
	use rstest::rstest;
	use serde_json::json;

	use super::*;

	#[rstest]
	#[case(json!("0"), false)]
	#[case(json!("1"), true)]
	#[case(json!("false"), false)]
	#[case(json!("true"), true)]
	#[case(json!(""), false)]
	#[case(json!("Hello"), true)]
	#[case(json!(0), false)]
	#[case(json!(-1), true)]
	#[case(json!(0.0), false)]
	#[case(json!(1.2), true)]
	#[case(json!([]), false)]
	#[case(json!(["x"]), true)]
	#[case(json!(null), false)]
	fn coerces_by_truthiness(#[case] input: Value, #[case] expected: bool) {
		assert_eq!(cast(input, Strictness::Coerce).unwrap(), Value::Bool(expected));
	}

	#[rstest]
	#[case(json!("true"), "string")]
	#[case(json!(0), "integer")]
	#[case(json!([]), "array")]
	fn strict_rejects_non_booleans(#[case] input: Value, #[case] given: &str) {
		let err = cast(input, Strictness::Strict).unwrap_err();
		assert_eq!(err.to_string(), format!("Value must be of type boolean, {given} given."));
	}

	#[test]
	fn strict_passes_booleans_and_null() {
		assert_eq!(cast(json!(false), Strictness::Strict).unwrap(), json!(false));
		assert_eq!(cast(json!(null), Strictness::Strict).unwrap(), json!(null));
	}
}
